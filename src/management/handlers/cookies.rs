//! Refresh-token cookie handling.
//!
//! The refresh token travels only in an `HttpOnly` cookie scoped to the
//! `/auth` path (both `/auth/refresh` and `/auth/logout` read it), with
//! `SameSite=Strict` and `Secure` outside development.

use axum::http::{HeaderMap, HeaderValue, header};

pub const REFRESH_COOKIE: &str = "refreshToken";
const COOKIE_PATH: &str = "/auth";

/// `Set-Cookie` value carrying a refresh token.
#[must_use]
pub fn set_refresh_cookie(token: &str, max_age_secs: i64, secure: bool) -> HeaderValue {
    let secure_attr = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{REFRESH_COOKIE}={token}; HttpOnly{secure_attr}; SameSite=Strict; Path={COOKIE_PATH}; Max-Age={max_age_secs}"
    ))
    .expect("cookie value is valid ascii")
}

/// `Set-Cookie` value that expires the refresh cookie immediately.
#[must_use]
pub fn clear_refresh_cookie(secure: bool) -> HeaderValue {
    let secure_attr = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{REFRESH_COOKIE}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly{secure_attr}; SameSite=Strict; Path={COOKIE_PATH}; Max-Age=0"
    ))
    .expect("cookie value is valid ascii")
}

/// Read the refresh token from the request's `Cookie` header, if present.
#[must_use]
pub fn read_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == REFRESH_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cookie_carries_the_required_attributes() {
        let value = set_refresh_cookie("tok-123", 604_800, true);
        let text = value.to_str().unwrap();
        assert!(text.starts_with("refreshToken=tok-123;"));
        assert!(text.contains("HttpOnly"));
        assert!(text.contains("Secure"));
        assert!(text.contains("SameSite=Strict"));
        assert!(text.contains("Path=/auth"));
        assert!(text.contains("Max-Age=604800"));
    }

    #[test]
    fn secure_attribute_is_omitted_in_development() {
        let value = set_refresh_cookie("tok-123", 60, false);
        assert!(!value.to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn read_finds_the_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; refreshToken=tok-42; lang=en"),
        );
        assert_eq!(read_refresh_cookie(&headers).as_deref(), Some("tok-42"));
    }

    #[test]
    fn read_handles_missing_and_empty_values() {
        let mut headers = HeaderMap::new();
        assert!(read_refresh_cookie(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("refreshToken="));
        assert!(read_refresh_cookie(&headers).is_none());
    }

    #[test]
    fn clear_cookie_expires_in_the_past() {
        let value = clear_refresh_cookie(false);
        let text = value.to_str().unwrap();
        assert!(text.contains("Max-Age=0"));
        assert!(text.contains("Expires=Thu, 01 Jan 1970"));
    }
}
