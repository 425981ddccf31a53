//! Bearer token authentication middleware.
//!
//! Extracts the `Authorization` header, verifies the access token, and
//! injects the resolved [`AuthContext`] into request extensions for handlers
//! downstream.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::AuthContext;
use crate::auth::jwt::TokenStatus;
use crate::error::AppError;
use crate::management::server::AppState;

/// Pull the token out of an `Authorization: Bearer <token>` header value.
#[must_use]
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("missing authorization header"))?;

    let token = extract_bearer_token(header)
        .ok_or_else(|| AppError::unauthorized("invalid authorization format"))?;

    let claims = match state.auth.jwt_manager().decode_access_token(token) {
        TokenStatus::Valid(claims) => claims,
        TokenStatus::Expired => return Err(AppError::unauthorized("token expired")),
        TokenStatus::SignatureMismatch | TokenStatus::Malformed => {
            return Err(AppError::unauthorized("invalid token"));
        }
    };

    let user_id = claims
        .user_id()
        .map_err(|_| AppError::unauthorized("invalid token"))?;

    request.extensions_mut().insert(AuthContext {
        user_id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_extraction_requires_the_scheme() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("abc123"), None);
    }
}
