//! Shared harness for exercising the router end to end with `oneshot`.

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct RequestSpec<'a> {
    pub method: &'a str,
    pub uri: &'a str,
    pub bearer: Option<&'a str>,
    pub cookie: Option<&'a str>,
    pub body: Option<Value>,
}

impl<'a> RequestSpec<'a> {
    pub fn new(method: &'a str, uri: &'a str) -> Self {
        Self {
            method,
            uri,
            bearer: None,
            cookie: None,
            body: None,
        }
    }

    pub fn bearer(mut self, token: &'a str) -> Self {
        self.bearer = Some(token);
        self
    }

    pub fn cookie(mut self, cookie: &'a str) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

pub async fn send(router: &Router, spec: RequestSpec<'_>) -> ApiResponse {
    let mut builder = Request::builder().method(spec.method).uri(spec.uri);
    if let Some(token) = spec.bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(cookie) = spec.cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match spec.body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router never fails");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    ApiResponse {
        status,
        headers,
        body,
    }
}

/// The `refreshToken=<value>` pair from a `Set-Cookie` header, ready to be
/// echoed back in a `Cookie` header.
pub fn refresh_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = raw.split(';').next()?.trim();
    pair.starts_with("refreshToken=").then(|| pair.to_string())
}

pub fn access_token(body: &Value) -> String {
    body.get("accessToken")
        .and_then(Value::as_str)
        .expect("session response carries accessToken")
        .to_string()
}
