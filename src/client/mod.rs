//! HTTP client for the jobtrail API.
//!
//! Wraps [`reqwest`] with a cookie jar (the refresh cookie never surfaces to
//! callers), an in-memory access token, and transparent session renewal: a
//! 401 on any request triggers one `POST /auth/refresh` followed by a single
//! replay of the original request. The refresh call itself is never retried,
//! and a failed renewal clears the cached token so the caller sees a clean
//! unauthorized error.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::error::{AppError, FieldError, Result};

const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionBody {
    access_token: String,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    access_token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| AppError::internal(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: RwLock::new(None),
        })
    }

    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// Replace the cached access token, e.g. when resuming a persisted
    /// session. `None` forces the next authorized request through a renewal.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    pub async fn register(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
    ) -> Result<Value> {
        self.post(
            "/auth/register",
            &json!({
                "email": email,
                "firstName": first_name,
                "lastName": last_name,
                "password": password,
            }),
        )
        .await
    }

    /// Log in and cache the resulting access token. The refresh cookie lands
    /// in the jar as a side effect.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let body = self
            .post(
                "/auth/login",
                &json!({ "email": email, "password": password }),
            )
            .await?;
        self.store_session(body).await
    }

    pub async fn login_google(&self, id_token: &str) -> Result<()> {
        let body = self
            .post("/auth/google", &json!({ "idToken": id_token }))
            .await?;
        self.store_session(body).await
    }

    pub async fn me(&self) -> Result<Value> {
        self.get("/auth/me").await
    }

    /// Invalidate the server-side session and drop the cached token.
    pub async fn logout(&self) -> Result<()> {
        let result = self.post("/auth/logout", &json!({})).await;
        *self.access_token.write().await = None;
        result.map(|_| ())
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None).await
    }

    async fn store_session(&self, body: Value) -> Result<()> {
        let session: SessionBody = serde_json::from_value(body)
            .map_err(|e| AppError::internal(format!("malformed session response: {e}")))?;
        *self.access_token.write().await = Some(session.access_token);
        Ok(())
    }

    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let response = self.execute(method.clone(), path, body).await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED && path != REFRESH_PATH {
            match self.renew_session().await {
                Ok(()) => self.execute(method, path, body).await?,
                Err(err) => {
                    *self.access_token.write().await = None;
                    return Err(err);
                }
            }
        } else {
            response
        };

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(body);
        }
        if status == StatusCode::UNAUTHORIZED {
            *self.access_token.write().await = None;
        }
        Err(error_from_response(status, &body))
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let mut builder = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = self.access_token.read().await.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
            .send()
            .await
            .map_err(|e| AppError::internal(format!("request failed: {e}")))
    }

    /// One refresh attempt; the jar supplies the cookie, so no bearer token
    /// is attached. Never replayed on failure.
    async fn renew_session(&self) -> Result<()> {
        let response = self
            .http
            .post(format!("{}{REFRESH_PATH}", self.base_url))
            .send()
            .await
            .map_err(|e| AppError::internal(format!("refresh failed: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(AppError::unauthorized("session expired"));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::internal(format!("malformed refresh response: {e}")))?;
        self.store_session(body).await
    }
}

fn error_from_response(status: StatusCode, body: &Value) -> AppError {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string();
    match status {
        StatusCode::BAD_REQUEST => AppError::Validation(field_errors(body)),
        StatusCode::UNAUTHORIZED => AppError::unauthorized(message),
        StatusCode::CONFLICT => AppError::conflict(message),
        StatusCode::NOT_FOUND => AppError::not_found(message),
        _ => AppError::internal(format!("unexpected status {status}: {message}")),
    }
}

/// Field-level detail from a 400 body, `[]` when the server sent none.
fn field_errors(body: &Value) -> Vec<FieldError> {
    body.get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| {
                    Some(FieldError::new(
                        e.get("field")?.as_str()?,
                        e.get("message")?.as_str()?,
                    ))
                })
                .collect()
        })
        .unwrap_or_default()
}
