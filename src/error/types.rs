//! Error taxonomy and the HTTP boundary mapping.
//!
//! Domain errors are mapped to status codes in one place; anything
//! unrecognized becomes a 500 with a generic body. Stack traces, query text
//! and store internals are logged server-side and never serialized into a
//! response.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One field-level validation failure, surfaced in 400 bodies.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input; carries field-level detail for the caller.
    #[error("validation error")]
    Validation(Vec<FieldError>),

    /// Bad credentials or a missing/expired/revoked token. The message is
    /// deliberately generic so callers cannot distinguish "no such account"
    /// from "wrong secret".
    #[error("{0}")]
    Unauthorized(String),

    /// A federated identity assertion failed verification.
    #[error("invalid identity token")]
    InvalidAssertion,

    /// Duplicate email on register, duplicate token value, duplicate
    /// application URL.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    /// Fatal startup misconfiguration (e.g. missing signing secret). Never
    /// produced per-request.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Status code this error maps to at the HTTP boundary.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::InvalidAssertion => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Config(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::Validation(errors) => json!({
                "message": "validation error",
                "errors": errors,
            }),
            Self::Unauthorized(message) => json!({ "message": message }),
            Self::InvalidAssertion => json!({ "message": "invalid identity token" }),
            Self::Conflict(message) | Self::NotFound(message) => json!({ "message": message }),
            Self::Config(_) | Self::Database(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "request failed with server error");
                json!({ "message": "internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}
