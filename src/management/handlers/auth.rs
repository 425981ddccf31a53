//! Authentication endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use crate::auth::service::RegisterInput;
use crate::auth::types::TokenPair;
use crate::error::{AppError, Result};
use crate::management::middleware::auth::extract_bearer_token;
use crate::management::server::AppState;
use crate::management::validation;

use super::cookies;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRequest {
    #[serde(default)]
    pub id_token: String,
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response> {
    let errors = validation::validate_register(
        &request.email,
        &request.first_name,
        &request.last_name,
        &request.password,
    );
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let profile = state
        .auth
        .register(RegisterInput {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            password: request.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response> {
    let errors = validation::validate_login(&request.email, &request.password);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let pair = state.auth.login(&request.email, &request.password).await?;
    Ok(session_response(&state, &pair))
}

/// `POST /auth/google`
pub async fn google(
    State(state): State<AppState>,
    Json(request): Json<GoogleRequest>,
) -> Result<Response> {
    if request.id_token.is_empty() {
        return Err(AppError::Validation(vec![crate::error::FieldError::new(
            "idToken",
            "ID token is required",
        )]));
    }

    let pair = state.auth.login_google(&request.id_token).await?;
    Ok(session_response(&state, &pair))
}

/// `GET /auth/me`
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let header = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("missing authorization header"))?;
    let token = extract_bearer_token(header)
        .ok_or_else(|| AppError::unauthorized("invalid authorization format"))?;

    let profile = state.auth.current_user(token).await?;
    Ok(Json(profile).into_response())
}

/// `POST /auth/refresh` — rotates the refresh cookie.
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let token = cookies::read_refresh_cookie(&headers)
        .ok_or_else(|| AppError::unauthorized("missing refresh token"))?;

    let pair = state.auth.refresh(&token).await?;
    Ok(session_response(&state, &pair))
}

/// `POST /auth/logout` — always 200, clears the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    if let Some(token) = cookies::read_refresh_cookie(&headers) {
        state.auth.logout(&token).await?;
    }

    let mut response = Json(json!({ "message": "logged out" })).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        cookies::clear_refresh_cookie(state.auth_config.secure_cookies),
    );
    Ok(response)
}

/// 200 body with the access token plus the refresh cookie.
fn session_response(state: &AppState, pair: &TokenPair) -> Response {
    let mut response = Json(json!({ "accessToken": pair.access_token })).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        cookies::set_refresh_cookie(
            &pair.refresh_token,
            state.auth_config.refresh_token_ttl,
            state.auth_config.secure_cookies,
        ),
    );
    response
}
