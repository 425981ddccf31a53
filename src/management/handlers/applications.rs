//! Job-application endpoints. All of them run behind the auth middleware,
//! so the `AuthContext` extension is always present.

use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use entity::job_applications::{self, ApplicationStatus};

use crate::applications::{CreateApplication, UpdateApplication};
use crate::auth::AuthContext;
use crate::error::{AppError, FieldError, Result};
use crate::management::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_url: String,
    pub application_date: Option<String>,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationRequest {
    pub company_name: Option<String>,
    pub application_date: Option<String>,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: i32,
    pub company_name: String,
    pub job_url: String,
    pub application_date: NaiveDateTime,
    pub status: ApplicationStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<job_applications::Model> for ApplicationResponse {
    fn from(model: job_applications::Model) -> Self {
        Self {
            id: model.id,
            company_name: model.company_name,
            job_url: model.job_url,
            application_date: model.application_date,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates.
fn parse_application_date(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(timestamp) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.naive_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).expect("midnight is valid"));
    }
    Err(AppError::Validation(vec![FieldError::new(
        "applicationDate",
        "Application date must be a valid date",
    )]))
}

fn validate_create(request: &CreateApplicationRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if request.company_name.trim().is_empty() {
        errors.push(FieldError::new("companyName", "Company name is required"));
    }
    let url = request.job_url.trim();
    if url.is_empty() {
        errors.push(FieldError::new("jobUrl", "Job URL is required"));
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(FieldError::new("jobUrl", "Job URL must be a valid URL"));
    }
    errors
}

/// `POST /applications`
pub async fn create(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<Response> {
    let errors = validate_create(&request);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let application_date = match &request.application_date {
        Some(raw) => parse_application_date(raw)?,
        None => Utc::now().naive_utc(),
    };

    let application = state
        .applications
        .create(
            ctx.user_id,
            CreateApplication {
                company_name: request.company_name,
                job_url: request.job_url,
                application_date,
                status: request.status.unwrap_or_default(),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from(application)),
    )
        .into_response())
}

/// `GET /applications`
pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Response> {
    let applications: Vec<ApplicationResponse> = state
        .applications
        .list(ctx.user_id)
        .await?
        .into_iter()
        .map(ApplicationResponse::from)
        .collect();
    Ok(Json(applications).into_response())
}

/// `GET /applications/check?url=...`
pub async fn check_by_url(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<CheckQuery>,
) -> Result<Response> {
    if query.url.trim().is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "url",
            "URL is required",
        )]));
    }

    let application = state
        .applications
        .find_by_url(ctx.user_id, &query.url)
        .await?;
    Ok(Json(json!({
        "applied": application.is_some(),
        "application": application.map(ApplicationResponse::from),
    }))
    .into_response())
}

/// `PUT /applications/{id}`
pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateApplicationRequest>,
) -> Result<Response> {
    let application_date = match &request.application_date {
        Some(raw) => Some(parse_application_date(raw)?),
        None => None,
    };

    let application = state
        .applications
        .update(
            id,
            ctx.user_id,
            UpdateApplication {
                company_name: request.company_name,
                application_date,
                status: request.status,
            },
        )
        .await?;
    Ok(Json(ApplicationResponse::from(application)).into_response())
}

/// `DELETE /applications/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<i32>,
) -> Result<Response> {
    state.applications.delete(id, ctx.user_id).await?;
    Ok(Json(json!({ "message": "Application deleted" })).into_response())
}
