//! Job-application CRUD.
//!
//! Every operation is scoped to the owning user; ownership is enforced in
//! the query filters, not after the fact.

use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

use entity::job_applications::{self, ApplicationStatus};

use crate::error::{AppError, Result};

/// Normalize a job URL for storage and duplicate checks.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    url.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct CreateApplication {
    pub company_name: String,
    pub job_url: String,
    pub application_date: NaiveDateTime,
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateApplication {
    pub company_name: Option<String>,
    pub application_date: Option<NaiveDateTime>,
    pub status: Option<ApplicationStatus>,
}

pub struct ApplicationService {
    db: DatabaseConnection,
}

impl ApplicationService {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create an application; a second application to the same URL by the
    /// same user is a conflict.
    pub async fn create(
        &self,
        user_id: i32,
        input: CreateApplication,
    ) -> Result<job_applications::Model> {
        let job_url = normalize_url(&input.job_url);

        let existing = self.find_by_url(user_id, &job_url).await?;
        if existing.is_some() {
            return Err(AppError::conflict(
                "You have already applied for this position",
            ));
        }

        let now = Utc::now().naive_utc();
        let application = job_applications::ActiveModel {
            user_id: Set(user_id),
            company_name: Set(input.company_name.trim().to_string()),
            job_url: Set(job_url),
            application_date: Set(input.application_date),
            status: Set(input.status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(user_id, application_id = application.id, "application created");
        Ok(application)
    }

    /// The caller's applications, most recent application date first.
    pub async fn list(&self, user_id: i32) -> Result<Vec<job_applications::Model>> {
        Ok(job_applications::Entity::find()
            .filter(job_applications::Column::UserId.eq(user_id))
            .order_by_desc(job_applications::Column::ApplicationDate)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_url(
        &self,
        user_id: i32,
        job_url: &str,
    ) -> Result<Option<job_applications::Model>> {
        Ok(job_applications::Entity::find()
            .filter(job_applications::Column::UserId.eq(user_id))
            .filter(job_applications::Column::JobUrl.eq(normalize_url(job_url)))
            .one(&self.db)
            .await?)
    }

    /// Partial update of an application the caller owns.
    pub async fn update(
        &self,
        application_id: i32,
        user_id: i32,
        input: UpdateApplication,
    ) -> Result<job_applications::Model> {
        let existing = job_applications::Entity::find_by_id(application_id)
            .filter(job_applications::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Application not found"))?;

        let mut active: job_applications::ActiveModel = existing.into();
        if let Some(company_name) = input.company_name {
            active.company_name = Set(company_name.trim().to_string());
        }
        if let Some(application_date) = input.application_date {
            active.application_date = Set(application_date);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now().naive_utc());

        Ok(active.update(&self.db).await?)
    }

    /// Delete an application the caller owns.
    pub async fn delete(&self, application_id: i32, user_id: i32) -> Result<()> {
        let outcome = job_applications::Entity::delete_many()
            .filter(job_applications::Column::Id.eq(application_id))
            .filter(job_applications::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if outcome.rows_affected == 0 {
            return Err(AppError::not_found("Application not found"));
        }
        Ok(())
    }
}
