//! Tracked job applications, one row per (user, job URL).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "job_applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub company_name: String,
    /// Stored trimmed and lowercased so duplicate checks are case-insensitive.
    pub job_url: String,
    pub application_date: DateTime,
    pub status: ApplicationStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "applied")]
    Applied,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "interview")]
    Interview,
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        Self::Applied
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
