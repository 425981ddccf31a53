use sea_orm_migration::prelude::*;

use super::m20260830_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobApplications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobApplications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(JobApplications::UserId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JobApplications::CompanyName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JobApplications::JobUrl)
                            .string_len(2048)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JobApplications::ApplicationDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JobApplications::Status)
                            .string_len(16)
                            .not_null()
                            .default("applied"),
                    )
                    .col(
                        ColumnDef::new(JobApplications::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(JobApplications::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_applications_user_id")
                            .from(JobApplications::Table, JobApplications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Duplicate-application checks filter on (user_id, job_url).
        manager
            .create_index(
                Index::create()
                    .name("idx_job_applications_user_id_job_url")
                    .table(JobApplications::Table)
                    .col(JobApplications::UserId)
                    .col(JobApplications::JobUrl)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobApplications::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum JobApplications {
    Table,
    Id,
    UserId,
    CompanyName,
    JobUrl,
    ApplicationDate,
    Status,
    CreatedAt,
    UpdatedAt,
}
