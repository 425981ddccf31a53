//! Credential verification against stored identity records.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use entity::users;

use crate::auth::password;
use crate::error::{AppError, Result};

/// Normalize an email for lookup and storage: trim plus lowercase.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks a presented password against the stored identity record.
pub struct CredentialVerifier;

impl CredentialVerifier {
    /// Look up the identity by normalized email and verify the password.
    ///
    /// "No such email" and "wrong password" produce the same generic
    /// `Unauthorized` so callers cannot enumerate accounts.
    pub async fn verify(
        db: &DatabaseConnection,
        email: &str,
        password: &str,
    ) -> Result<users::Model> {
        let email = normalize_email(email);

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(db)
            .await?
            .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

        if !password::verify_password(password, &user.password_hash) {
            return Err(AppError::unauthorized("invalid credentials"));
        }

        Ok(user)
    }
}
