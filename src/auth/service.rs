//! Session coordination: login, refresh, logout, Google sign-in.
//!
//! Composes the credential verifier, token issuer and refresh store. Each
//! operation is an independent unit of work; the only shared state is the
//! database connection, and the rotation race is settled by the store's
//! conditional delete.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};
use std::sync::Arc;

use entity::users;

use crate::auth::credentials::{CredentialVerifier, normalize_email};
use crate::auth::google::AssertionVerifier;
use crate::auth::jwt::{JwtManager, TokenStatus};
use crate::auth::password;
use crate::auth::refresh_store::RefreshTokenStore;
use crate::auth::tokens::TokenIssuer;
use crate::auth::types::{TokenPair, UserProfile};
use crate::error::{AppError, Result};

/// Validated registration input (field rules are enforced at the boundary).
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

pub struct AuthService {
    db: DatabaseConnection,
    jwt: Arc<JwtManager>,
    issuer: TokenIssuer,
    assertion_verifier: Arc<dyn AssertionVerifier>,
}

impl AuthService {
    pub fn new(
        db: DatabaseConnection,
        jwt: Arc<JwtManager>,
        assertion_verifier: Arc<dyn AssertionVerifier>,
        refresh_token_ttl: i64,
    ) -> Self {
        let issuer = TokenIssuer::new(jwt.clone(), refresh_token_ttl);
        Self {
            db,
            jwt,
            issuer,
            assertion_verifier,
        }
    }

    /// Create a new account. Duplicate email is a conflict.
    pub async fn register(&self, input: RegisterInput) -> Result<UserProfile> {
        let email = normalize_email(&input.email);

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::conflict("User already exists"));
        }

        let now = Utc::now().naive_utc();
        let user = users::ActiveModel {
            email: Set(email),
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            password_hash: Set(password::hash_password(&input.password)?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(user_id = user.id, "user registered");
        Ok(user.into())
    }

    /// Password login: verify credentials, then mint a fresh pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let user = CredentialVerifier::verify(&self.db, email, password)
            .await
            .inspect_err(|_| {
                tracing::warn!("login failed");
            })?;

        let pair = self.issuer.issue(&self.db, &user).await?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok(pair)
    }

    /// Google sign-in. Verifies the assertion, creating a local identity on
    /// first sight of the email; that identity gets an unusable password
    /// hash so it can never be logged into via password.
    pub async fn login_google(&self, id_token: &str) -> Result<TokenPair> {
        let profile = self.assertion_verifier.verify(id_token).await?;
        let email = normalize_email(&profile.email);

        let user = match users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(&self.db)
            .await?
        {
            Some(user) => user,
            None => {
                let now = Utc::now().naive_utc();
                let user = users::ActiveModel {
                    email: Set(email),
                    first_name: Set(profile.first_name),
                    last_name: Set(profile.last_name),
                    password_hash: Set(password::unusable_hash()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&self.db)
                .await?;
                tracing::info!(user_id = user.id, "user created via google sign-in");
                user
            }
        };

        let pair = self.issuer.issue(&self.db, &user).await?;
        tracing::info!(user_id = user.id, "user logged in via google");
        Ok(pair)
    }

    /// Exchange a refresh token for a brand-new access/refresh pair.
    ///
    /// Rotation: the presented value is claimed (deleted) and the new record
    /// inserted inside one transaction, so an abort at any point rolls the
    /// claim back and leaves the old token intact — the rotation either
    /// fully replaces the record or changes nothing. Of two concurrent calls
    /// on the same value, exactly one wins the claim; the loser gets
    /// `Unauthorized`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        // Expiry is checked (and an expired record deleted) outside the
        // transaction so the lazy cleanup sticks even when rotation fails.
        let record = RefreshTokenStore::find_valid(&self.db, refresh_token)
            .await?
            .ok_or_else(|| AppError::unauthorized("invalid refresh token"))?;

        let user = users::Entity::find_by_id(record.user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::unauthorized("invalid refresh token"))?;

        let txn = self.db.begin().await?;

        if !RefreshTokenStore::claim(&txn, refresh_token).await? {
            // Lost a race against a concurrent refresh or logout.
            return Err(AppError::unauthorized("invalid refresh token"));
        }

        let pair = self.issuer.issue(&txn, &user).await?;
        txn.commit().await?;

        tracing::debug!(user_id = user.id, "refresh token rotated");
        Ok(pair)
    }

    /// Revoke a refresh token. Always succeeds, even for unknown values.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        RefreshTokenStore::delete_by_token(&self.db, refresh_token).await?;
        tracing::debug!("refresh token revoked");
        Ok(())
    }

    /// Remove refresh tokens past their expiry; run by the background sweep.
    pub async fn sweep_expired(&self) -> Result<u64> {
        RefreshTokenStore::sweep_expired(&self.db).await
    }

    /// Resolve an access token to the public profile of its subject.
    pub async fn current_user(&self, access_token: &str) -> Result<UserProfile> {
        let claims = match self.jwt.decode_access_token(access_token) {
            TokenStatus::Valid(claims) => claims,
            TokenStatus::Expired => return Err(AppError::unauthorized("token expired")),
            TokenStatus::SignatureMismatch | TokenStatus::Malformed => {
                return Err(AppError::unauthorized("invalid token"));
            }
        };

        let user_id = claims
            .user_id()
            .map_err(|_| AppError::unauthorized("invalid token"))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::unauthorized("invalid token"))?;

        Ok(user.into())
    }

    #[must_use]
    pub const fn jwt_manager(&self) -> &Arc<JwtManager> {
        &self.jwt
    }
}
