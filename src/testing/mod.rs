//! Shared test fixtures: in-memory sqlite with migrations applied, user
//! fixtures, and an assembled `AuthService` with a stubbed Google verifier.
//!
//! Compiled into the library so both unit tests and the `tests/` directory
//! can use it; production code never calls into this module.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection};
use std::sync::Arc;

use entity::users;
use migration::{Migrator, MigratorTrait};

use crate::auth::AuthService;
use crate::auth::google::{AssertionVerifier, FederatedProfile};
use crate::auth::jwt::JwtManager;
use crate::auth::password;
use crate::config::AuthConfig;
use crate::error::{AppError, Result};

/// Fresh in-memory database with the full schema.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// Auth configuration usable in tests without any environment.
#[must_use]
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-key-for-jwt-testing".to_string(),
        secure_cookies: false,
        ..AuthConfig::default()
    }
}

/// Insert a user with a real bcrypt hash for the given password.
pub async fn insert_user(db: &DatabaseConnection, email: &str, plain_password: &str) -> users::Model {
    let now = Utc::now().naive_utc();
    users::ActiveModel {
        email: Set(email.to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set("User".to_string()),
        password_hash: Set(password::hash_password(plain_password).expect("hash password")),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert test user")
}

/// Stub assertion verifier: accepts tokens of the form `stub:<email>` and
/// rejects everything else, mirroring the real verifier's failure mode.
pub struct StubAssertionVerifier;

#[async_trait]
impl AssertionVerifier for StubAssertionVerifier {
    async fn verify(&self, id_token: &str) -> Result<FederatedProfile> {
        let email = id_token
            .strip_prefix("stub:")
            .ok_or(AppError::InvalidAssertion)?;
        Ok(FederatedProfile {
            email: email.to_string(),
            first_name: "Stub".to_string(),
            last_name: "User".to_string(),
        })
    }
}

/// A database plus an assembled auth service, ready for exercising flows.
pub struct TestContext {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService>,
    pub auth_config: AuthConfig,
}

impl TestContext {
    pub async fn new() -> Self {
        let db = setup_test_db().await;
        let auth_config = test_auth_config();
        let jwt = Arc::new(JwtManager::new(&auth_config).expect("jwt manager"));
        let auth = Arc::new(AuthService::new(
            db.clone(),
            jwt,
            Arc::new(StubAssertionVerifier),
            auth_config.refresh_token_ttl,
        ));
        Self {
            db,
            auth,
            auth_config,
        }
    }

    /// Full application router over this context, as served in production.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        let state = crate::management::AppState::new(
            self.db.clone(),
            self.auth.clone(),
            self.auth_config.clone(),
        );
        crate::management::server::build_router(state, &crate::config::ServerConfig::default())
    }
}
