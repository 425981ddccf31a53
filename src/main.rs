//! # jobtrail server binary
//!
//! Loads configuration, prepares the database, and serves the HTTP API with
//! a background sweep for expired refresh tokens.

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database};
use tracing_subscriber::EnvFilter;

use jobtrail::auth::google::{AssertionVerifier, DisabledVerifier, GoogleVerifier};
use jobtrail::auth::jwt::JwtManager;
use jobtrail::auth::AuthService;
use jobtrail::management::{AppState, HttpServer};
use jobtrail::{AppConfig, Result};
use migration::{Migrator, MigratorTrait};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration is invalid, refusing to start");
            std::process::exit(1);
        }
    };

    let mut options = ConnectOptions::new(config.database.url.clone());
    options
        .max_connections(config.database.max_connections)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;

    tracing::info!("running database migrations");
    Migrator::up(&db, None).await.map_err(jobtrail::AppError::Database)?;

    let jwt = Arc::new(JwtManager::new(&config.auth)?);
    let assertion_verifier: Arc<dyn AssertionVerifier> = match &config.google {
        Some(google) => Arc::new(GoogleVerifier::new(google)),
        None => {
            tracing::warn!("GOOGLE_CLIENT_ID not set, google sign-in disabled");
            Arc::new(DisabledVerifier)
        }
    };
    let auth = Arc::new(AuthService::new(
        db.clone(),
        jwt,
        assertion_verifier,
        config.auth.refresh_token_ttl,
    ));

    spawn_token_sweeper(auth.clone(), config.auth.sweep_interval_secs);

    let state = AppState::new(db, auth, config.auth.clone());
    HttpServer::new(config.server, state).serve().await
}

/// Periodically removes expired refresh tokens so the store does not grow
/// without bound. Lapsed tokens are also rejected on sight, so the sweep is
/// purely housekeeping.
fn spawn_token_sweeper(auth: Arc<AuthService>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.tick().await; // first tick completes immediately
        loop {
            ticker.tick().await;
            match auth.sweep_expired().await {
                Ok(removed) if removed > 0 => {
                    tracing::info!(removed, "swept expired refresh tokens");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "refresh token sweep failed"),
            }
        }
    });
}
