//! Axum HTTP server assembly.

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use sea_orm::DatabaseConnection;

use crate::applications::ApplicationService;
use crate::auth::AuthService;
use crate::config::{AuthConfig, ServerConfig};
use crate::error::{AppError, Result};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService>,
    pub applications: Arc<ApplicationService>,
    pub auth_config: AuthConfig,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection, auth: Arc<AuthService>, auth_config: AuthConfig) -> Self {
        let applications = Arc::new(ApplicationService::new(db.clone()));
        Self {
            db,
            auth,
            applications,
            auth_config,
        }
    }
}

pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        let router = build_router(state, &config);
        Self { config, router }
    }

    pub async fn serve(self) -> Result<()> {
        let ip = self
            .config
            .bind_address
            .parse::<std::net::IpAddr>()
            .map_err(|e| {
                AppError::Config(format!(
                    "invalid bind address '{}': {e}",
                    self.config.bind_address
                ))
            })?;
        let addr = SocketAddr::new(ip, self.config.port);

        tracing::info!(%addr, "starting http server");
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            AppError::Config(format!("failed to bind {addr}: {e}"))
        })?;

        axum::serve(listener, self.router)
            .await
            .map_err(|e| AppError::internal(format!("server error: {e}")))?;
        Ok(())
    }
}

/// Assemble the full router; also used directly by integration tests.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = cors_layer(config);

    super::routes::create_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if config.cors_origins.contains(&"*".to_string()) {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        // Credentialed requests (the refresh cookie) need explicit origins.
        cors.allow_origin(origins).allow_credentials(true)
    }
}
