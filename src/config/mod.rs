//! Application configuration.
//!
//! Built once from the process environment at startup and handed to services
//! by reference; request-handling code never reads ambient environment state.
//! A missing signing secret is a fatal startup error, not a per-request one.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Application main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    /// Google sign-in is optional; when absent the federated endpoint
    /// rejects every assertion.
    pub google: Option<GoogleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://jobtrail.db?mode=rwc".to_string(),
            max_connections: 10,
        }
    }
}

/// Token lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric secret for signing access tokens.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl: i64,
    /// Interval between background sweeps of expired refresh tokens.
    pub sweep_interval_secs: u64,
    /// Whether refresh cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl: 3600,        // 1 hour
            refresh_token_ttl: 7 * 86_400, // 7 days
            sweep_interval_secs: 3600,
            secure_cookies: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig {
            bind_address: env_or("BIND_ADDRESS", "0.0.0.0"),
            port: parse_env("PORT", 3000)?,
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
        };

        let database = DatabaseConfig {
            url: env_or("DATABASE_URL", "sqlite://jobtrail.db?mode=rwc"),
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
        };

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or_default(),
            access_token_ttl: parse_env("ACCESS_TOKEN_TTL_SECS", 3600)?,
            refresh_token_ttl: parse_env("REFRESH_TOKEN_TTL_SECS", 7 * 86_400)?,
            sweep_interval_secs: parse_env("TOKEN_SWEEP_INTERVAL_SECS", 3600)?,
            secure_cookies: env_or("SECURE_COOKIES", "true") != "false",
        };

        let google = std::env::var("GOOGLE_CLIENT_ID")
            .ok()
            .filter(|id| !id.is_empty())
            .map(|client_id| GoogleConfig { client_id });

        let config = Self {
            server,
            database,
            auth,
            google,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration before anything starts serving.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::Config("JWT_SECRET is not set".to_string()));
        }
        if self.auth.access_token_ttl <= 0 {
            return Err(AppError::Config(
                "access token TTL must be positive".to_string(),
            ));
        }
        if self.auth.refresh_token_ttl <= 0 {
            return Err(AppError::Config(
                "refresh token TTL must be positive".to_string(),
            ));
        }
        if self.database.url.is_empty() {
            return Err(AppError::Config("database URL cannot be empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(AppError::Config(
                "database max_connections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("invalid value for {key}: {raw}"))),
        Err(_) => Ok(default),
    }
}
