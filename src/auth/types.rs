//! Shared authentication data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access token payload.
///
/// Stateless by design: anyone holding the signing secret can verify it, and
/// revocation before natural expiry is impossible. Only refresh tokens are
/// revocable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id.
    pub sub: String,
    pub email: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
    pub iss: String,
}

impl AccessClaims {
    pub fn new(user_id: i32, email: String, expires_in_seconds: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            email,
            iat: now,
            exp: now + expires_in_seconds,
            iss: "jobtrail".to_string(),
        }
    }

    pub fn user_id(&self) -> Result<i32, std::num::ParseIntError> {
        self.sub.parse()
    }
}

/// A freshly minted access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Authenticated request context injected by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i32,
    pub email: String,
}

/// Public profile fields returned to callers; never includes the hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<entity::users::Model> for UserProfile {
    fn from(user: entity::users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at.and_utc(),
        }
    }
}
