//! Token pair issuance.
//!
//! The only mint path for refresh tokens: login, Google sign-in and refresh
//! rotation all go through [`TokenIssuer::issue`]. The connection is passed
//! in so a rotation can mint inside the transaction that claimed the old
//! token.

use chrono::{Duration, Utc};
use rand::RngCore;
use sea_orm::ConnectionTrait;
use std::sync::Arc;

use entity::users;

use crate::auth::jwt::JwtManager;
use crate::auth::refresh_store::RefreshTokenStore;
use crate::auth::types::TokenPair;
use crate::error::Result;

/// Refresh token entropy in bytes; 40 bytes hex-encoded is 320 bits.
const REFRESH_TOKEN_BYTES: usize = 40;

pub struct TokenIssuer {
    jwt: Arc<JwtManager>,
    refresh_token_ttl: i64,
}

impl TokenIssuer {
    #[must_use]
    pub const fn new(jwt: Arc<JwtManager>, refresh_token_ttl: i64) -> Self {
        Self {
            jwt,
            refresh_token_ttl,
        }
    }

    /// Mint an access/refresh pair for a verified identity and persist the
    /// refresh record.
    ///
    /// The refresh token is an opaque random string generated independently
    /// of the access token; the two are linked only through the stored
    /// record.
    pub async fn issue<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: &users::Model,
    ) -> Result<TokenPair> {
        let access_token = self
            .jwt
            .generate_access_token(user.id, user.email.clone())?;

        let refresh_token = generate_refresh_token();
        let expires_at = (Utc::now() + Duration::seconds(self.refresh_token_ttl)).naive_utc();

        RefreshTokenStore::create(conn, user.id, &refresh_token, expires_at).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_ttl(),
        })
    }
}

/// Cryptographically random opaque refresh token value.
#[must_use]
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
