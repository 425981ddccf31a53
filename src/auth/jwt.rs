//! JWT access token management.
//!
//! Provides access token generation and verification. Verification reports a
//! closed set of outcomes (`TokenStatus`) rather than using errors for
//! control flow, so callers switch on the result explicitly.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
    errors::ErrorKind,
};

use crate::auth::types::AccessClaims;
use crate::config::AuthConfig;
use crate::error::{AppError, Result};

/// Outcome of verifying a presented access token.
#[derive(Debug, Clone)]
pub enum TokenStatus {
    Valid(AccessClaims),
    Expired,
    SignatureMismatch,
    Malformed,
}

/// JWT token manager.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_ttl: i64,
}

impl JwtManager {
    /// Build from validated configuration. The secret is checked at startup
    /// by `AppConfig::validate`; an empty one here is a programming error.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        if config.jwt_secret.is_empty() {
            return Err(AppError::Config("JWT_SECRET is not set".to_string()));
        }

        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&["jobtrail"]);
        validation.validate_exp = true;
        validation.leeway = 30; // 30 seconds tolerance

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            access_token_ttl: config.access_token_ttl,
        })
    }

    /// Sign an access token for the given identity.
    pub fn generate_access_token(&self, user_id: i32, email: String) -> Result<String> {
        let claims = AccessClaims::new(user_id, email, self.access_token_ttl);
        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("token generation failed: {e}")))
    }

    /// Verify a presented token and classify the outcome.
    #[must_use]
    pub fn decode_access_token(&self, token: &str) -> TokenStatus {
        let result: std::result::Result<TokenData<AccessClaims>, _> =
            decode(token, &self.decoding_key, &self.validation);

        match result {
            Ok(data) => TokenStatus::Valid(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => TokenStatus::Expired,
                ErrorKind::InvalidSignature => TokenStatus::SignatureMismatch,
                _ => TokenStatus::Malformed,
            },
        }
    }

    /// Verify a presented token, mapping every failure to `Unauthorized`.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims> {
        match self.decode_access_token(token) {
            TokenStatus::Valid(claims) => Ok(claims),
            TokenStatus::Expired => Err(AppError::unauthorized("token expired")),
            TokenStatus::SignatureMismatch | TokenStatus::Malformed => {
                Err(AppError::unauthorized("invalid token"))
            }
        }
    }

    #[must_use]
    pub const fn access_token_ttl(&self) -> i64 {
        self.access_token_ttl
    }
}
