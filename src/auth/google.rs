//! Google identity assertion verification.
//!
//! Signature, issuer and audience checks are delegated to Google's tokeninfo
//! endpoint; this module only confirms the audience matches our client id and
//! extracts the profile claims. Any failure maps to `InvalidAssertion`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GoogleConfig;
use crate::error::{AppError, Result};

/// Claims extracted from a verified federated assertion.
#[derive(Debug, Clone)]
pub struct FederatedProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Seam for federated identity verification; tests inject a stub.
#[async_trait]
pub trait AssertionVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<FederatedProfile>;
}

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Deserialize)]
struct TokenInfoResponse {
    aud: String,
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
}

pub struct GoogleVerifier {
    http_client: reqwest::Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleVerifier {
    #[must_use]
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            tokeninfo_url: GOOGLE_TOKENINFO_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_endpoint(config: &GoogleConfig, tokeninfo_url: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            tokeninfo_url,
        }
    }
}

#[async_trait]
impl AssertionVerifier for GoogleVerifier {
    async fn verify(&self, id_token: &str) -> Result<FederatedProfile> {
        let response = self
            .http_client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "tokeninfo request failed");
                AppError::InvalidAssertion
            })?;

        if !response.status().is_success() {
            return Err(AppError::InvalidAssertion);
        }

        let info: TokenInfoResponse = response
            .json()
            .await
            .map_err(|_| AppError::InvalidAssertion)?;

        if info.aud != self.client_id {
            tracing::warn!("google id token audience mismatch");
            return Err(AppError::InvalidAssertion);
        }

        let email = info
            .email
            .filter(|e| !e.is_empty())
            .ok_or(AppError::InvalidAssertion)?;

        Ok(FederatedProfile {
            email,
            first_name: info.given_name.unwrap_or_default(),
            last_name: info.family_name.unwrap_or_default(),
        })
    }
}

/// Used when no Google client id is configured: every assertion is rejected.
pub struct DisabledVerifier;

#[async_trait]
impl AssertionVerifier for DisabledVerifier {
    async fn verify(&self, _id_token: &str) -> Result<FederatedProfile> {
        Err(AppError::InvalidAssertion)
    }
}
