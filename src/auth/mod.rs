//! Authentication and session lifecycle core.
//!
//! Composition: `CredentialVerifier` checks a presented secret against stored
//! identity records, `TokenIssuer` mints a signed access token plus a random
//! opaque refresh token, `RefreshTokenStore` tracks outstanding refresh
//! tokens, and `AuthService` orchestrates login, refresh (with rotation),
//! logout and Google sign-in on top of the three.

pub mod credentials;
pub mod google;
pub mod jwt;
pub mod password;
pub mod refresh_store;
pub mod service;
pub mod tokens;
pub mod types;

pub use service::AuthService;
pub use types::{AccessClaims, AuthContext, TokenPair, UserProfile};
