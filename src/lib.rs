//! # jobtrail core library
//!
//! Job-application tracker built around a rotating refresh-token session
//! core: short-lived signed access tokens, opaque server-tracked refresh
//! tokens rotated on every use, and Google sign-in converging into the same
//! session model.

pub mod applications;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod management;
pub mod testing;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, Result};
