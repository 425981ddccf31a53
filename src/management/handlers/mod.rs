//! HTTP handlers.

pub mod applications;
pub mod auth;
pub mod cookies;
