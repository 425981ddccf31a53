//! The unified error handling system for the application.

pub use types::{AppError, FieldError};

/// A unified `Result` type for the entire application.
///
/// All functions that can fail should return this type.
pub type Result<T> = std::result::Result<T, AppError>;

pub mod types;
