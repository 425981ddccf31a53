//! Field-level request validation.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::FieldError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Reject passwords containing 4+ consecutive ascending digits (1234, 5678),
/// even when interleaved with letters.
#[must_use]
pub fn has_sequential_digits(password: &str) -> bool {
    let digits: Vec<u32> = password.chars().filter_map(|c| c.to_digit(10)).collect();
    digits
        .windows(4)
        .any(|w| w[1] == w[0] + 1 && w[2] == w[0] + 2 && w[3] == w[0] + 3)
}

pub fn validate_password(password: &str, errors: &mut Vec<FieldError>) {
    if password.len() < 8 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters long",
        ));
        return;
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least 1 uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least 1 number",
        ));
    }
    if has_sequential_digits(password) {
        errors.push(FieldError::new(
            "password",
            "Password cannot contain sequential numbers like 1234, 5678, etc.",
        ));
    }
}

pub fn validate_register(
    email: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Email must be a valid email address"));
    }
    if first_name.trim().is_empty() {
        errors.push(FieldError::new("firstName", "First name is required"));
    }
    if last_name.trim().is_empty() {
        errors.push(FieldError::new("lastName", "Last name is required"));
    }
    validate_password(password, &mut errors);
    errors
}

pub fn validate_login(email: &str, password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Email must be a valid email address"));
    }
    if password.len() < 8 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters long",
        ));
    }
    errors
}
