//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Maximum length of a display name, in characters
pub const MAX_NAME_LENGTH: usize = 200;

/// `local@domain.tld` with no whitespace and at least one dot after the `@`
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Errors raised while constructing a [`User`](super::User)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("userId is required and cannot be empty")]
    EmptyUserId,

    #[error("Valid email is required")]
    InvalidEmail,

    #[error("name is required and cannot be empty")]
    EmptyName,

    #[error("name must be at most {0} characters")]
    NameTooLong(usize),

    #[error("{field} must be a valid timestamp, got '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// Validate a user identifier
///
/// Rules:
/// - Cannot be empty or whitespace only
pub fn validate_user_id(user_id: &str) -> Result<(), UserValidationError> {
    if user_id.trim().is_empty() {
        return Err(UserValidationError::EmptyUserId);
    }

    Ok(())
}

/// Validate an email address against the `local@domain.tld` shape
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate a display name
///
/// Rules:
/// - Cannot be empty or whitespace only
/// - Maximum 200 UTF-16 code units, so characters outside the BMP count twice
pub fn validate_name(name: &str) -> Result<(), UserValidationError> {
    if name.trim().is_empty() {
        return Err(UserValidationError::EmptyName);
    }

    if name.encode_utf16().count() > MAX_NAME_LENGTH {
        return Err(UserValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}
