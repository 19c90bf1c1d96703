use std::error::Error as StdError;

use thiserror::Error;

use super::user::UserValidationError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors raised by the user use-cases.
///
/// The set is closed: callers match on it exhaustively and use
/// [`code`](Self::code) and [`status_code`](Self::status_code) to report it.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{message}")]
    Validation { message: String },

    #[error("User with ID {user_id} already exists")]
    UserAlreadyExists { user_id: String },

    #[error("User with ID {user_id} not found")]
    UserNotFound { user_id: String },

    /// The store failed unexpectedly. The underlying failure is kept as the
    /// error source and is not part of the message.
    #[error("Repository operation failed: {message}")]
    Repository {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn already_exists(user_id: impl Into<String>) -> Self {
        Self::UserAlreadyExists {
            user_id: user_id.into(),
        }
    }

    pub fn not_found(user_id: impl Into<String>) -> Self {
        Self::UserNotFound {
            user_id: user_id.into(),
        }
    }

    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a transport failure, keeping it as the error source
    pub fn repository_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Repository {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::UserAlreadyExists { .. } => "USER_ALREADY_EXISTS",
            Self::UserNotFound { .. } => "USER_NOT_FOUND",
            Self::Repository { .. } => "REPOSITORY_ERROR",
        }
    }

    /// Suggested HTTP status for callers that expose the error over HTTP
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } | Self::UserAlreadyExists { .. } => 400,
            Self::UserNotFound { .. } => 404,
            Self::Repository { .. } => 500,
        }
    }
}

impl From<UserValidationError> for DomainError {
    fn from(err: UserValidationError) -> Self {
        Self::validation(err.to_string())
    }
}
