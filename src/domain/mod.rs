//! Domain layer - User entity, validation rules and the repository port

pub mod error;
pub mod user;

pub use error::DomainError;
pub use user::{CompletedLesson, User, UserRecord, UserRepository, UserValidationError};
