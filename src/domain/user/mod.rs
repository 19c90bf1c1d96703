//! User domain
//!
//! This module provides the user profile entity, its validation rules and
//! the repository port the use-cases persist through.

mod entity;
mod repository;
mod validation;

pub use entity::{format_timestamp, parse_timestamp, CompletedLesson, User, UserRecord};
pub use repository::UserRepository;
pub use validation::{
    validate_email, validate_name, validate_user_id, UserValidationError, MAX_NAME_LENGTH,
};

#[cfg(test)]
pub use repository::MockUserRepository;
