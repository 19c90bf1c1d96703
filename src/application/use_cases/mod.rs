//! User use-cases.
//!
//! Each use-case validates its input, consults the repository for the
//! current state and delegates persistence back to it. None of them retry
//! or recover: every failure is returned to the caller as a `DomainError`.

mod create_user;
mod delete_user;
mod get_user;
mod update_user;

pub use create_user::{CreateUserInput, CreateUserUseCase};
pub use delete_user::DeleteUserUseCase;
pub use get_user::GetUserUseCase;
pub use update_user::{UpdateUserInput, UpdateUserUseCase};

use crate::domain::DomainError;

/// Reject a blank required field with `<field> is required`
fn require(value: &str, field: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }

    Ok(())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
