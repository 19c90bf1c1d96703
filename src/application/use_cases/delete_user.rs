//! Delete user use-case

use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::is_blank;
use crate::domain::{DomainError, UserRepository};

/// Removes user profiles
pub struct DeleteUserUseCase<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> DeleteUserUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Delete a user. A blank id is reported as `UserNotFound`, the same as
    /// an unknown one.
    #[instrument(skip(self))]
    pub async fn execute(&self, user_id: &str) -> Result<(), DomainError> {
        if is_blank(user_id) {
            return Err(DomainError::not_found(user_id));
        }

        if !self.repository.user_exists(user_id).await? {
            warn!("Attempted to delete unknown user");
            return Err(DomainError::not_found(user_id));
        }

        self.repository.delete_user(user_id).await?;
        info!("Deleted user");

        Ok(())
    }
}
