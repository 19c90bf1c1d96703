//! Get user use-case

use std::sync::Arc;

use tracing::{debug, instrument};

use super::is_blank;
use crate::domain::{DomainError, User, UserRepository};

/// Looks up user profiles
pub struct GetUserUseCase<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> GetUserUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Fetch a user that must exist; a blank or unknown id is `UserNotFound`
    #[instrument(skip(self))]
    pub async fn execute(&self, user_id: &str) -> Result<User, DomainError> {
        if is_blank(user_id) {
            return Err(DomainError::not_found(user_id));
        }

        self.repository
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(user_id))
    }

    /// Probe for a user; a blank or unknown id yields `None`
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, DomainError> {
        if is_blank(user_id) {
            return Ok(None);
        }

        let user = self.repository.get_user_by_id(user_id).await?;
        debug!(found = user.is_some(), "Looked up user");

        Ok(user)
    }
}
