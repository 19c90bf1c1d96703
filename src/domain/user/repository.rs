//! User repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::User;
use crate::domain::DomainError;

/// Persistence port for user snapshots.
///
/// `create_user`, `update_user` and `delete_user` are conditional writes:
/// an implementation must apply the existence check and the write as one
/// atomic step, so that concurrent callers racing on the same `user_id`
/// see exactly one winner.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get the current snapshot, `None` when no record exists
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user, failing with `UserAlreadyExists` if the id is taken
    async fn create_user(&self, user: User) -> Result<User, DomainError>;

    /// Persist over an existing user, failing with `UserNotFound` otherwise.
    ///
    /// Returns the snapshot as committed by the store.
    async fn update_user(&self, user: User) -> Result<User, DomainError>;

    /// Set `last_login_at` to the current time
    async fn update_last_login(&self, user_id: &str) -> Result<(), DomainError>;

    /// Check if a user record exists
    async fn user_exists(&self, user_id: &str) -> Result<bool, DomainError> {
        Ok(self.get_user_by_id(user_id).await?.is_some())
    }

    /// Remove a user, failing with `UserNotFound` if absent
    async fn delete_user(&self, user_id: &str) -> Result<(), DomainError>;
}
