//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::user::{User, UserRepository};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository.
///
/// Each conditional write holds the map's write lock for the check and the
/// write together. Data lives only as long as the repository value.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let users_map = users
            .into_iter()
            .map(|user| (user.user_id().to_string(), user))
            .collect();

        Self {
            users: Arc::new(RwLock::new(users_map)),
        }
    }

    /// Remove every stored user
    pub async fn clear(&self) {
        self.users.write().await.clear();
    }

    /// Snapshot of every stored user, in no particular order
    pub async fn all_users(&self) -> Vec<User> {
        self.users.read().await.values().cloned().collect()
    }

    /// Number of stored users
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn create_user(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        if users.contains_key(user.user_id()) {
            return Err(DomainError::already_exists(user.user_id()));
        }

        users.insert(user.user_id().to_string(), user.clone());
        debug!(user_id = %user.user_id(), "Stored new user in memory");

        Ok(user)
    }

    async fn update_user(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        match users.get_mut(user.user_id()) {
            Some(stored) => {
                *stored = user.clone();
                Ok(user)
            }
            None => Err(DomainError::not_found(user.user_id())),
        }
    }

    async fn update_last_login(&self, user_id: &str) -> Result<(), DomainError> {
        let mut users = self.users.write().await;

        match users.get_mut(user_id) {
            Some(stored) => {
                *stored = stored.update_last_login();
                Ok(())
            }
            None => Err(DomainError::not_found(user_id)),
        }
    }

    async fn user_exists(&self, user_id: &str) -> Result<bool, DomainError> {
        Ok(self.users.read().await.contains_key(user_id))
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), DomainError> {
        let mut users = self.users.write().await;

        users
            .remove(user_id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(user_id))
    }
}
