//! Create user use-case

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use super::require;
use crate::domain::user::parse_timestamp;
use crate::domain::{DomainError, User, UserRepository};

/// Input for creating a user
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    /// RFC 3339 timestamp, defaults to now
    pub created_at: Option<String>,
    /// RFC 3339 timestamp, defaults to now
    pub last_login_at: Option<String>,
}

/// Registers a new user profile
pub struct CreateUserUseCase<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> CreateUserUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create the user, failing if the id is already taken.
    ///
    /// The lookup before the write only short-circuits the common duplicate
    /// case; the repository's conditional create still decides races.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn execute(&self, input: CreateUserInput) -> Result<User, DomainError> {
        Self::validate_input(&input)?;

        if self.repository.get_user_by_id(&input.user_id).await?.is_some() {
            warn!("User already exists");
            return Err(DomainError::already_exists(input.user_id));
        }

        let now = Utc::now();
        let created_at = match input.created_at.as_deref().filter(|s| !s.is_empty()) {
            Some(value) => parse_timestamp("createdAt", value)?,
            None => now,
        };
        let last_login_at = match input.last_login_at.as_deref().filter(|s| !s.is_empty()) {
            Some(value) => parse_timestamp("lastLoginAt", value)?,
            None => now,
        };

        let user = User::new(
            input.user_id,
            input.email,
            input.name,
            input.picture.unwrap_or_default(),
            created_at,
            last_login_at,
            Vec::new(),
        )?;

        let created = self.repository.create_user(user).await?;
        info!("Created user");

        Ok(created)
    }

    fn validate_input(input: &CreateUserInput) -> Result<(), DomainError> {
        require(&input.user_id, "userId")?;
        require(&input.email, "email")?;
        require(&input.name, "name")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::sample_user;
    use crate::domain::user::{format_timestamp, MockUserRepository};
    use crate::infrastructure::user::InMemoryUserRepository;

    fn input(user_id: &str, email: &str, name: &str) -> CreateUserInput {
        CreateUserInput {
            user_id: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn create_test_use_case() -> (Arc<InMemoryUserRepository>, CreateUserUseCase<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        (repo.clone(), CreateUserUseCase::new(repo))
    }

    #[tokio::test]
    async fn test_create_user() {
        let (repo, use_case) = create_test_use_case();

        let user = use_case
            .execute(CreateUserInput {
                picture: Some("https://example.com/pic.jpg".to_string()),
                ..input("user-123", "test@example.com", "Test User")
            })
            .await
            .expect("create should succeed");

        assert_eq!(user.user_id(), "user-123");
        assert_eq!(user.email(), "test@example.com");
        assert_eq!(user.picture(), "https://example.com/pic.jpg");
        assert!(user.completed_lessons().is_empty());
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_create_user_with_default_timestamps() {
        let (_, use_case) = create_test_use_case();
        let before = Utc::now() - chrono::Duration::seconds(1);

        let user = use_case
            .execute(input("user-123", "test@example.com", "Test User"))
            .await
            .unwrap();

        assert!(user.created_at() >= before);
        assert!(user.last_login_at() >= before);
        assert_eq!(user.picture(), "");
    }

    #[tokio::test]
    async fn test_create_user_with_provided_timestamps() {
        let (_, use_case) = create_test_use_case();

        let user = use_case
            .execute(CreateUserInput {
                created_at: Some("2026-01-01T00:00:00.000Z".to_string()),
                last_login_at: Some("2026-01-02T00:00:00.000Z".to_string()),
                ..input("user-123", "test@example.com", "Test User")
            })
            .await
            .unwrap();

        assert_eq!(format_timestamp(user.created_at()), "2026-01-01T00:00:00.000Z");
        assert_eq!(format_timestamp(user.last_login_at()), "2026-01-02T00:00:00.000Z");
    }

    #[tokio::test]
    async fn test_missing_fields_reported_in_order() {
        let (_, use_case) = create_test_use_case();

        let err = use_case.execute(input("", "", "")).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.to_string(), "userId is required");

        let err = use_case.execute(input("user-123", "  ", "")).await.unwrap_err();
        assert_eq!(err.to_string(), "email is required");

        let err = use_case
            .execute(input("user-123", "test@example.com", ""))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[tokio::test]
    async fn test_duplicate_user() {
        let (_, use_case) = create_test_use_case();
        use_case
            .execute(input("user-123", "test@example.com", "Test User"))
            .await
            .unwrap();

        let err = use_case
            .execute(input("user-123", "other@example.com", "Other"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UserAlreadyExists { ref user_id } if user_id == "user-123"));
    }

    #[tokio::test]
    async fn test_invalid_email_format() {
        let (repo, use_case) = create_test_use_case();

        let err = use_case
            .execute(input("user-123", "invalid-email", "Test User"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_timestamp() {
        let (_, use_case) = create_test_use_case();

        let err = use_case
            .execute(CreateUserInput {
                created_at: Some("not a date".to_string()),
                ..input("user-123", "test@example.com", "Test User")
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_validation_happens_before_repository_access() {
        // no expectations: any repository call panics
        let repo = MockUserRepository::new();
        let use_case = CreateUserUseCase::new(Arc::new(repo));

        let err = use_case.execute(input("", "a@b.co", "N")).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_race_lost_at_write_is_reported() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id().times(1).returning(|_| Ok(None));
        repo.expect_create_user()
            .times(1)
            .returning(|user| Err(DomainError::already_exists(user.user_id())));
        let use_case = CreateUserUseCase::new(Arc::new(repo));

        let err = use_case
            .execute(input("user-123", "test@example.com", "Test User"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "USER_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_existing_user_skips_write() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id()
            .withf(|id| id == "user-123")
            .returning(|id| Ok(Some(sample_user(id))));
        repo.expect_create_user().never();
        let use_case = CreateUserUseCase::new(Arc::new(repo));

        let err = use_case
            .execute(input("user-123", "test@example.com", "Test User"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "USER_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id()
            .returning(|_| Err(DomainError::repository("Failed to get user user-123")));
        let use_case = CreateUserUseCase::new(Arc::new(repo));

        let err = use_case
            .execute(input("user-123", "test@example.com", "Test User"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "REPOSITORY_ERROR");
    }
}
