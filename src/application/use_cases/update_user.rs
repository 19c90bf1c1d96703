//! Update user use-case

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::require;
use crate::domain::user::parse_timestamp;
use crate::domain::{CompletedLesson, DomainError, User, UserRepository};

/// Input for updating a user.
///
/// At least one of `last_login_at` and `completed_lessons` must be set.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub user_id: String,
    /// RFC 3339 timestamp replacing the stored one
    pub last_login_at: Option<String>,
    /// Replaces the stored lesson list wholesale
    pub completed_lessons: Option<Vec<CompletedLesson>>,
}

impl UpdateUserInput {
    fn last_login_at(&self) -> Option<&str> {
        self.last_login_at.as_deref().filter(|s| !s.is_empty())
    }
}

/// Updates login and lesson progress of existing users
pub struct UpdateUserUseCase<R: UserRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: UserRepository + ?Sized> UpdateUserUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Apply the supplied fields to the stored user and persist the result
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn execute(&self, input: UpdateUserInput) -> Result<User, DomainError> {
        Self::validate_input(&input)?;

        // Parse before touching the store so bad input never costs a read
        let last_login_at = input
            .last_login_at()
            .map(|value| parse_timestamp("lastLoginAt", value))
            .transpose()?;

        let existing = self.load(&input.user_id).await?;

        let mut updated = existing;
        if let Some(last_login_at) = last_login_at {
            updated = updated.with_last_login_at(last_login_at);
        }
        if let Some(lessons) = input.completed_lessons {
            updated = updated.update_completed_lessons(lessons);
        }

        let persisted = self.repository.update_user(updated).await?;
        info!("Updated user");

        Ok(persisted)
    }

    /// Stamp the user's last login with the current time
    #[instrument(skip(self))]
    pub async fn update_last_login(&self, user_id: &str) -> Result<(), DomainError> {
        require(user_id, "userId")?;

        if !self.repository.user_exists(user_id).await? {
            return Err(DomainError::not_found(user_id));
        }

        self.repository.update_last_login(user_id).await?;
        info!("Recorded login");

        Ok(())
    }

    /// Record a completed lesson; repeating a lesson is a no-op that skips
    /// the write
    #[instrument(skip(self))]
    pub async fn add_completed_lesson(
        &self,
        user_id: &str,
        lesson_id: &str,
    ) -> Result<User, DomainError> {
        require(user_id, "userId")?;
        require(lesson_id, "lessonId")?;

        let existing = self.load(user_id).await?;

        let updated = match existing.add_completed_lesson(lesson_id) {
            Cow::Borrowed(_) => None,
            Cow::Owned(updated) => Some(updated),
        };

        match updated {
            None => {
                debug!("Lesson already completed, nothing to write");
                Ok(existing)
            }
            Some(updated) => {
                let persisted = self.repository.update_user(updated).await?;
                info!("Recorded completed lesson");
                Ok(persisted)
            }
        }
    }

    async fn load(&self, user_id: &str) -> Result<User, DomainError> {
        self.repository
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(user_id))
    }

    fn validate_input(input: &UpdateUserInput) -> Result<(), DomainError> {
        require(&input.user_id, "userId")?;

        if input.last_login_at().is_none() && input.completed_lessons.is_none() {
            return Err(DomainError::validation(
                "At least one field must be provided for update (lastLoginAt or completedLessons)",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::sample_user;
    use crate::domain::user::{format_timestamp, MockUserRepository};
    use crate::infrastructure::user::InMemoryUserRepository;

    fn create_test_use_case() -> (Arc<InMemoryUserRepository>, UpdateUserUseCase<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![sample_user("user-123")]));
        (repo.clone(), UpdateUserUseCase::new(repo))
    }

    fn lessons() -> Vec<CompletedLesson> {
        vec![
            CompletedLesson::new("lesson-1", "2026-01-05T10:00:00.000Z"),
            CompletedLesson::new("lesson-2", "2026-01-06T10:00:00.000Z"),
        ]
    }

    #[tokio::test]
    async fn test_update_last_login_at() {
        let (_, use_case) = create_test_use_case();

        let user = use_case
            .execute(UpdateUserInput {
                user_id: "user-123".to_string(),
                last_login_at: Some("2026-02-01T12:00:00Z".to_string()),
                completed_lessons: None,
            })
            .await
            .unwrap();

        assert_eq!(format_timestamp(user.last_login_at()), "2026-02-01T12:00:00.000Z");
        assert!(user.completed_lessons().is_empty());
    }

    #[tokio::test]
    async fn test_update_completed_lessons() {
        let (repo, use_case) = create_test_use_case();

        let user = use_case
            .execute(UpdateUserInput {
                user_id: "user-123".to_string(),
                completed_lessons: Some(lessons()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(user.completed_lessons(), lessons().as_slice());
        assert_eq!(user.last_login_at(), sample_user("user-123").last_login_at());

        let stored = repo.get_user_by_id("user-123").await.unwrap().unwrap();
        assert_eq!(stored, user);
    }

    #[tokio::test]
    async fn test_update_both_fields() {
        let (_, use_case) = create_test_use_case();

        let user = use_case
            .execute(UpdateUserInput {
                user_id: "user-123".to_string(),
                last_login_at: Some("2026-02-01T12:00:00Z".to_string()),
                completed_lessons: Some(lessons()),
            })
            .await
            .unwrap();

        assert_eq!(format_timestamp(user.last_login_at()), "2026-02-01T12:00:00.000Z");
        assert_eq!(user.completed_lessons().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_lesson_list_counts_as_supplied() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![
            sample_user("user-123").add_completed_lesson("lesson-1").into_owned(),
        ]));
        let use_case = UpdateUserUseCase::new(repo);

        let user = use_case
            .execute(UpdateUserInput {
                user_id: "user-123".to_string(),
                completed_lessons: Some(vec![]),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(user.completed_lessons().is_empty());
    }

    #[tokio::test]
    async fn test_update_validation() {
        let (_, use_case) = create_test_use_case();

        let err = use_case
            .execute(UpdateUserInput {
                user_id: "".to_string(),
                last_login_at: Some("2026-02-01T12:00:00Z".to_string()),
                completed_lessons: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "userId is required");

        let err = use_case
            .execute(UpdateUserInput {
                user_id: "user-123".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = use_case
            .execute(UpdateUserInput {
                user_id: "user-123".to_string(),
                last_login_at: Some(String::new()),
                completed_lessons: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let (_, use_case) = create_test_use_case();

        let err = use_case
            .execute(UpdateUserInput {
                user_id: "non-existent".to_string(),
                last_login_at: Some("2026-02-01T12:00:00Z".to_string()),
                completed_lessons: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), "USER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_returns_committed_snapshot() {
        let committed = sample_user("user-123").with_last_login_at(
            parse_timestamp("t", "2026-03-01T00:00:00Z").unwrap(),
        );
        let returned = committed.clone();

        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id()
            .returning(|id| Ok(Some(sample_user(id))));
        repo.expect_update_user()
            .times(1)
            .returning(move |_| Ok(returned.clone()));
        let use_case = UpdateUserUseCase::new(Arc::new(repo));

        let user = use_case
            .execute(UpdateUserInput {
                user_id: "user-123".to_string(),
                last_login_at: Some("2026-02-01T12:00:00Z".to_string()),
                completed_lessons: None,
            })
            .await
            .unwrap();

        assert_eq!(user, committed);
    }

    #[tokio::test]
    async fn test_record_login() {
        let (repo, use_case) = create_test_use_case();

        use_case.update_last_login("user-123").await.unwrap();

        let stored = repo.get_user_by_id("user-123").await.unwrap().unwrap();
        assert!(stored.last_login_at() > sample_user("user-123").last_login_at());
    }

    #[tokio::test]
    async fn test_record_login_errors() {
        let (_, use_case) = create_test_use_case();

        let err = use_case.update_last_login("").await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = use_case.update_last_login("non-existent").await.unwrap_err();
        assert_eq!(err.code(), "USER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_record_login_uses_dedicated_write() {
        let mut repo = MockUserRepository::new();
        repo.expect_user_exists().returning(|_| Ok(true));
        repo.expect_update_last_login()
            .withf(|id| id == "user-123")
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_update_user().never();
        let use_case = UpdateUserUseCase::new(Arc::new(repo));

        use_case.update_last_login("user-123").await.unwrap();
    }

    #[tokio::test]
    async fn test_add_completed_lesson() {
        let (repo, use_case) = create_test_use_case();

        let user = use_case.add_completed_lesson("user-123", "lesson-1").await.unwrap();

        assert!(user.has_completed_lesson("lesson-1"));
        let stored = repo.get_user_by_id("user-123").await.unwrap().unwrap();
        assert!(stored.has_completed_lesson("lesson-1"));
    }

    #[tokio::test]
    async fn test_add_duplicate_lesson_skips_write() {
        let stored = sample_user("user-123").add_completed_lesson("lesson-1").into_owned();
        let expected = stored.clone();

        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_update_user().never();
        let use_case = UpdateUserUseCase::new(Arc::new(repo));

        let user = use_case.add_completed_lesson("user-123", "lesson-1").await.unwrap();

        assert_eq!(user, expected);
        assert_eq!(user.completed_lessons().len(), 1);
    }

    #[tokio::test]
    async fn test_add_completed_lesson_errors() {
        let (_, use_case) = create_test_use_case();

        let err = use_case.add_completed_lesson("", "lesson-1").await.unwrap_err();
        assert_eq!(err.to_string(), "userId is required");

        let err = use_case.add_completed_lesson("user-123", " ").await.unwrap_err();
        assert_eq!(err.to_string(), "lessonId is required");

        let err = use_case
            .add_completed_lesson("non-existent", "lesson-1")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "USER_NOT_FOUND");
    }
}
