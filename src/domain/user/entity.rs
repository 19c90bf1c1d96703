//! User entity and related types

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::validation::{validate_email, validate_name, validate_user_id, UserValidationError};

/// A lesson the user has finished, in the order it was completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedLesson {
    /// Lesson identifier
    pub id: String,
    /// Completion time, ISO-8601 encoded
    pub at: String,
}

impl CompletedLesson {
    pub fn new(id: impl Into<String>, at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            at: at.into(),
        }
    }
}

/// Immutable snapshot of a user profile.
///
/// Every value that exists has passed validation. Methods that "change" a
/// user return a new snapshot and leave the receiver untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord", into = "UserRecord")]
pub struct User {
    user_id: String,
    email: String,
    name: String,
    picture: String,
    created_at: DateTime<Utc>,
    last_login_at: DateTime<Utc>,
    completed_lessons: Vec<CompletedLesson>,
}

impl User {
    /// Create a new user after validating every field.
    ///
    /// Timestamps are truncated to millisecond precision, the resolution
    /// they are stored with.
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        picture: impl Into<String>,
        created_at: DateTime<Utc>,
        last_login_at: DateTime<Utc>,
        completed_lessons: Vec<CompletedLesson>,
    ) -> Result<Self, UserValidationError> {
        let user_id = user_id.into();
        let email = email.into();
        let name = name.into();

        validate_user_id(&user_id)?;
        validate_email(&email)?;
        validate_name(&name)?;

        Ok(Self {
            user_id,
            email,
            name,
            picture: picture.into(),
            created_at: created_at.trunc_subsecs(3),
            last_login_at: last_login_at.trunc_subsecs(3),
            completed_lessons,
        })
    }

    /// Rebuild a user from its plain-data record
    pub fn from_record(record: UserRecord) -> Result<Self, UserValidationError> {
        let created_at = parse_timestamp("createdAt", &record.created_at)?;
        let last_login_at = parse_timestamp("lastLoginAt", &record.last_login_at)?;

        Self::new(
            record.user_id,
            record.email,
            record.name,
            record.picture,
            created_at,
            last_login_at,
            record.completed_lessons,
        )
    }

    /// Plain-data record with ISO-8601 timestamps
    pub fn to_record(&self) -> UserRecord {
        UserRecord {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            picture: self.picture.clone(),
            created_at: format_timestamp(self.created_at),
            last_login_at: format_timestamp(self.last_login_at),
            completed_lessons: self.completed_lessons.clone(),
        }
    }

    // Getters

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn picture(&self) -> &str {
        &self.picture
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_login_at(&self) -> DateTime<Utc> {
        self.last_login_at
    }

    pub fn completed_lessons(&self) -> &[CompletedLesson] {
        &self.completed_lessons
    }

    // Snapshot updates

    /// New snapshot with `last_login_at` set to now
    pub fn update_last_login(&self) -> Self {
        self.with_last_login_at(Utc::now())
    }

    /// New snapshot with `last_login_at` replaced
    pub fn with_last_login_at(&self, last_login_at: DateTime<Utc>) -> Self {
        Self {
            last_login_at: last_login_at.trunc_subsecs(3),
            ..self.clone()
        }
    }

    /// Record a completed lesson.
    ///
    /// Returns `Cow::Borrowed(self)` when the lesson is already recorded, so
    /// callers can tell a no-op apart from a real change without comparing
    /// the whole value.
    pub fn add_completed_lesson(&self, lesson_id: &str) -> Cow<'_, Self> {
        if self.has_completed_lesson(lesson_id) {
            return Cow::Borrowed(self);
        }

        let mut completed_lessons = self.completed_lessons.clone();
        completed_lessons.push(CompletedLesson::new(lesson_id, format_timestamp(Utc::now())));

        Cow::Owned(Self {
            completed_lessons,
            ..self.clone()
        })
    }

    /// Check whether a lesson has been completed
    pub fn has_completed_lesson(&self, lesson_id: &str) -> bool {
        self.completed_lessons.iter().any(|lesson| lesson.id == lesson_id)
    }

    /// New snapshot with the lesson list replaced wholesale.
    ///
    /// Unlike [`add_completed_lesson`](Self::add_completed_lesson) this does
    /// not deduplicate.
    pub fn update_completed_lessons(&self, lessons: Vec<CompletedLesson>) -> Self {
        Self {
            completed_lessons: lessons,
            ..self.clone()
        }
    }
}

impl TryFrom<UserRecord> for User {
    type Error = UserValidationError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        user.to_record()
    }
}

/// Serialized shape of a [`User`], shared by persistence and transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(default, deserialize_with = "default_on_null")]
    pub picture: String,
    pub created_at: String,
    pub last_login_at: String,
    #[serde(default, deserialize_with = "default_on_null")]
    pub completed_lessons: Vec<CompletedLesson>,
}

fn default_on_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as UTC midnight
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, UserValidationError> {
    let invalid = || UserValidationError::InvalidTimestamp {
        field,
        value: value.to_string(),
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(invalid)
}
