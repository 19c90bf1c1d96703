//! DynamoDB user repository implementation

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::user::{format_timestamp, CompletedLesson, User, UserRecord, UserRepository};
use crate::domain::DomainError;

/// A DynamoDB item
pub type Item = HashMap<String, AttributeValue>;

const KEY_ATTRIBUTE: &str = "userId";
const IF_ABSENT: &str = "attribute_not_exists(userId)";
const IF_PRESENT: &str = "attribute_exists(userId)";

/// Failure of a single table operation
#[derive(Debug, Error)]
pub enum TableError {
    /// The write's condition expression did not hold
    #[error("conditional check failed")]
    ConditionFailed,

    #[error(transparent)]
    Transport(Box<dyn StdError + Send + Sync + 'static>),
}

/// Table operations the user repository needs (for mocking)
#[async_trait]
pub trait UserTableClient: Send + Sync + Debug {
    async fn get_item(&self, user_id: &str) -> Result<Option<Item>, TableError>;

    /// Put the item only if no item with the same key exists
    async fn put_item_if_absent(&self, item: Item) -> Result<(), TableError>;

    /// Set the given attributes only if the item exists, returning the item
    /// as committed
    async fn update_item_if_present(
        &self,
        user_id: &str,
        attributes: Vec<(&'static str, AttributeValue)>,
    ) -> Result<Option<Item>, TableError>;

    /// Delete the item only if it exists
    async fn delete_item_if_present(&self, user_id: &str) -> Result<(), TableError>;
}

/// Real DynamoDB client wrapper bound to one table
#[derive(Debug, Clone)]
pub struct AwsUserTableClient {
    client: DynamoDbClient,
    table_name: String,
}

impl AwsUserTableClient {
    pub fn new(client: DynamoDbClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    fn key(user_id: &str) -> AttributeValue {
        AttributeValue::S(user_id.to_string())
    }
}

fn transport<E>(err: E) -> TableError
where
    E: StdError + Send + Sync + 'static,
{
    TableError::Transport(Box::new(err))
}

#[async_trait]
impl UserTableClient for AwsUserTableClient {
    async fn get_item(&self, user_id: &str) -> Result<Option<Item>, TableError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, Self::key(user_id))
            .send()
            .await
            .map_err(transport)?;

        Ok(output.item().cloned())
    }

    async fn put_item_if_absent(&self, item: Item) -> Result<(), TableError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression(IF_ABSENT)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception())
                {
                    TableError::ConditionFailed
                } else {
                    transport(e)
                }
            })?;

        Ok(())
    }

    async fn update_item_if_present(
        &self,
        user_id: &str,
        attributes: Vec<(&'static str, AttributeValue)>,
    ) -> Result<Option<Item>, TableError> {
        let mut assignments = Vec::with_capacity(attributes.len());
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        for (index, (name, value)) in attributes.into_iter().enumerate() {
            assignments.push(format!("#a{index} = :v{index}"));
            names.insert(format!("#a{index}"), name.to_string());
            values.insert(format!(":v{index}"), value);
        }

        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, Self::key(user_id))
            .update_expression(format!("SET {}", assignments.join(", ")))
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .condition_expression(IF_PRESENT)
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception())
                {
                    TableError::ConditionFailed
                } else {
                    transport(e)
                }
            })?;

        Ok(output.attributes().cloned())
    }

    async fn delete_item_if_present(&self, user_id: &str) -> Result<(), TableError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, Self::key(user_id))
            .condition_expression(IF_PRESENT)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception())
                {
                    TableError::ConditionFailed
                } else {
                    transport(e)
                }
            })?;

        Ok(())
    }
}

/// DynamoDB implementation of UserRepository.
///
/// Existence checks are condition expressions evaluated by DynamoDB at
/// write time, so concurrent writers cannot both pass them.
#[derive(Debug)]
pub struct DynamoDbUserRepository<C: UserTableClient> {
    client: C,
}

impl<C: UserTableClient> DynamoDbUserRepository<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

/// Map a table failure, turning a failed condition into `on_condition`
fn map_table_error(
    err: TableError,
    context: String,
    on_condition: impl FnOnce() -> DomainError,
) -> DomainError {
    match err {
        TableError::ConditionFailed => on_condition(),
        TableError::Transport(source) => {
            error!(error = %source, "{}", context);
            DomainError::Repository {
                message: context,
                source: Some(source),
            }
        }
    }
}

#[async_trait]
impl<C: UserTableClient> UserRepository for DynamoDbUserRepository<C> {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, DomainError> {
        let item = self.client.get_item(user_id).await.map_err(|e| {
            map_table_error(e, format!("Failed to get user {}", user_id), || {
                DomainError::repository(format!("Unexpected condition failure reading user {}", user_id))
            })
        })?;

        debug!(user_id, found = item.is_some(), "Fetched user item");
        item.as_ref().map(item_to_user).transpose()
    }

    async fn create_user(&self, user: User) -> Result<User, DomainError> {
        self.client
            .put_item_if_absent(user_to_item(&user))
            .await
            .map_err(|e| {
                map_table_error(e, format!("Failed to create user {}", user.user_id()), || {
                    DomainError::already_exists(user.user_id())
                })
            })?;

        info!(user_id = %user.user_id(), "Put user item");
        Ok(user)
    }

    async fn update_user(&self, user: User) -> Result<User, DomainError> {
        let attributes = vec![
            ("lastLoginAt", AttributeValue::S(format_timestamp(user.last_login_at()))),
            ("completedLessons", lessons_to_attribute(user.completed_lessons())),
        ];

        let committed = self
            .client
            .update_item_if_present(user.user_id(), attributes)
            .await
            .map_err(|e| {
                map_table_error(e, format!("Failed to update user {}", user.user_id()), || {
                    DomainError::not_found(user.user_id())
                })
            })?;

        match committed {
            Some(item) => item_to_user(&item),
            None => Err(DomainError::repository(format!(
                "Update returned no attributes for user {}",
                user.user_id()
            ))),
        }
    }

    async fn update_last_login(&self, user_id: &str) -> Result<(), DomainError> {
        let attributes = vec![("lastLoginAt", AttributeValue::S(format_timestamp(Utc::now())))];

        self.client
            .update_item_if_present(user_id, attributes)
            .await
            .map_err(|e| {
                map_table_error(
                    e,
                    format!("Failed to update last login for user {}", user_id),
                    || DomainError::not_found(user_id),
                )
            })?;

        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), DomainError> {
        self.client
            .delete_item_if_present(user_id)
            .await
            .map_err(|e| {
                map_table_error(e, format!("Failed to delete user {}", user_id), || {
                    DomainError::not_found(user_id)
                })
            })?;

        info!(user_id, "Deleted user item");
        Ok(())
    }
}

fn user_to_item(user: &User) -> Item {
    let record = user.to_record();

    HashMap::from([
        (KEY_ATTRIBUTE.to_string(), AttributeValue::S(record.user_id)),
        ("email".to_string(), AttributeValue::S(record.email)),
        ("name".to_string(), AttributeValue::S(record.name)),
        ("picture".to_string(), AttributeValue::S(record.picture)),
        ("createdAt".to_string(), AttributeValue::S(record.created_at)),
        ("lastLoginAt".to_string(), AttributeValue::S(record.last_login_at)),
        (
            "completedLessons".to_string(),
            lessons_to_attribute(&record.completed_lessons),
        ),
    ])
}

fn lessons_to_attribute(lessons: &[CompletedLesson]) -> AttributeValue {
    AttributeValue::L(
        lessons
            .iter()
            .map(|lesson| {
                AttributeValue::M(HashMap::from([
                    ("id".to_string(), AttributeValue::S(lesson.id.clone())),
                    ("at".to_string(), AttributeValue::S(lesson.at.clone())),
                ]))
            })
            .collect(),
    )
}

fn invalid_item(user_id: &str, detail: impl Into<String>) -> DomainError {
    DomainError::repository(format!(
        "Stored item for user {} is malformed: {}",
        user_id,
        detail.into()
    ))
}

fn string_attr(item: &Item, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn item_to_user(item: &Item) -> Result<User, DomainError> {
    let user_id = string_attr(item, KEY_ATTRIBUTE).unwrap_or_default();
    let required = |name: &str| {
        string_attr(item, name).ok_or_else(|| invalid_item(&user_id, format!("missing {}", name)))
    };

    let completed_lessons: Vec<CompletedLesson> = match item.get("completedLessons") {
        None | Some(AttributeValue::Null(_)) => Vec::new(),
        Some(AttributeValue::L(entries)) => entries
            .iter()
            .map(|entry| {
                let lesson = entry
                    .as_m()
                    .map_err(|_| invalid_item(&user_id, "lesson entry is not a map"))?;
                match (string_attr(lesson, "id"), string_attr(lesson, "at")) {
                    (Some(id), Some(at)) => Ok(CompletedLesson { id, at }),
                    _ => Err(invalid_item(&user_id, "lesson entry lacks id or at")),
                }
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(invalid_item(&user_id, "completedLessons is not a list")),
    };

    let record = UserRecord {
        user_id: user_id.clone(),
        email: required("email")?,
        name: required("name")?,
        picture: string_attr(item, "picture").unwrap_or_default(),
        created_at: required("createdAt")?,
        last_login_at: required("lastLoginAt")?,
        completed_lessons,
    };

    User::from_record(record).map_err(|e| {
        DomainError::repository_with_source(format!("Stored item for user {} is invalid", user_id), e)
    })
}
