//! Repository factory for runtime storage selection

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use tracing::info;

use super::dynamodb_repository::{AwsUserTableClient, DynamoDbUserRepository};
use super::repository::InMemoryUserRepository;
use crate::config::{StorageBackend, StorageSettings};
use crate::domain::UserRepository;

/// Creates the user repository selected by the configuration
pub async fn build_user_repository(settings: &StorageSettings) -> Arc<dyn UserRepository> {
    match settings.backend {
        StorageBackend::Memory => {
            info!("Using in-memory user storage");
            Arc::new(InMemoryUserRepository::new())
        }
        StorageBackend::DynamoDb => {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(region) = &settings.region {
                loader = loader.region(Region::new(region.clone()));
            }
            if let Some(endpoint_url) = &settings.endpoint_url {
                loader = loader.endpoint_url(endpoint_url);
            }

            let sdk_config = loader.load().await;
            let client = aws_sdk_dynamodb::Client::new(&sdk_config);

            info!(table = %settings.table_name, "Using DynamoDB user storage");
            Arc::new(DynamoDbUserRepository::new(AwsUserTableClient::new(
                client,
                &settings.table_name,
            )))
        }
    }
}
