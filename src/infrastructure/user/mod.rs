//! User infrastructure module
//!
//! This module provides the storage adapters behind the user repository
//! port: an in-memory store for tests and local runs, and a DynamoDB
//! table using conditional writes.

mod dynamodb_repository;
mod factory;
mod repository;

pub use dynamodb_repository::{
    AwsUserTableClient, DynamoDbUserRepository, Item, TableError, UserTableClient,
};
pub use factory::build_user_repository;
pub use repository::InMemoryUserRepository;
