//! User Profile Service
//!
//! Stores learner profiles and their lesson progress:
//! - Validated `User` entity with immutable transitions
//! - Create, get, update and delete use-cases over a `UserRepository` port
//! - In-memory and DynamoDB storage adapters

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
