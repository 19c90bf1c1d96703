//! Infrastructure layer - Storage adapters and logging setup

pub mod logging;
pub mod user;
