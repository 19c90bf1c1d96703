//! CLI module for the user profile service
//!
//! Each subcommand drives one use-case against the configured storage and
//! prints the resulting user record as JSON on stdout.

mod commands;

use clap::{Args, Parser, Subcommand};

use crate::config::StorageBackend;

pub use commands::run;

/// User profile service - manage user records and lesson progress
#[derive(Parser)]
#[command(name = "user-profile")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Storage backend, overriding the configured one
    #[arg(long, global = true, value_enum)]
    pub backend: Option<StorageBackend>,

    /// DynamoDB table name, overriding the configured one
    #[arg(long, global = true)]
    pub table: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new user
    Create(CreateArgs),

    /// Fetch a user that must exist
    Get { user_id: String },

    /// Look up a user, printing `null` when absent
    Find { user_id: String },

    /// Replace last login time and/or completed lessons
    Update(UpdateArgs),

    /// Stamp the user's last login with the current time
    Login { user_id: String },

    /// Record a completed lesson
    CompleteLesson { user_id: String, lesson_id: String },

    /// Delete a user
    Delete { user_id: String },
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub user_id: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub picture: Option<String>,
    /// RFC 3339 timestamp, defaults to now
    #[arg(long)]
    pub created_at: Option<String>,
    /// RFC 3339 timestamp, defaults to now
    #[arg(long)]
    pub last_login_at: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub user_id: String,
    /// RFC 3339 timestamp
    #[arg(long)]
    pub last_login_at: Option<String>,
    /// JSON array of `{"id": ..., "at": ...}` replacing the stored lessons
    #[arg(long)]
    pub lessons_json: Option<String>,
}
