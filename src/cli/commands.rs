//! Subcommand dispatch onto the user use-cases

use std::error::Error as _;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use config::ConfigError;
use serde_json::{json, Value};
use tracing::{debug, error};

use super::{Cli, Command, CreateArgs, UpdateArgs};
use crate::application::{
    CreateUserInput, CreateUserUseCase, DeleteUserUseCase, GetUserUseCase, UpdateUserInput,
    UpdateUserUseCase,
};
use crate::config::AppConfig;
use crate::domain::{CompletedLesson, DomainError, UserRepository};
use crate::infrastructure::logging;
use crate::infrastructure::user::build_user_repository;

/// Run one subcommand, printing its JSON result on stdout.
///
/// Domain failures are reported as `<CODE>: <message>` on stderr with a
/// failing exit code. Only setup problems surface as `Err`.
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let config = resolve_config(AppConfig::load(), &cli)
        .context("Failed to load configuration")?;

    logging::init_logging(&config.logging)?;

    let repository = build_user_repository(&config.storage).await;

    match dispatch(cli.command, repository).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Apply the global CLI overrides on top of the loaded configuration.
///
/// A broken configuration is an error: falling back to defaults would
/// silently switch to the in-memory store.
fn resolve_config(
    loaded: Result<AppConfig, ConfigError>,
    cli: &Cli,
) -> Result<AppConfig, ConfigError> {
    let mut config = loaded?;
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(table) = &cli.table {
        config.storage.table_name = table.clone();
    }

    Ok(config)
}

async fn dispatch(
    command: Command,
    repository: Arc<dyn UserRepository>,
) -> Result<Value, DomainError> {
    match command {
        Command::Create(args) => {
            let user = CreateUserUseCase::new(repository)
                .execute(create_input(args))
                .await?;
            to_json(&user)
        }
        Command::Get { user_id } => {
            let user = GetUserUseCase::new(repository).execute(&user_id).await?;
            to_json(&user)
        }
        Command::Find { user_id } => {
            let user = GetUserUseCase::new(repository).find_by_id(&user_id).await?;
            to_json(&user)
        }
        Command::Update(args) => {
            let user = UpdateUserUseCase::new(repository)
                .execute(update_input(args)?)
                .await?;
            to_json(&user)
        }
        Command::Login { user_id } => {
            UpdateUserUseCase::new(repository.clone())
                .update_last_login(&user_id)
                .await?;
            let user = GetUserUseCase::new(repository).execute(&user_id).await?;
            to_json(&user)
        }
        Command::CompleteLesson { user_id, lesson_id } => {
            let user = UpdateUserUseCase::new(repository)
                .add_completed_lesson(&user_id, &lesson_id)
                .await?;
            to_json(&user)
        }
        Command::Delete { user_id } => {
            DeleteUserUseCase::new(repository).execute(&user_id).await?;
            Ok(json!({ "deleted": user_id }))
        }
    }
}

fn create_input(args: CreateArgs) -> CreateUserInput {
    CreateUserInput {
        user_id: args.user_id,
        email: args.email,
        name: args.name,
        picture: args.picture,
        created_at: args.created_at,
        last_login_at: args.last_login_at,
    }
}

fn update_input(args: UpdateArgs) -> Result<UpdateUserInput, DomainError> {
    let completed_lessons = args
        .lessons_json
        .as_deref()
        .map(serde_json::from_str::<Vec<CompletedLesson>>)
        .transpose()
        .map_err(|e| DomainError::validation(format!("Invalid completedLessons: {}", e)))?;

    Ok(UpdateUserInput {
        user_id: args.user_id,
        last_login_at: args.last_login_at,
        completed_lessons,
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::repository_with_source("Failed to encode result", e))
}

fn report(err: &DomainError) {
    match err.source() {
        Some(cause) => error!(code = err.code(), cause = %cause, "{}", err),
        None => debug!(code = err.code(), "{}", err),
    }

    eprintln!("{}: {}", err.code(), err);
}
