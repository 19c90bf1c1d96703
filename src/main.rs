use std::process::ExitCode;

use clap::Parser;
use user_profile_service::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    cli::run(cli).await
}
