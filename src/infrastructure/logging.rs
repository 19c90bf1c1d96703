//! Logging setup for the CLI

use anyhow::Context;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::{LogFormat, LoggingConfig};

/// SDK transport crates that log every request below warn
const QUIET_TARGETS: [&str; 3] = ["aws_config", "aws_smithy_runtime", "hyper"];

/// Install the global subscriber. Output goes to stderr so stdout carries
/// only command results. `RUST_LOG` takes precedence over the configured
/// level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.level)?,
    };

    tracing_subscriber::registry()
        .with(output_layer(&config.format).with_filter(filter))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(level = %config.level, "Logging initialized");
    Ok(())
}

/// Filter for the configured level with the AWS SDK held at warn
fn level_filter(level: &str) -> anyhow::Result<EnvFilter> {
    let directives = QUIET_TARGETS
        .iter()
        .fold(level.to_string(), |acc, target| format!("{acc},{target}=warn"));

    EnvFilter::try_new(&directives).with_context(|| format!("Invalid log level '{}'", level))
}

fn output_layer(format: &LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer().with_writer(std::io::stderr);

    match format {
        LogFormat::Json => layer.json().with_current_span(true).boxed(),
        LogFormat::Pretty => layer.compact().with_target(false).boxed(),
    }
}
