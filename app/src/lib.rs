//! sqlmapcli command-line application.
//!
//! Thin shell over the client crates: parses arguments, resolves the
//! configuration and dispatches to the command handlers.

pub mod cli;
pub mod commands;

use anyhow::{Context, Result};
use cli::{Cli, GlobalArgs};
use sqlmapcli_core::ClientConfig;
use tracing::info;

/// Initialize tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--log-level`; logs go to stderr so stdout only
/// carries command output.
fn init_tracing(level: Option<&str>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(level.unwrap_or("info,sqlmapcli=debug"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Load the configuration file, then environment overrides, then flags.
pub fn resolve_config<F>(global: &GlobalArgs, lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &global.config {
        Some(path) => ClientConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ClientConfig::load().context("Failed to load config")?,
    };
    config.apply_env(lookup);
    global.apply_to(&mut config);
    Ok(config)
}

/// Run the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.global.log_level.as_deref());
    info!("sqlmapcli v{}", env!("CARGO_PKG_VERSION"));

    let config = resolve_config(&cli.global, |key| std::env::var(key).ok())?;
    commands::execute(cli.command, &config).await
}
