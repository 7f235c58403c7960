//! CLI argument parsing and daemon startup.

pub mod args;

use anyhow::{Context, Result};
use args::Cli;
use clap::Parser;
use std::io::IsTerminal;
use tracing::info;

/// Run the daemon.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "starting syncdns");

    // Nothing touches Docker, AdGuard or the state file until this passes.
    let config = cli.into_config()?;
    info!(
        authority = %config.authority_url,
        state_file = %config.state_path.display(),
        label = %config.label,
        "configuration loaded"
    );

    syncdns::daemon::run(config)
        .await
        .context("syncdns stopped")
}

fn init_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}
