//! Rind - A Docker-compatible front end for the container CLI
//!
//! This is the main CLI entry point for Rind.

use clap::Parser;
use rind::commands::{execute, Cli};
use rind::config::LOG_ENV;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; RIND_LOG takes precedence over --debug
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.is_empty() => EnvFilter::new(directive),
        _ if cli.debug => EnvFilter::new("debug"),
        _ => EnvFilter::new("info"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();

    match execute(cli).await {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
