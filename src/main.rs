use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod cli;
mod config;
mod discovery;
mod llm;
mod session;
mod version;

use cli::Cli;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        // Don't error if .env file doesn't exist, just log it
        tracing::debug!("No .env file found or error loading it: {}", e);
    }

    let cli = Cli::parse();

    // Initialize logging/tracing
    if let Err(e) = init_logging(cli.debug) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }
    info!("{}", version::full_version());

    if let Err(e) = cli.execute().await {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) -> Result<()> {
    let default_filter = if debug { "discovery=debug" } else { "discovery=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
