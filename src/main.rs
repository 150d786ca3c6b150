use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

mod cli;
mod core;
mod config;
mod error;

use cli::Cli;
use config::Config;
use core::Engine;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG still wins over --verbose
    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting umlgen v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    // Create the core engine with configuration
    let engine = Engine::new(config).await?;

    // Execute the requested command
    cli.execute(engine).await
}
