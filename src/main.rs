//! Margie - travel assistant CLI
//!
#![doc = "Margie - travel assistant CLI"]
#![doc = "Main entry point for the Margie chat loop and chat UI server."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use margie::cli::{Cli, Commands};
use margie::commands;
use margie::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Variables already set in the environment win over .env
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }

    // Load configuration
    let config = Config::load(cli.config.as_deref(), &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Serve { .. } => {
            tracing::info!("Starting chat UI server on {}", config.server.bind);
            commands::serve::run_serve(config).await?;
            Ok(())
        }
    }
}

/// Logs go to stderr so the chat transcript on stdout stays clean
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "margie=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
