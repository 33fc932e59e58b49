//! Tutorly CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tutorly::cli::{commands, Cli, Commands};
use tutorly::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tutorly={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Execute command
    match &cli.command {
        Commands::Ask {
            message,
            chat,
            diagram,
            youtube,
        } => {
            commands::run_ask(message, chat, *diagram, *youtube, settings).await?;
        }

        Commands::Chat { chat } => {
            commands::run_chat(chat, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Index { file, chat } => {
            commands::run_index(file, chat, settings).await?;
        }

        Commands::Flashcards { chat } => {
            commands::run_flashcards(chat, settings).await?;
        }

        Commands::Tools => {
            commands::run_tools(settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
