//! dupr-rag CLI entry point.

use anyhow::Result;
use clap::Parser;
use dupr_rag::cli::{commands, Cli, Commands};
use dupr_rag::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a .env file next to the data
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("dupr_rag={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }

        Commands::Index { force } => {
            commands::run_index(*force, settings).await?;
        }

        Commands::Ask { question, top_k } => {
            commands::run_ask(question, *top_k, settings).await?;
        }

        Commands::Chat { top_k } => {
            commands::run_chat(*top_k, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path.as_ref(), settings)?;
        }
    }

    Ok(())
}
