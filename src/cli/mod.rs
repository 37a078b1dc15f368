//! CLI module for dupr-rag.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{count, Output};

use clap::{Parser, Subcommand};

/// dupr-rag - Pickleball and DUPR question answering
///
/// Indexes DUPR player summaries and blog posts and answers questions about
/// them through a terminal chat or an HTTP API.
#[derive(Parser, Debug)]
#[command(name = "dupr-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check credentials, input files and the index
    Doctor,

    /// Build or refresh the vector index from the input files
    Index {
        /// Rebuild even if the inputs are unchanged
        #[arg(short, long)]
        force: bool,
    },

    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,

        /// Number of documents to retrieve (1-10)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Start an interactive chat session
    Chat {
        /// Number of documents to retrieve (1-10)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_with_top_k() {
        let cli = Cli::try_parse_from(["dupr-rag", "-v", "chat", "-k", "3"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Commands::Chat { top_k: Some(3) }));
    }

    #[test]
    fn test_parse_index_force_and_global_config() {
        let cli = Cli::try_parse_from(["dupr-rag", "index", "--force", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("/tmp/c.toml"));
        assert!(matches!(cli.command, Commands::Index { force: true }));
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["dupr-rag", "serve"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { host: None, port: None }));
    }
}
