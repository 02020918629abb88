//! CLI command definitions for the `echotwin` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod ingest;
pub mod memory;
pub mod persona;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with a persona twin learned from exported transcripts.
#[derive(Parser)]
#[command(name = "echotwin", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat with the persona.
    Chat,

    /// Parse and store transcripts not yet ingested.
    Ingest {
        /// Transcript directory (defaults to the configured one).
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Start the HTTP server.
    Serve {
        /// Port to listen on (defaults to config, then $PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to.
        #[arg(long)]
        host: Option<String>,
    },

    /// List recent conversations.
    #[command(alias = "ls")]
    Conversations {
        /// Maximum number of exchanges to show.
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Conversation statistics.
    Stats,

    /// Semantic search over past exchanges.
    Search {
        /// Free-text query.
        query: String,

        /// Maximum number of results.
        #[arg(short, long, default_value = "3")]
        limit: usize,

        /// Only exchanges from the last N days (0 searches everything).
        #[arg(long)]
        days_back: Option<u32>,
    },

    /// Print the persona system prompt.
    Prompt,

    /// Re-index exchanges missing from the vector index.
    Reconcile {
        /// Drop and rebuild the whole vector index.
        #[arg(long)]
        rebuild: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Spinner shared by the long-running commands.
pub(crate) fn spinner(message: &str) -> indicatif::ProgressBar {
    let spinner = indicatif::ProgressBar::new_spinner();
    let style = indicatif::ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Truncate to `max` characters, marking the cut with "...".
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from(["echotwin", "search", "movie", "--days-back", "14", "--json"]);
        assert!(cli.json);
        match cli.command {
            Commands::Search {
                query,
                limit,
                days_back,
            } => {
                assert_eq!(query, "movie");
                assert_eq!(limit, 3);
                assert_eq!(days_back, Some(14));
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("చాలా బాగుంది నిజంగా", 8), "చాలా ...");
    }
}
