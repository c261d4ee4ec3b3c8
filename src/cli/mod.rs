//! CLI commands implementation.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::hypothesis::{HttpTransport, HypothesisGroup};

#[derive(Parser)]
#[command(name = "sense")]
#[command(about = "Hypothesis group annotation retrieval and card mapping")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a group's annotations and print them as cards
    Fetch {
        /// Board page URL containing the group id
        url: String,

        /// Hypothesis API base URL.
        /// Can also be set via the SENSE_API_URL environment variable.
        #[arg(long, env = "SENSE_API_URL")]
        api_url: String,

        /// API key sent as a bearer token.
        /// Can also be set via the SENSE_API_KEY environment variable.
        #[arg(long, env = "SENSE_API_KEY")]
        api_key: String,

        /// Display label for the board
        #[arg(long, default_value = "")]
        title: String,

        /// Rows requested per search page
        #[arg(long, default_value = "200")]
        page_size: usize,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            url,
            api_url,
            api_key,
            title,
            page_size,
            pretty,
        } => cmd_fetch(url, api_url, api_key, title, page_size, pretty).await,
    }
}

/// Fetch all cards for a board and print them as a JSON array.
async fn cmd_fetch(
    url: String,
    api_url: String,
    api_key: String,
    title: String,
    page_size: usize,
    pretty: bool,
) -> anyhow::Result<()> {
    let group = HypothesisGroup::new(api_url, api_key, title, url, Arc::new(HttpTransport::new()))
        .with_page_size(page_size);

    info!("Fetching board '{}'", group.title());
    let cards = group.annotations().await?;

    let output = if pretty {
        serde_json::to_string_pretty(&cards)?
    } else {
        serde_json::to_string(&cards)?
    };
    println!("{}", output);

    Ok(())
}
