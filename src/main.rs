//! SenseCard - Hypothesis group annotation retrieval and card mapping.
//!
//! A tool for pulling annotations out of a sense.tw Hypothesis group and
//! turning them into card records.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensecard::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "sensecard=info"
    } else {
        "sensecard=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
