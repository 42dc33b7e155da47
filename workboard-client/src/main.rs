//! # Workboard
//!
//! Terminal client for the Workboard kanban backend.
//!
//! ## Usage
//!
//! ```bash
//! workboard login ada
//! workboard create-board "Sprint 1" --task "Design API"
//! workboard board 1
//! workboard move 12 "In Progress"
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "workboard_client=info,workboard=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Workboard v{} starting", env!("CARGO_PKG_VERSION"));

    cli::run(cli).await
}
