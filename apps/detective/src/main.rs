//! # Office Detective CLI
//!
//! Investigate corporate cases against the Office Detective backend.
//!
//! ## Usage
//!
//! ```bash
//! # Account and case
//! detective login alice@example.com -p secret
//! detective cases
//! detective case case-001
//!
//! # Investigate
//! detective docs --type email
//! detective read doc-017
//! detective pin entity ent-mallory
//! detective board hubs
//! detective board expand ent-mallory
//!
//! # Accuse
//! detective submit -c ent-mallory --all-evidence -x "She approved her own invoices."
//! ```

use clap::Parser;
use detective::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse first so --verbose can pick the default filter.
    let cli = cli::Cli::parse();

    // DETECTIVE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("DETECTIVE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "detective=debug,detective_core=debug"
    } else {
        "detective=info,detective_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr; stdout carries command output.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
