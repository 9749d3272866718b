//! Transaction Service CLI
//!
//! Imports transaction requests from a CSV file and prints one listing page.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- requests.csv > transactions.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 requests.csv
//! cargo run -- --page 1 --size 20 --format json requests.csv
//! RUST_LOG=debug cargo run -- --no-cache requests.csv
//! ```
//!
//! Logs go to stderr (filtered by `RUST_LOG`, default `warn`); the listing
//! goes to stdout.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, file not readable, invalid page, etc.)

use std::process;
use tracing_subscriber::EnvFilter;
use transaction_service::cli;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let mut output = std::io::stdout();
    match cli::run(&args, &mut output) {
        Ok(summary) => tracing::info!(
            created = summary.created,
            rejected = summary.rejected,
            "Import complete"
        ),
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
