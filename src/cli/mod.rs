// CLI module
// Command-line interface, argument parsing and the import-then-list run

mod args;

pub use args::{CliArgs, OutputFormat, StrategyType};

use crate::core::{CacheLayer, RecordStore, TransactionService};
use crate::io::{write_page_json, write_transactions_csv};
use crate::strategy::{self, ImportSummary};
use crate::types::ImportError;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;

/// Parse command-line arguments using clap
///
/// On invalid arguments or `--help`, clap prints the message and exits.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Import the input file into a fresh service, then write the requested page
///
/// # Errors
///
/// Fails on unreadable input, an invalid page request, or an output error.
/// Rejected rows are not errors; they are counted in the returned summary.
pub fn run(args: &CliArgs, output: &mut dyn Write) -> Result<ImportSummary, ImportError> {
    let cache_config = args.to_cache_config();
    let service = TransactionService::new(
        Arc::new(RecordStore::new()),
        Arc::new(CacheLayer::new(&cache_config)),
    );

    let config = match args.strategy {
        StrategyType::Async => Some(args.to_batch_config()),
        StrategyType::Sync => None,
    };
    let summary = strategy::create_strategy(args.strategy, config)
        .import(&args.input_file, &service)?;

    let listing = service.list(args.page, args.size)?;
    match args.format {
        OutputFormat::Csv => write_transactions_csv(&listing.content, output)?,
        OutputFormat::Json => write_page_json(&listing, output)?,
    }

    Ok(summary)
}
