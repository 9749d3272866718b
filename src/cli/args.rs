use crate::core::CacheConfig;
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Import transaction requests from CSV and print one listing page
#[derive(Parser, Debug)]
#[command(name = "transaction-service")]
#[command(about = "Import transaction requests from CSV and list the stored transactions", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing transaction requests
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Import strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Import strategy: 'sync' for in-order or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of rows per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of rows per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of concurrent chunks (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of chunks created concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Zero-based page of the listing to print
    #[arg(long = "page", value_name = "PAGE", default_value_t = 0, allow_negative_numbers = true)]
    pub page: i64,

    /// Page size of the listing to print
    #[arg(long = "size", value_name = "SIZE", default_value_t = 10, allow_negative_numbers = true)]
    pub size: i64,

    /// Output format of the listing
    #[arg(long = "format", value_name = "FORMAT", default_value = "csv")]
    pub format: OutputFormat,

    /// Maximum number of entries per cache
    #[arg(long = "cache-capacity", value_name = "ENTRIES")]
    pub cache_capacity: Option<u64>,

    /// Time-to-live of cache entries, in seconds
    #[arg(long = "cache-ttl-secs", value_name = "SECONDS")]
    pub cache_ttl_secs: Option<u64>,

    /// Run without the read-through cache
    #[arg(long = "no-cache")]
    pub no_cache: bool,
}

/// Available import strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Listing output formats
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments, falling back to defaults
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create a CacheConfig from CLI arguments
    ///
    /// `--no-cache` wins over capacity and TTL settings.
    pub fn to_cache_config(&self) -> CacheConfig {
        if self.no_cache {
            return CacheConfig::disabled();
        }

        let default = CacheConfig::default();
        CacheConfig::new(
            self.cache_capacity.unwrap_or(default.capacity),
            self.cache_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(default.ttl),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::default_strategy(&["program", "input.csv"], StrategyType::Sync)]
    #[case::explicit_sync(&["program", "--strategy", "sync", "input.csv"], StrategyType::Sync)]
    #[case::explicit_async(&["program", "--strategy", "async", "input.csv"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.strategy, expected);
    }

    #[rstest]
    #[case::defaults(&["program", "input.csv"], 0, 10, OutputFormat::Csv)]
    #[case::custom(&["program", "--page", "2", "--size", "25", "--format", "json", "input.csv"], 2, 25, OutputFormat::Json)]
    #[case::negative_page(&["program", "--page", "-1", "input.csv"], -1, 10, OutputFormat::Csv)]
    fn test_listing_options(
        #[case] args: &[&str],
        #[case] page: i64,
        #[case] size: i64,
        #[case] format: OutputFormat,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.page, page);
        assert_eq!(parsed.size, size);
        assert_eq!(parsed.format, format);
    }

    #[rstest]
    #[case::all_defaults(&["program", "input.csv"], 1000, num_cpus::get())]
    #[case::custom_batch_size(&["program", "--batch-size", "2000", "input.csv"], 2000, num_cpus::get())]
    #[case::custom_max_concurrent(&["program", "--max-concurrent", "8", "input.csv"], 1000, 8)]
    #[case::zero_batch_size(&["program", "--batch-size", "0", "input.csv"], 1000, num_cpus::get())]
    #[case::zero_max_concurrent(&["program", "--max-concurrent", "0", "input.csv"], 1000, num_cpus::get())]
    fn test_batch_config_conversion(
        #[case] args: &[&str],
        #[case] expected_batch_size: usize,
        #[case] expected_max_concurrent: usize,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_batch_config();

        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.max_concurrent_batches, expected_max_concurrent);
    }

    #[rstest]
    #[case::defaults(&["program", "input.csv"], 1000, 3600, true)]
    #[case::custom(&["program", "--cache-capacity", "50", "--cache-ttl-secs", "60", "input.csv"], 50, 60, true)]
    #[case::zero_falls_back(&["program", "--cache-capacity", "0", "--cache-ttl-secs", "0", "input.csv"], 1000, 3600, true)]
    fn test_cache_config_conversion(
        #[case] args: &[&str],
        #[case] capacity: u64,
        #[case] ttl_secs: u64,
        #[case] enabled: bool,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_cache_config();

        assert_eq!(config.capacity, capacity);
        assert_eq!(config.ttl, Duration::from_secs(ttl_secs));
        assert_eq!(config.enabled, enabled);
    }

    #[test]
    fn test_no_cache_disables_cache() {
        let parsed =
            CliArgs::try_parse_from(["program", "--no-cache", "--cache-capacity", "5", "input.csv"])
                .unwrap();
        assert!(!parsed.to_cache_config().enabled);
    }

    #[rstest]
    #[case::missing_input(&["program"])]
    #[case::invalid_strategy(&["program", "--strategy", "invalid", "input.csv"])]
    #[case::invalid_format(&["program", "--format", "xml", "input.csv"])]
    #[case::non_numeric_page(&["program", "--page", "first", "input.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
