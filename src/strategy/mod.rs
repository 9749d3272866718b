//! Import strategy module
//!
//! This module defines the Strategy pattern for importing a CSV of transaction
//! requests through the service. Strategies differ only in how rows are
//! scheduled (in order on one thread, or in concurrent batches); every row
//! goes through `TransactionService::create` either way.

use crate::cli::StrategyType;
use crate::core::{RecordStore, TransactionService};
use crate::types::{ImportError, TransactionRequest};
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncImportStrategy, BatchConfig};
pub use sync::SyncImportStrategy;

/// The service configuration the import pipelines run against
pub type InMemoryService = TransactionService<RecordStore>;

/// Counts of rows that did and did not become transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub rejected: usize,
}

impl ImportSummary {
    pub fn record(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.rejected += 1;
        }
    }

    pub fn merge(&mut self, other: ImportSummary) {
        self.created += other.created;
        self.rejected += other.rejected;
    }
}

/// Import strategy trait for CSV import pipelines
pub trait ImportStrategy: Send + Sync {
    /// Create one transaction per row of `input_path`
    ///
    /// Row-level failures (malformed cells, validation, duplicate references)
    /// are logged and counted in the summary; they never abort the import.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read, or if the
    /// runtime backing the strategy cannot be started.
    fn import(
        &self,
        input_path: &Path,
        service: &InMemoryService,
    ) -> Result<ImportSummary, ImportError>;
}

/// Create an import strategy based on the specified strategy type
///
/// `config` is only used by the async strategy; `None` means defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ImportStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncImportStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncImportStrategy::new(config))
        }
    }
}

/// Push one parsed row through the service, returning whether it was created
pub(crate) fn import_row(
    service: &InMemoryService,
    row: Result<TransactionRequest, String>,
) -> bool {
    let request = match row {
        Ok(request) => request,
        Err(message) => {
            tracing::warn!(%message, "Skipping malformed row");
            return false;
        }
    };

    match service.create(request) {
        Ok(_) => true,
        Err(error) => {
            tracing::warn!(%error, "Row rejected");
            false
        }
    }
}
