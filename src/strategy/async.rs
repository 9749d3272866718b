//! Asynchronous batch import strategy
//!
//! Rows are read in batches; each batch is split into chunks that are created
//! concurrently on the blocking pool of a tokio multi-threaded runtime. Batches
//! run one after another, so a batch finishes before the next is read.
//!
//! ```text
//! AsyncImportStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── RequestReader (batch CSV reading)
//!     └── spawn_blocking per chunk ──> TransactionService::create
//! ```
//!
//! Creation order within a batch is not deterministic, so neither is the
//! relative order of rows that share a millisecond timestamp.

use crate::io::RequestReader;
use crate::strategy::{import_row, ImportStrategy, ImportSummary, InMemoryService};
use crate::types::{ImportError, TransactionRequest};
use futures::future::join_all;
use std::path::Path;

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of rows per batch
    pub batch_size: usize,
    /// Number of chunks of a batch created concurrently (and worker threads)
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                batch_size,
                default = default.batch_size,
                "Invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "Invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Concurrent batch import
#[derive(Debug, Clone)]
pub struct AsyncImportStrategy {
    config: BatchConfig,
}

impl AsyncImportStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Create one batch concurrently, waiting for every chunk to finish
    async fn import_batch(
        &self,
        batch: Vec<Result<TransactionRequest, String>>,
        service: &InMemoryService,
    ) -> ImportSummary {
        let chunk_size = batch
            .len()
            .div_ceil(self.config.max_concurrent_batches)
            .max(1);

        let mut rows = batch.into_iter().peekable();
        let mut handles = Vec::new();
        while rows.peek().is_some() {
            let chunk: Vec<_> = rows.by_ref().take(chunk_size).collect();
            let service = service.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                let mut summary = ImportSummary::default();
                for row in chunk {
                    summary.record(import_row(&service, row));
                }
                summary
            }));
        }

        let mut summary = ImportSummary::default();
        for result in join_all(handles).await {
            match result {
                Ok(chunk_summary) => summary.merge(chunk_summary),
                Err(error) => tracing::error!(%error, "Import task failed"),
            }
        }
        summary
    }
}

impl ImportStrategy for AsyncImportStrategy {
    fn import(
        &self,
        input_path: &Path,
        service: &InMemoryService,
    ) -> Result<ImportSummary, ImportError> {
        let mut reader = RequestReader::open(input_path)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| ImportError::Runtime {
                message: e.to_string(),
            })?;

        let summary = runtime.block_on(async {
            let mut summary = ImportSummary::default();
            loop {
                let batch = reader.read_batch(self.config.batch_size);
                if batch.is_empty() {
                    break;
                }

                tracing::debug!(rows = batch.len(), "Importing batch");
                summary.merge(self.import_batch(batch, service).await);
            }
            summary
        });

        tracing::info!(
            created = summary.created,
            rejected = summary.rejected,
            "Async import finished"
        );
        Ok(summary)
    }
}
