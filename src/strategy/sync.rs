//! Synchronous import strategy
//!
//! Streams rows from the `RequestReader` and creates them one by one on the
//! calling thread, so listing order matches file order (last row first).

use crate::io::RequestReader;
use crate::strategy::{import_row, ImportStrategy, ImportSummary, InMemoryService};
use crate::types::ImportError;
use std::path::Path;

/// Single-threaded, in-order import
#[derive(Debug, Clone, Copy)]
pub struct SyncImportStrategy;

impl ImportStrategy for SyncImportStrategy {
    fn import(
        &self,
        input_path: &Path,
        service: &InMemoryService,
    ) -> Result<ImportSummary, ImportError> {
        let reader = RequestReader::open(input_path)?;

        let mut summary = ImportSummary::default();
        for row in reader {
            summary.record(import_row(service, row));
        }

        tracing::info!(
            created = summary.created,
            rejected = summary.rejected,
            "Sync import finished"
        );
        Ok(summary)
    }
}
