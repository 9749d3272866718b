//! Transaction Service Library
//! # Overview
//!
//! An in-memory financial transaction service: validated creation, lookup,
//! paginated listing, update and deletion of transactions, with
//! reference-number uniqueness enforced under concurrency and a read-through
//! cache in front of the store.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Transaction, Currency, Page, errors)
//! - [`core`] - Business logic components:
//!   - [`core::validator`] - Field rules for proposed transactions
//!   - [`core::record_store`] - Concurrent store with a reference-number index
//!   - [`core::cache`] - Entity and page caches with TTL and LRU eviction
//!   - [`core::service`] - Orchestration of validation, store and cache
//! - [`io`] - CSV reading of requests and writing of listings
//! - [`strategy`] - Sequential and concurrent CSV import pipelines
//! - [`cli`] - CLI arguments parsing and the import-then-list run
//!
//! # Listing order
//!
//! Listings are ordered newest first by timestamp; equal timestamps fall back
//! to the time-ordered id, so the most recently created comes first.

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{
    CacheConfig, CacheLayer, CacheStats, RecordStore, TransactionRepository, TransactionService,
    MAX_PAGE_SIZE,
};
pub use io::{write_page_json, write_transactions_csv};
pub use types::{
    Currency, ImportError, InvalidInputKind, Page, ServiceError, StoreError, Transaction,
    TransactionId, TransactionRequest, TransactionType,
};
