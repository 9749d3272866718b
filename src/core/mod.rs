//! Core business logic module
//!
//! This module contains the transaction service components:
//! - `traits` - Repository abstraction the service is written against
//! - `validator` - Pure field-level business rules
//! - `record_store` - Concurrent store with the reference-number index
//! - `cache` - Entity and page caches in front of the store
//! - `service` - Orchestration of the user-facing operations

pub mod cache;
pub mod record_store;
pub mod service;
pub mod traits;
pub mod validator;

pub use cache::{CacheConfig, CacheLayer, CacheStats};
pub use record_store::RecordStore;
pub use service::{TransactionService, MAX_PAGE_SIZE};
pub use traits::TransactionRepository;
