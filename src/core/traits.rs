//! Core trait for transaction persistence
//!
//! The service talks to storage only through this trait, so alternative
//! stores (or instrumented ones in tests) can be swapped in.

use crate::types::{StoreError, Transaction};

/// Trait for storing and retrieving transactions
///
/// Blank ids and blank reference numbers never match anything: lookups return
/// `None`/`false` rather than an error.
pub trait TransactionRepository: Send + Sync {
    /// Upsert a transaction by id, enforcing reference-number uniqueness
    fn save(&self, transaction: Transaction) -> Result<Transaction, StoreError>;

    /// Overwrite a transaction only if its id is still stored
    ///
    /// Returns `Ok(None)` and writes nothing when the id is absent.
    fn replace(&self, transaction: Transaction) -> Result<Option<Transaction>, StoreError>;

    /// Get a transaction by id
    fn find_by_id(&self, id: &str) -> Option<Transaction>;

    /// All live transactions, newest first
    fn find_all(&self) -> Vec<Transaction>;

    /// The `[page * size, page * size + size)` slice of `find_all`
    fn find_page(&self, page: i64, size: i64) -> Vec<Transaction>;

    /// Number of live transactions
    fn count(&self) -> u64;

    fn find_by_reference_number(&self, reference_number: &str) -> Option<Transaction>;

    /// Remove a transaction and free its reference number
    ///
    /// Returns whether anything was removed.
    fn delete_by_id(&self, id: &str) -> bool;

    fn exists_by_id(&self, id: &str) -> bool;

    fn exists_by_reference_number(&self, reference_number: &str) -> bool;
}
