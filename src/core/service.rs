//! Transaction service orchestration
//!
//! This module provides the `TransactionService`, which composes validation,
//! the record store, and the cache layer into the user-facing operations:
//! create, get, list, update, delete, and exists.
//!
//! # Architecture
//!
//! ```text
//! TransactionService
//!     ├── validator               (pure field checks)
//!     ├── Arc<R: TransactionRepository> (canonical state)
//!     └── Arc<CacheLayer>         (entity + page caches)
//! ```
//!
//! # Uniqueness
//!
//! Create and update check the reference number before saving, but the store's
//! own check inside `save` is the authoritative one. A `DuplicateKey` from
//! `save` (a concurrent writer took the reference between our check and our
//! save) is reported as `DuplicateReference`, exactly like the early check.

use std::sync::Arc;

use crate::core::cache::CacheLayer;
use crate::core::traits::TransactionRepository;
use crate::core::validator;
use crate::types::{
    InvalidInputKind, Page, ServiceError, StoreError, Transaction, TransactionId,
    TransactionRequest,
};
use chrono::Utc;

/// Largest page size a listing may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// Orchestrator for all transaction operations
///
/// Cheap to clone; clones share the same store and caches.
#[derive(Debug)]
pub struct TransactionService<R> {
    repository: Arc<R>,
    cache: Arc<CacheLayer>,
}

impl<R> Clone for TransactionService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<R: TransactionRepository> TransactionService<R> {
    /// Create a new TransactionService
    ///
    /// # Arguments
    ///
    /// * `repository` - Arc-wrapped store that owns the canonical transactions
    /// * `cache` - Arc-wrapped cache layer (may be disabled)
    pub fn new(repository: Arc<R>, cache: Arc<CacheLayer>) -> Self {
        Self { repository, cache }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn cache(&self) -> &Arc<CacheLayer> {
        &self.cache
    }

    /// Create a new transaction
    ///
    /// # Returns
    ///
    /// * `Ok(Transaction)` - The stored transaction with its generated id and timestamp
    /// * `Err(ServiceError::InvalidInput)` - A field failed validation
    /// * `Err(ServiceError::DuplicateReference)` - The reference number is taken
    pub fn create(&self, request: TransactionRequest) -> Result<Transaction, ServiceError> {
        let fields = validator::validate(&request)?;

        if let Some(reference) = request.indexed_reference() {
            if self.repository.exists_by_reference_number(reference) {
                return Err(ServiceError::duplicate_reference(reference));
            }
        }

        let transaction = Transaction {
            id: TransactionId::generate(),
            amount: fields.amount,
            currency: fields.currency,
            transaction_type: fields.transaction_type,
            timestamp: Utc::now(),
            description: request.description,
            reference_number: request.reference_number,
        };

        let saved = self.save(transaction)?;
        self.cache.invalidate_pages();

        tracing::info!(id = %saved.id, "Transaction created");
        Ok(saved)
    }

    /// Get a transaction by id, serving from the entity cache when possible
    pub fn get_by_id(&self, id: &str) -> Result<Transaction, ServiceError> {
        let id = require_id(id)?;

        if let Some(cached) = self.cache.get_entity(id) {
            tracing::debug!(id, "Entity cache hit");
            return Ok(cached);
        }

        let ticket = self.cache.entity_ticket();
        let transaction = self
            .repository
            .find_by_id(id)
            .ok_or_else(|| ServiceError::not_found(id))?;
        self.cache.put_entity(ticket, transaction.clone());

        tracing::debug!(id, "Transaction loaded from store");
        Ok(transaction)
    }

    /// List one page of transactions, newest first
    ///
    /// # Returns
    ///
    /// * `Ok(Page)` - The page with total counts and boundary flags
    /// * `Err(ServiceError::InvalidInput)` - `page < 0`, or `size` outside `1..=100`
    pub fn list(&self, page: i64, size: i64) -> Result<Page<Transaction>, ServiceError> {
        if page < 0 {
            return Err(InvalidInputKind::InvalidPage.into());
        }
        if size <= 0 || size > MAX_PAGE_SIZE {
            return Err(InvalidInputKind::InvalidPageSize.into());
        }
        let (page_number, page_size) = (page as u64, size as u64);

        if let Some(cached) = self.cache.get_page(page_number, page_size) {
            tracing::debug!(page, size, "Page cache hit");
            return Ok(cached);
        }

        let ticket = self.cache.page_ticket();
        let content = self.repository.find_page(page, size);
        let total = self.repository.count();
        let listing = Page::new(content, page_number, page_size, total);
        self.cache.put_page(ticket, listing.clone());

        tracing::debug!(page, size, total, "Page computed from store");
        Ok(listing)
    }

    /// Replace every mutable field of an existing transaction
    ///
    /// The id and original timestamp are kept. The existing transaction is
    /// read from the store, never from the cache. The write only replaces a
    /// transaction that is still stored; if a delete lands after the read, the
    /// update reports `NotFound` instead of bringing the transaction back.
    pub fn update(
        &self,
        id: &str,
        request: TransactionRequest,
    ) -> Result<Transaction, ServiceError> {
        let id = require_id(id)?;
        let fields = validator::validate(&request)?;

        let mut transaction = self
            .repository
            .find_by_id(id)
            .ok_or_else(|| ServiceError::not_found(id))?;

        if let Some(reference) = request.indexed_reference() {
            if transaction.reference_number.as_deref() != Some(reference)
                && self.repository.exists_by_reference_number(reference)
            {
                return Err(ServiceError::duplicate_reference(reference));
            }
        }

        transaction.amount = fields.amount;
        transaction.currency = fields.currency;
        transaction.transaction_type = fields.transaction_type;
        transaction.description = request.description;
        transaction.reference_number = request.reference_number;

        let saved = self
            .repository
            .replace(transaction)
            .map_err(reference_conflict)?
            .ok_or_else(|| ServiceError::not_found(id))?;
        self.cache.invalidate_entity(id);
        self.cache.invalidate_pages();

        tracing::info!(id, "Transaction updated");
        Ok(saved)
    }

    /// Delete a transaction and free its reference number
    pub fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = require_id(id)?;

        if !self.repository.exists_by_id(id) {
            return Err(ServiceError::not_found(id));
        }

        let removed = self.repository.delete_by_id(id);
        self.cache.invalidate_entity(id);
        self.cache.invalidate_pages();

        if !removed {
            tracing::error!(id, "Transaction vanished between existence check and delete");
            return Err(ServiceError::internal_failure(format!(
                "failed to delete transaction {}",
                id
            )));
        }

        tracing::info!(id, "Transaction deleted");
        Ok(())
    }

    /// Whether a transaction exists; blank ids are simply absent
    pub fn exists_by_id(&self, id: &str) -> bool {
        if id.trim().is_empty() {
            return false;
        }
        self.repository.exists_by_id(id)
    }

    /// Save through the store, reporting a lost reference race as a duplicate
    fn save(&self, transaction: Transaction) -> Result<Transaction, ServiceError> {
        self.repository.save(transaction).map_err(reference_conflict)
    }
}

/// A reference claimed between our pre-check and the store write
fn reference_conflict(error: StoreError) -> ServiceError {
    let StoreError::DuplicateKey {
        reference_number,
        existing_id,
    } = &error;
    tracing::warn!(
        reference_number = %reference_number,
        existing_id = %existing_id,
        "Reference number claimed concurrently"
    );
    ServiceError::from(error)
}

fn require_id(id: &str) -> Result<&str, ServiceError> {
    if id.trim().is_empty() {
        Err(InvalidInputKind::InvalidId.into())
    } else {
        Ok(id)
    }
}
