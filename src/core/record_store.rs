//! Thread-safe transaction storage with a reference-number index
//!
//! This module provides the `RecordStore`, the owner of every canonical
//! transaction. It keeps two concurrent maps:
//!
//! - the primary map, transaction id to transaction
//! - the reference index, non-blank reference number to the id holding it
//!
//! # Thread Safety
//!
//! Both maps are `DashMap`s, so readers and writers on different keys proceed
//! in parallel. Operations on one id are serialized by holding that id's
//! primary entry for the whole operation. Lock order is always primary map
//! first, reference index second; no code path holds an index entry while
//! waiting on the primary map.
//!
//! # Uniqueness
//!
//! Claiming a reference number during `save` is a single entry operation on
//! the index. Two writers racing for the same reference number cannot both
//! win: the loser gets `StoreError::DuplicateKey`, whatever checks it ran
//! beforehand.

use crate::core::traits::TransactionRepository;
use crate::types::{StoreError, Transaction, TransactionId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory, concurrent transaction store
#[derive(Debug, Default)]
pub struct RecordStore {
    /// Canonical transactions by id
    transactions: DashMap<TransactionId, Transaction>,

    /// Reference number to owning transaction id
    reference_index: DashMap<String, TransactionId>,
}

impl RecordStore {
    /// Create a new empty RecordStore
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
            reference_index: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Drop every transaction and index entry
    pub fn clear(&self) {
        self.transactions.clear();
        self.reference_index.clear();
    }

    /// Point `reference_number` at `id`, unless another id already holds it
    fn claim_reference(&self, reference_number: &str, id: &TransactionId) -> Result<(), StoreError> {
        match self.reference_index.entry(reference_number.to_string()) {
            Entry::Occupied(owner) if owner.get() != id => Err(StoreError::DuplicateKey {
                reference_number: reference_number.to_string(),
                existing_id: owner.get().to_string(),
            }),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(vacant) => {
                vacant.insert(id.clone());
                Ok(())
            }
        }
    }

    /// Claim `next` for `id`, then release `previous` if it changed
    ///
    /// Callers hold the primary entry for `id`.
    fn move_reference(
        &self,
        id: &TransactionId,
        previous: Option<String>,
        next: Option<&str>,
    ) -> Result<(), StoreError> {
        if let Some(reference) = next {
            self.claim_reference(reference, id)?;
        }

        if let Some(previous) = previous {
            if next != Some(previous.as_str()) {
                self.release_reference(&previous, id);
            }
        }
        Ok(())
    }

    /// Drop an index entry, but only while it still points at `id`
    fn release_reference(&self, reference_number: &str, id: &TransactionId) {
        self.reference_index
            .remove_if(reference_number, |_, owner| owner == id);
    }
}

impl TransactionRepository for RecordStore {
    /// Upsert a transaction by id (atomic per id)
    ///
    /// # Returns
    ///
    /// * `Ok(Transaction)` - The stored transaction
    /// * `Err(StoreError::DuplicateKey)` - The reference number belongs to a
    ///   different transaction; nothing was written
    fn save(&self, transaction: Transaction) -> Result<Transaction, StoreError> {
        let id = transaction.id.clone();
        let slot = self.transactions.entry(id.clone());

        let previous_reference = match &slot {
            Entry::Occupied(existing) => existing
                .get()
                .indexed_reference()
                .map(str::to_string),
            Entry::Vacant(_) => None,
        };

        self.move_reference(&id, previous_reference, transaction.indexed_reference())?;

        match slot {
            Entry::Occupied(mut existing) => {
                existing.insert(transaction.clone());
            }
            Entry::Vacant(vacant) => {
                vacant.insert(transaction.clone());
            }
        }

        Ok(transaction)
    }

    /// Overwrite a transaction that is still stored (atomic per id)
    ///
    /// Returns `Ok(None)` without writing anything when the id is gone, so a
    /// write racing a delete cannot bring the transaction back.
    fn replace(&self, transaction: Transaction) -> Result<Option<Transaction>, StoreError> {
        let id = transaction.id.clone();
        let Entry::Occupied(mut existing) = self.transactions.entry(id.clone()) else {
            return Ok(None);
        };

        let previous_reference = existing.get().indexed_reference().map(str::to_string);
        self.move_reference(&id, previous_reference, transaction.indexed_reference())?;

        existing.insert(transaction.clone());
        Ok(Some(transaction))
    }

    fn find_by_id(&self, id: &str) -> Option<Transaction> {
        if id.trim().is_empty() {
            return None;
        }
        self.transactions.get(id).map(|entry| entry.value().clone())
    }

    /// All transactions, newest first
    ///
    /// Equal timestamps fall back to descending id. Generated ids are
    /// time-ordered, so ties still list the later creation first.
    fn find_all(&self) -> Vec<Transaction> {
        let mut all: Vec<Transaction> = self
            .transactions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        all.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });
        all
    }

    /// A slice of `find_all`
    ///
    /// Out-of-range requests (negative page, non-positive size, start past the
    /// end) yield an empty page rather than an error.
    fn find_page(&self, page: i64, size: i64) -> Vec<Transaction> {
        if page < 0 || size <= 0 {
            return Vec::new();
        }
        let Some(start) = page.checked_mul(size) else {
            return Vec::new();
        };

        let all = self.find_all();
        let start = usize::try_from(start).unwrap_or(usize::MAX);
        if start >= all.len() {
            return Vec::new();
        }

        let take = usize::try_from(size).unwrap_or(usize::MAX);
        all.into_iter().skip(start).take(take).collect()
    }

    fn count(&self) -> u64 {
        self.transactions.len() as u64
    }

    fn find_by_reference_number(&self, reference_number: &str) -> Option<Transaction> {
        if reference_number.trim().is_empty() {
            return None;
        }
        let id = self
            .reference_index
            .get(reference_number)
            .map(|entry| entry.value().clone())?;
        self.find_by_id(id.as_str())
    }

    fn delete_by_id(&self, id: &str) -> bool {
        if id.trim().is_empty() {
            return false;
        }

        match self.transactions.entry(TransactionId::from(id)) {
            Entry::Occupied(slot) => {
                if let Some(reference) = slot.get().indexed_reference() {
                    self.release_reference(reference, slot.key());
                }
                slot.remove();
                true
            }
            Entry::Vacant(_) => false,
        }
    }

    fn exists_by_id(&self, id: &str) -> bool {
        if id.trim().is_empty() {
            return false;
        }
        self.transactions.contains_key(id)
    }

    fn exists_by_reference_number(&self, reference_number: &str) -> bool {
        if reference_number.trim().is_empty() {
            return false;
        }
        self.reference_index.contains_key(reference_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, TransactionType};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn transaction(id: &str, offset_secs: i64, reference: Option<&str>) -> Transaction {
        Transaction {
            id: TransactionId::from(id),
            amount: Decimal::new(10000, 2),
            currency: Currency::Usd,
            transaction_type: TransactionType::Deposit,
            timestamp: base_time() + Duration::seconds(offset_secs),
            description: None,
            reference_number: reference.map(str::to_string),
        }
    }

    fn ids(transactions: &[Transaction]) -> Vec<&str> {
        transactions.iter().map(|tx| tx.id.as_str()).collect()
    }

    #[test]
    fn test_save_and_find_by_id() {
        let store = RecordStore::new();
        let saved = store.save(transaction("a", 0, Some("REF001"))).unwrap();

        assert_eq!(saved.id.as_str(), "a");
        assert_eq!(store.find_by_id("a"), Some(saved.clone()));
        assert_eq!(store.find_by_reference_number("REF001"), Some(saved));
        assert_eq!(store.count(), 1);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("missing")]
    fn test_find_by_id_misses(#[case] id: &str) {
        let store = RecordStore::new();
        store.save(transaction("a", 0, None)).unwrap();
        assert!(store.find_by_id(id).is_none());
        assert!(!store.exists_by_id(id));
    }

    #[test]
    fn test_save_rejects_reference_held_by_other_id() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, Some("REF001"))).unwrap();

        let result = store.save(transaction("b", 1, Some("REF001")));

        assert_eq!(
            result,
            Err(StoreError::DuplicateKey {
                reference_number: "REF001".to_string(),
                existing_id: "a".to_string(),
            })
        );
        assert!(!store.exists_by_id("b"));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_resave_same_id_keeps_reference() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, Some("REF001"))).unwrap();

        let mut updated = transaction("a", 0, Some("REF001"));
        updated.amount = Decimal::new(5, 0);
        store.save(updated).unwrap();

        assert_eq!(store.find_by_id("a").unwrap().amount, Decimal::new(5, 0));
        assert!(store.exists_by_reference_number("REF001"));
    }

    #[test]
    fn test_changing_reference_releases_old_one() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, Some("OLD"))).unwrap();
        store.save(transaction("a", 0, Some("NEW"))).unwrap();

        assert!(!store.exists_by_reference_number("OLD"));
        assert_eq!(store.find_by_reference_number("NEW").unwrap().id.as_str(), "a");

        // The released reference can now be taken by someone else
        assert!(store.save(transaction("b", 1, Some("OLD"))).is_ok());
    }

    #[test]
    fn test_replace_overwrites_and_moves_reference() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, Some("OLD"))).unwrap();

        let mut updated = transaction("a", 0, Some("NEW"));
        updated.amount = Decimal::new(7, 0);
        let replaced = store.replace(updated.clone()).unwrap();

        assert_eq!(replaced, Some(updated.clone()));
        assert_eq!(store.find_by_id("a"), Some(updated));
        assert!(!store.exists_by_reference_number("OLD"));
        assert!(store.exists_by_reference_number("NEW"));
    }

    #[test]
    fn test_replace_after_delete_writes_nothing() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, Some("REF"))).unwrap();
        assert!(store.delete_by_id("a"));

        let result = store.replace(transaction("a", 0, Some("REF")));

        assert_eq!(result, Ok(None));
        assert!(!store.exists_by_id("a"));
        assert!(!store.exists_by_reference_number("REF"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_rejects_reference_held_by_other_id() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, Some("A"))).unwrap();
        store.save(transaction("b", 1, Some("B"))).unwrap();

        let result = store.replace(transaction("b", 1, Some("A")));

        assert!(matches!(result, Err(StoreError::DuplicateKey { .. })));
        assert_eq!(store.find_by_reference_number("B").unwrap().id.as_str(), "b");
    }

    #[test]
    fn test_clearing_reference_releases_it() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, Some("REF"))).unwrap();
        store.save(transaction("a", 0, Some("  "))).unwrap();

        assert!(!store.exists_by_reference_number("REF"));
        assert!(!store.exists_by_reference_number("  "));
    }

    #[test]
    fn test_failed_save_leaves_existing_reference_untouched() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, Some("A"))).unwrap();
        store.save(transaction("b", 1, Some("B"))).unwrap();

        // Moving b onto A must fail and keep b's own reference indexed
        assert!(store.save(transaction("b", 1, Some("A"))).is_err());
        assert_eq!(store.find_by_reference_number("B").unwrap().id.as_str(), "b");
        assert_eq!(store.find_by_reference_number("A").unwrap().id.as_str(), "a");
    }

    #[test]
    fn test_blank_reference_is_not_indexed() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, Some(""))).unwrap();
        store.save(transaction("b", 1, Some(""))).unwrap();

        assert_eq!(store.count(), 2);
        assert!(!store.exists_by_reference_number(""));
        assert!(store.find_by_reference_number("").is_none());
    }

    #[test]
    fn test_find_all_orders_newest_first() {
        let store = RecordStore::new();
        store.save(transaction("old", 0, None)).unwrap();
        store.save(transaction("new", 20, None)).unwrap();
        store.save(transaction("mid", 10, None)).unwrap();

        assert_eq!(ids(&store.find_all()), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_find_all_breaks_ties_by_id() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, None)).unwrap();
        store.save(transaction("c", 0, None)).unwrap();
        store.save(transaction("b", 0, None)).unwrap();

        assert_eq!(ids(&store.find_all()), vec!["c", "b", "a"]);
        assert_eq!(store.find_all(), store.find_all());
    }

    #[rstest]
    #[case::first_page(0, 2, vec!["e", "d"])]
    #[case::second_page(1, 2, vec!["c", "b"])]
    #[case::partial_last_page(2, 2, vec!["a"])]
    #[case::past_end(3, 2, vec![])]
    #[case::all_in_one(0, 10, vec!["e", "d", "c", "b", "a"])]
    #[case::negative_page(-1, 2, vec![])]
    #[case::zero_size(0, 0, vec![])]
    #[case::negative_size(0, -5, vec![])]
    #[case::overflowing_offset(i64::MAX, 2, vec![])]
    fn test_find_page(#[case] page: i64, #[case] size: i64, #[case] expected: Vec<&str>) {
        let store = RecordStore::new();
        for (offset, id) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            store.save(transaction(id, offset as i64, None)).unwrap();
        }

        assert_eq!(ids(&store.find_page(page, size)), expected);
    }

    #[test]
    fn test_delete_frees_reference() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, Some("REF001"))).unwrap();

        assert!(store.delete_by_id("a"));
        assert!(!store.exists_by_id("a"));
        assert!(!store.exists_by_reference_number("REF001"));
        assert_eq!(store.count(), 0);

        assert!(store.save(transaction("b", 1, Some("REF001"))).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("missing")]
    fn test_delete_reports_no_removal(#[case] id: &str) {
        let store = RecordStore::new();
        store.save(transaction("a", 0, None)).unwrap();
        assert!(!store.delete_by_id(id));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_clear_empties_both_maps() {
        let store = RecordStore::new();
        store.save(transaction("a", 0, Some("REF"))).unwrap();
        store.clear();

        assert!(store.is_empty());
        assert!(!store.exists_by_reference_number("REF"));
    }

    #[test]
    fn test_concurrent_saves_with_same_reference_have_one_winner() {
        let store = Arc::new(RecordStore::new());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.save(transaction(&format!("tx-{}", i), i, Some("SHARED")))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(store.count(), 1);

        let winner = store.find_by_reference_number("SHARED").unwrap();
        assert!(store.exists_by_id(winner.id.as_str()));
    }

    #[test]
    fn test_concurrent_saves_of_different_ids() {
        let store = Arc::new(RecordStore::new());

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .save(transaction(
                            &format!("tx-{}", i),
                            i,
                            Some(format!("REF-{}", i).as_str()),
                        ))
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.count(), 10);
        for i in 0..10 {
            let found = store.find_by_reference_number(&format!("REF-{}", i)).unwrap();
            assert_eq!(found.id.as_str(), format!("tx-{}", i));
        }
    }
}
