//! Read-through caching in front of the record store
//!
//! Two bounded caches, both backed by `moka`:
//!
//! - **entity cache**: transaction id to transaction snapshot
//! - **page cache**: `(page, size)` to a computed listing page
//!
//! Entries expire a fixed time after they were written and the least recently
//! used entry is evicted once a cache is full. The layer never touches the
//! canonical state in the store, and the service stays correct with the layer
//! disabled.
//!
//! # Fill races
//!
//! A reader can load a value from the store, lose the CPU to a writer that
//! saves and invalidates, and then insert its now-stale value. Each cache
//! therefore carries a generation counter that invalidation bumps *before*
//! removing entries. Fills take a [`CacheTicket`] before reading the store.
//! A fill whose ticket is already outdated is dropped; otherwise it inserts
//! and re-checks the generation, undoing its own insert if an invalidation
//! happened in between.
//!
//! The guard narrows the race but does not close it. An invalidation landing
//! between the insert and the re-check leaves the stale snapshot readable
//! until the re-check removes it, so a concurrent reader may briefly see the
//! value from before a write that has already returned.

use crate::types::{Page, Transaction, TransactionId};
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Cache key for listing pages
pub type PageKey = (u64, u64);

/// Cache sizing and expiry
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum entries per cache
    pub capacity: u64,
    /// Time-to-live measured from insertion
    pub ttl: Duration,
    /// When false, every lookup misses and every fill is dropped
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            ttl: Duration::from_secs(3600),
            enabled: true,
        }
    }
}

impl CacheConfig {
    /// Create an enabled config, falling back to defaults for zero values
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let default = Self::default();

        let capacity = if capacity == 0 {
            tracing::warn!(
                capacity,
                default = default.capacity,
                "Invalid cache capacity, using default"
            );
            default.capacity
        } else {
            capacity
        };

        let ttl = if ttl.is_zero() {
            tracing::warn!(
                default_secs = default.ttl.as_secs(),
                "Invalid cache TTL, using default"
            );
            default.ttl
        } else {
            ttl
        };

        Self {
            capacity,
            ttl,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Hit and miss counters for one cache
#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheCounters {
    fn record(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time statistics for one cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Generation observed before a store read; see the module docs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTicket(u64);

/// One bounded, expiring cache plus its bookkeeping
struct Tier<K, V> {
    cache: Option<Cache<K, V>>,
    generation: AtomicU64,
    counters: CacheCounters,
}

impl<K, V> Tier<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn new(config: &CacheConfig) -> Self {
        let cache = config.enabled.then(|| {
            Cache::builder()
                .max_capacity(config.capacity)
                .time_to_live(config.ttl)
                .eviction_policy(EvictionPolicy::lru())
                .build()
        });

        Self {
            cache,
            generation: AtomicU64::new(0),
            counters: CacheCounters::default(),
        }
    }

    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: std::borrow::Borrow<Q>,
        Q: std::hash::Hash + Eq + ?Sized,
    {
        let cache = self.cache.as_ref()?;
        let value = cache.get(key);
        self.counters.record(value.is_some());
        if value.is_none() {
            // Expired entries read as misses but linger until housekeeping
            cache.invalidate(key);
        }
        value
    }

    fn ticket(&self) -> CacheTicket {
        CacheTicket(self.generation.load(Ordering::SeqCst))
    }

    fn put(&self, ticket: CacheTicket, key: K, value: V)
    where
        K: Clone,
    {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        if self.generation.load(Ordering::SeqCst) != ticket.0 {
            return;
        }
        cache.insert(key.clone(), value);
        if self.generation.load(Ordering::SeqCst) != ticket.0 {
            cache.invalidate(&key);
        }
    }

    fn invalidate<Q>(&self, key: &Q)
    where
        K: std::borrow::Borrow<Q>,
        Q: std::hash::Hash + Eq + ?Sized,
    {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(cache) = self.cache.as_ref() {
            cache.invalidate(key);
        }
    }

    fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(cache) = self.cache.as_ref() {
            cache.invalidate_all();
        }
    }

    fn entry_count(&self) -> u64 {
        self.cache.as_ref().map_or(0, |cache| {
            cache.run_pending_tasks();
            cache.entry_count()
        })
    }

    fn run_pending_tasks(&self) {
        if let Some(cache) = self.cache.as_ref() {
            cache.run_pending_tasks();
        }
    }
}

/// Entity and page caches used by the transaction service
pub struct CacheLayer {
    entities: Tier<TransactionId, Transaction>,
    pages: Tier<PageKey, Page<Transaction>>,
}

impl CacheLayer {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entities: Tier::new(config),
            pages: Tier::new(config),
        }
    }

    /// A layer that caches nothing
    pub fn disabled() -> Self {
        Self::new(&CacheConfig::disabled())
    }

    pub fn is_enabled(&self) -> bool {
        self.entities.cache.is_some()
    }

    pub fn get_entity(&self, id: &str) -> Option<Transaction> {
        self.entities.get(id)
    }

    /// Take before reading the store for an entity fill
    pub fn entity_ticket(&self) -> CacheTicket {
        self.entities.ticket()
    }

    pub fn put_entity(&self, ticket: CacheTicket, transaction: Transaction) {
        self.entities
            .put(ticket, transaction.id.clone(), transaction);
    }

    pub fn invalidate_entity(&self, id: &str) {
        self.entities.invalidate(id);
    }

    pub fn get_page(&self, page: u64, size: u64) -> Option<Page<Transaction>> {
        self.pages.get(&(page, size))
    }

    /// Take before reading the store for a page fill
    pub fn page_ticket(&self) -> CacheTicket {
        self.pages.ticket()
    }

    pub fn put_page(&self, ticket: CacheTicket, listing: Page<Transaction>) {
        let key = (listing.page, listing.size);
        self.pages.put(ticket, key, listing);
    }

    /// Drop every cached page
    pub fn invalidate_pages(&self) {
        self.pages.invalidate_all();
    }

    /// Drop everything in both caches
    pub fn invalidate_all(&self) {
        self.entities.invalidate_all();
        self.pages.invalidate_all();
    }

    pub fn entity_stats(&self) -> CacheStats {
        self.entities.counters.snapshot()
    }

    pub fn page_stats(&self) -> CacheStats {
        self.pages.counters.snapshot()
    }

    /// Entity entries currently held, after pending evictions are applied
    pub fn entity_count(&self) -> u64 {
        self.entities.entry_count()
    }

    /// Page entries currently held, after pending evictions are applied
    pub fn page_count(&self) -> u64 {
        self.pages.entry_count()
    }

    /// Apply pending evictions and expirations now instead of lazily
    pub fn run_pending_tasks(&self) {
        self.entities.run_pending_tasks();
        self.pages.run_pending_tasks();
    }
}

impl Default for CacheLayer {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl std::fmt::Debug for CacheLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheLayer")
            .field("enabled", &self.is_enabled())
            .field("entity_stats", &self.entity_stats())
            .field("page_stats", &self.page_stats())
            .finish()
    }
}
