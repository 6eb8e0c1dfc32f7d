//! In-memory memoization for provider fetches.
//!
//! [`CacheStore::get_or_compute`] returns a stored value while it is fresh and
//! otherwise runs the producer. Each key has its own async lock that is held
//! while the producer runs, so concurrent callers for one key share a single
//! upstream fetch per TTL window. Producer errors are returned to the caller
//! and never stored.
//!
//! The store is unbounded unless built with [`CacheStore::with_max_entries`],
//! which evicts the least recently used key once the bound is reached.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Defines the behavior of the cache for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present;
    /// otherwise, run the producer and store its value. (Default)
    #[default]
    Use,
    /// Always run the producer, bypassing any cached entry,
    /// and store the new value.
    Refresh,
    /// Always run the producer and do not read from or write to the cache.
    Bypass,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

type Slot<V> = Arc<tokio::sync::Mutex<Option<CacheEntry<V>>>>;

struct SlotHandle<V> {
    slot: Slot<V>,
    last_used: u64,
}

struct CacheInner<V> {
    slots: HashMap<String, SlotHandle<V>>,
    tick: u64,
    max_entries: Option<usize>,
}

impl<V> CacheInner<V> {
    fn new(max_entries: Option<usize>) -> Self {
        Self {
            slots: HashMap::new(),
            tick: 0,
            max_entries,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict_least_recently_used(&mut self) {
        let victim = self
            .slots
            .iter()
            .min_by_key(|(_, handle)| handle.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = victim {
            tracing::debug!(key = %key, "evicting least recently used cache entry");
            self.slots.remove(&key);
        }
    }
}

/// Thread-safe memoizing store keyed by string.
pub struct CacheStore<V> {
    inner: Arc<Mutex<CacheInner<V>>>,
}

impl<V> Clone for CacheStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("CacheStore")
            .field("keys", &inner.slots.len())
            .field("max_entries", &inner.max_entries)
            .finish()
    }
}

impl<V> CacheStore<V> {
    /// Unbounded store; entries leave only by expiry or explicit removal.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::new(None))),
        }
    }

    /// Store bounded to `max_entries` keys with least-recently-used eviction.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::new(Some(max_entries.max(1))))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner<V>> {
        // A panic while holding this lock cannot leave the map half-updated.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, key: &str) -> Slot<V> {
        let mut inner = self.lock();
        let tick = inner.next_tick();

        if let Some(handle) = inner.slots.get_mut(key) {
            handle.last_used = tick;
            return Arc::clone(&handle.slot);
        }

        if let Some(max) = inner.max_entries {
            while inner.slots.len() >= max {
                inner.evict_least_recently_used();
            }
        }

        let slot: Slot<V> = Arc::new(tokio::sync::Mutex::new(None));
        inner.slots.insert(
            key.to_owned(),
            SlotHandle {
                slot: Arc::clone(&slot),
                last_used: tick,
            },
        );
        slot
    }

    fn existing_slot(&self, key: &str) -> Option<Slot<V>> {
        self.lock()
            .slots
            .get(key)
            .map(|handle| Arc::clone(&handle.slot))
    }

    fn all_slots(&self) -> Vec<(String, Slot<V>)> {
        self.lock()
            .slots
            .iter()
            .map(|(key, handle)| (key.clone(), Arc::clone(&handle.slot)))
            .collect()
    }

    /// Remove `key` only if it still maps to `slot`.
    fn remove_slot(inner: &mut CacheInner<V>, key: &str, slot: &Slot<V>) {
        let unchanged = inner
            .slots
            .get(key)
            .is_some_and(|handle| Arc::ptr_eq(&handle.slot, slot));
        if unchanged {
            inner.slots.remove(key);
        }
    }

    /// Remove one key regardless of freshness.
    pub fn invalidate(&self, key: &str) {
        self.lock().slots.remove(key);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().slots.clear();
    }
}

impl<V: Clone> CacheStore<V> {
    /// Fresh value for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<V> {
        let slot = self.existing_slot(key)?;
        let guard = slot.lock().await;
        guard
            .as_ref()
            .filter(|entry| entry.is_fresh(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    /// Return the fresh cached value for `key` or run `producer` and store its
    /// `Ok` result for `ttl`.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, ttl: Duration, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.get_or_compute_with(CacheMode::Use, key, ttl, producer)
            .await
    }

    /// [`get_or_compute`](Self::get_or_compute) with an explicit [`CacheMode`].
    pub async fn get_or_compute_with<F, Fut, E>(
        &self,
        mode: CacheMode,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if mode == CacheMode::Bypass {
            return producer().await;
        }

        let slot = self.slot(key);
        let mut guard = slot.lock().await;

        if mode == CacheMode::Use {
            if let Some(entry) = guard.as_ref().filter(|e| e.is_fresh(Instant::now())) {
                tracing::debug!(key, "cache hit");
                return Ok(entry.value.clone());
            }
        }

        tracing::debug!(key, ?mode, "cache miss");
        let value = match producer().await {
            Ok(value) => value,
            Err(error) => {
                // A failed first fetch must not leave an empty slot behind.
                if guard.is_none() {
                    Self::remove_slot(&mut self.lock(), key, &slot);
                }
                return Err(error);
            }
        };
        *guard = Some(CacheEntry {
            value: value.clone(),
            expires_at: Instant::now() + ttl,
        });
        Ok(value)
    }

    /// Drop expired and empty entries. Entries whose producer is still running
    /// are kept.
    pub async fn clear_expired(&self) {
        let now = Instant::now();
        let mut stale = Vec::new();

        for (key, slot) in self.all_slots() {
            if let Ok(guard) = slot.try_lock() {
                let keep = guard.as_ref().is_some_and(|entry| entry.is_fresh(now));
                if !keep {
                    stale.push((key, slot.clone()));
                }
            }
        }

        let mut inner = self.lock();
        for (key, slot) in stale {
            Self::remove_slot(&mut inner, &key, &slot);
        }
    }

    /// Number of keys holding a stored value, including expired ones.
    pub async fn len(&self) -> usize {
        let mut count = 0;
        for (_, slot) in self.all_slots() {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
