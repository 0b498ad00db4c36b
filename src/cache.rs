//! Bounded least-recently-used cache of classification results

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

use crate::errors::{ClassifierError, ClassifierResult};
use crate::models::ResultFields;

/// Hit counters since the cache was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub lookups: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

/// User agent -> result cache, safe to share between threads
pub struct ResultCache {
    entries: Mutex<LruCache<String, ResultFields>>,
    hits: AtomicU64,
    lookups: AtomicU64,
}

impl ResultCache {
    pub fn new(capacity: usize) -> ClassifierResult<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            ClassifierError::configuration("result cache capacity must be at least 1")
        })?;

        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            lookups: AtomicU64::new(0),
        })
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, ResultFields>> {
        // entries are only ever whole values, so a poisoned lock is still usable
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a result and promote it to most-recently-used
    pub fn get(&self, user_agent: &str) -> Option<ResultFields> {
        let found = self.lock().get(user_agent).cloned();

        self.lookups.fetch_add(1, Ordering::Relaxed);
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    /// Look up a result without touching recency or counters
    pub fn peek(&self, user_agent: &str) -> Option<ResultFields> {
        self.lock().peek(user_agent).cloned()
    }

    /// Insert or replace a result as most-recently-used.
    ///
    /// Returns the key evicted to make room, if any.
    pub fn put(&self, user_agent: &str, result: ResultFields) -> Option<String> {
        let evicted = self
            .lock()
            .push(user_agent.to_string(), result)
            .map(|(key, _)| key)
            .filter(|key| key != user_agent);

        if let Some(key) = &evicted {
            trace!("Evicted cached result for {:?}", key);
        }
        evicted
    }

    pub fn contains(&self, user_agent: &str) -> bool {
        self.lock().contains(user_agent)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
        }
    }
}
