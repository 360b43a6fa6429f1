//! Prediction result cache
//!
//! Keyed by the matched-symptom set, so different phrasings of the same
//! symptoms share one entry. Bounded by insertion-order eviction:
//! - `put` on an over-capacity cache drops the single oldest entry first
//! - the periodic sweep drops the oldest half when over capacity
//!
//! A single mutex guards reads and writes.

use crate::models::PredictionResult;
use crate::vocabulary::SymptomSet;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Size-triggered eviction rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    pub capacity: usize,
}

impl EvictionPolicy {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Checked before an insert, against the size without the new entry
    pub fn evict_before_insert(&self, len: usize) -> bool {
        len > self.capacity
    }

    /// Number of oldest entries the periodic sweep removes
    pub fn sweep_count(&self, len: usize) -> usize {
        if len > self.capacity {
            len / 2
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<SymptomSet, PredictionResult>,
    /// Insertion order, oldest first. Holds exactly the keys of `entries`.
    order: VecDeque<SymptomSet>,
    hits: u64,
    misses: u64,
}

impl CacheInner {
    fn evict_oldest(&mut self) -> Option<SymptomSet> {
        let oldest = self.order.pop_front()?;
        self.entries.remove(&oldest);
        Some(oldest)
    }
}

pub struct ResultCache {
    inner: Mutex<CacheInner>,
    policy: EvictionPolicy,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(EvictionPolicy::new(capacity))
    }

    pub fn with_policy(policy: EvictionPolicy) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            policy,
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Lookup only bumps the hit/miss counters; insertion order is untouched
    pub async fn get(&self, key: &SymptomSet) -> Option<PredictionResult> {
        let mut inner = self.inner.lock().await;
        let found = inner.entries.get(key).cloned();
        if found.is_some() {
            inner.hits += 1;
        } else {
            inner.misses += 1;
        }
        found
    }

    /// Insert or overwrite. An overwritten key keeps its insertion position.
    pub async fn put(&self, key: SymptomSet, result: PredictionResult) {
        let mut inner = self.inner.lock().await;

        if self.policy.evict_before_insert(inner.entries.len()) {
            if let Some(evicted) = inner.evict_oldest() {
                debug!(symptoms = evicted.len(), "Evicted oldest cache entry");
            }
        }

        if inner.entries.insert(key.clone(), result).is_none() {
            inner.order.push_back(key);
        }
    }

    /// Drop the oldest half when over capacity. Returns the number removed.
    pub async fn sweep(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let count = self.policy.sweep_count(inner.entries.len());
        for _ in 0..count {
            inner.evict_oldest();
        }
        count
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        CacheStats {
            entries: inner.entries.len(),
            capacity: self.policy.capacity,
            hits: inner.hits,
            misses: inner.misses,
        }
    }

    /// Run `sweep` every `period` for as long as the runtime lives
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = cache.sweep().await;
                if removed > 0 {
                    info!(removed, "Cache sweep trimmed oldest entries");
                }
            }
        })
    }
}
