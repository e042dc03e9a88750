//! Memoization of per-cluster sub-metrics.
//!
//! Within one AHCA step all candidates share every cluster except the merged
//! one, and MOECA genomes keep rediscovering the same clusters, so per-cluster
//! contributions are cached under their canonical member key. The cache is
//! safe for concurrent reads and writes and clears itself once its estimated
//! footprint passes the configured limit.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default memory threshold before the cache is dropped (256 MiB)
pub const DEFAULT_MEMORY_LIMIT: usize = 256 * 1024 * 1024;

/// Estimated bookkeeping per entry on top of the key bytes
const ENTRY_OVERHEAD: usize = 48;

/// Per-cluster quantities worth memoizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubMetric {
    IntraData,
    InterData,
    InterCoupling,
    ExterCoupling,
    InterCohesion,
    CarvalhoCohesion,
    OutgoingCoupling,
    OutgoingOverhead,
}

/// Snapshot of cache activity for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
    pub approximate_bytes: usize,
    pub clears: usize,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Thread-safe, self-bounding cache of per-cluster results.
#[derive(Debug)]
pub struct OptimizationData {
    entries: DashMap<(SubMetric, String), f64>,
    approximate_bytes: AtomicUsize,
    memory_limit: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
    clears: AtomicUsize,
}

impl Default for OptimizationData {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationData {
    pub fn new() -> Self {
        Self::with_memory_limit(DEFAULT_MEMORY_LIMIT)
    }

    pub fn with_memory_limit(memory_limit: usize) -> Self {
        Self {
            entries: DashMap::new(),
            approximate_bytes: AtomicUsize::new(0),
            memory_limit,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
        }
    }

    /// Return the cached value for `(metric, key)` or compute and store it.
    pub fn get_or_compute<F>(&self, metric: SubMetric, key: String, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        let cache_key = (metric, key);
        if let Some(value) = self.entries.get(&cache_key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return *value;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute();
        self.insert(cache_key, value);
        value
    }

    fn insert(&self, key: (SubMetric, String), value: f64) {
        let size = key.1.len() + ENTRY_OVERHEAD;
        if self.entries.insert(key, value).is_none() {
            let total = self.approximate_bytes.fetch_add(size, Ordering::Relaxed) + size;
            if total > self.memory_limit {
                self.clear_for_memory(total);
            }
        }
    }

    fn clear_for_memory(&self, total: usize) {
        log::debug!(
            "Optimization cache reached ~{} bytes (limit {}), clearing {} entries",
            total,
            self.memory_limit,
            self.entries.len()
        );
        self.clear();
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.approximate_bytes.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
            approximate_bytes: self.approximate_bytes.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
        }
    }
}
