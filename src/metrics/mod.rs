//! Cache counters and their exported snapshot

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of a cache's counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups served from the store, on the optimistic read or on the re-check
    pub hits: u64,
    /// Lookups that reached the resolver
    pub misses: u64,
    /// Resolver calls that succeeded and were committed
    pub resolutions: u64,
    /// Resolver calls that failed
    pub failures: u64,
    /// Entries currently in the store
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served without calling the resolver
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    /// Render the snapshot in the Prometheus text exposition format
    pub fn to_prometheus(&self) -> String {
        let mut data = String::new();

        data.push_str(&format!(
            "# HELP zonecache_hits_total Lookups served from the cache\n# TYPE zonecache_hits_total counter\nzonecache_hits_total {}\n",
            self.hits
        ));

        data.push_str(&format!(
            "# HELP zonecache_misses_total Lookups that called the resolver\n# TYPE zonecache_misses_total counter\nzonecache_misses_total {}\n",
            self.misses
        ));

        data.push_str(&format!(
            "# HELP zonecache_resolutions_total Successful resolver calls\n# TYPE zonecache_resolutions_total counter\nzonecache_resolutions_total {}\n",
            self.resolutions
        ));

        data.push_str(&format!(
            "# HELP zonecache_failures_total Failed resolver calls\n# TYPE zonecache_failures_total counter\nzonecache_failures_total {}\n",
            self.failures
        ));

        data.push_str(&format!(
            "# HELP zonecache_entries Cached locations\n# TYPE zonecache_entries gauge\nzonecache_entries {}\n",
            self.entries
        ));

        data
    }
}

/// Lock-free counters updated on every lookup.
///
/// When disabled every `record_*` call is a no-op and snapshots report zeros.
#[derive(Debug)]
pub(crate) struct CacheCounters {
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    resolutions: AtomicU64,
    failures: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            resolutions: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_hit(&self) {
        if self.enabled {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_miss(&self) {
        if self.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_resolution(&self, ok: bool) {
        if !self.enabled {
            return;
        }
        if ok {
            self.resolutions.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self, entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            resolutions: self.resolutions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            entries,
        }
    }
}
