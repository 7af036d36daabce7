use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every context of one canister
#[derive(Debug, Default)]
pub(crate) struct ResolutionStats {
    resolutions: AtomicU64,
    cache_hits: AtomicU64,
    factory_calls: AtomicU64,
    factory_failures: AtomicU64,
    registrations: AtomicU64,
    evictions: AtomicU64,
}

impl ResolutionStats {
    pub(crate) fn record_resolution(&self) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_factory_call(&self) {
        self.factory_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_factory_failure(&self) {
        self.factory_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evictions(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            resolutions: self.resolutions.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            factory_calls: self.factory_calls.load(Ordering::Relaxed),
            factory_failures: self.factory_failures.load(Ordering::Relaxed),
            registrations: self.registrations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a canister's activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Successful and failed `resolve` calls, nested ones included
    pub resolutions: u64,

    /// Resolutions answered from the cache
    pub cache_hits: u64,

    /// Factory invocations
    pub factory_calls: u64,

    /// Factory invocations that returned an error
    pub factory_failures: u64,

    /// `register` calls
    pub registrations: u64,

    /// Memoized values dropped by invalidation
    pub evictions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn snapshot_reflects_counters() {
        let stats = ResolutionStats::default();
        stats.record_resolution();
        stats.record_resolution();
        stats.record_cache_hit();
        stats.record_factory_call();
        stats.record_evictions(3);

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                resolutions: 2,
                cache_hits: 1,
                factory_calls: 1,
                evictions: 3,
                ..StatsSnapshot::default()
            }
        );
    }
}
