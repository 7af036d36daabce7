use crate::error::{CanisterError, Result};
use crate::factory::Value;
use crate::key::Key;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct CachedValue {
    pub(crate) value: Value,
    pub(crate) type_name: &'static str,
}

impl CachedValue {
    pub(crate) fn downcast<T>(self, key: &Key) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let found = self.type_name;
        self.value
            .downcast::<T>()
            .map_err(|_| CanisterError::TypeMismatch {
                key: key.clone(),
                expected: std::any::type_name::<T>(),
                found,
            })
    }
}

enum CacheEntry {
    Ready(CachedValue),
    /// Factory currently running. `stale` is set when an invalidation reaches
    /// the key mid-flight; the result is then handed back but not memoized.
    Pending { stale: bool },
}

/// What happened to a finished computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    Memoized,
    Discarded,
}

/// Memoized values of one context
#[derive(Default)]
pub(crate) struct ResolutionCache {
    entries: HashMap<Key, CacheEntry>,
}

impl ResolutionCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get_ready(&self, key: &Key) -> Option<CachedValue> {
        match self.entries.get(key) {
            Some(CacheEntry::Ready(cached)) => Some(cached.clone()),
            _ => None,
        }
    }

    pub(crate) fn begin(&mut self, key: Key) {
        self.entries.insert(key, CacheEntry::Pending { stale: false });
    }

    pub(crate) fn complete(&mut self, key: &Key, cached: CachedValue) -> Completion {
        match self.entries.get(key) {
            Some(CacheEntry::Pending { stale: false }) => {
                self.entries.insert(key.clone(), CacheEntry::Ready(cached));
                Completion::Memoized
            }
            _ => {
                self.entries.remove(key);
                Completion::Discarded
            }
        }
    }

    /// Drop a pending slot after its factory failed
    pub(crate) fn abandon(&mut self, key: &Key) {
        if matches!(self.entries.get(key), Some(CacheEntry::Pending { .. })) {
            self.entries.remove(key);
        }
    }

    /// Evict `key`. Returns `true` if a memoized value was dropped.
    pub(crate) fn evict(&mut self, key: &Key) -> bool {
        match self.entries.get_mut(key) {
            Some(CacheEntry::Pending { stale }) => {
                *stale = true;
                false
            }
            Some(CacheEntry::Ready(_)) => {
                self.entries.remove(key);
                true
            }
            None => false,
        }
    }

    /// True while the factory for `key` is running
    pub(crate) fn is_pending(&self, key: &Key) -> bool {
        matches!(self.entries.get(key), Some(CacheEntry::Pending { .. }))
    }

    pub(crate) fn is_memoized(&self, key: &Key) -> bool {
        matches!(self.entries.get(key), Some(CacheEntry::Ready(_)))
    }

    pub(crate) fn memoized_len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, CacheEntry::Ready(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cached(value: u32) -> CachedValue {
        CachedValue {
            value: Arc::new(value),
            type_name: "u32",
        }
    }

    #[test]
    fn completes_pending_slot() {
        let mut cache = ResolutionCache::new();
        let key = Key::from("a");
        cache.begin(key.clone());
        assert!(cache.get_ready(&key).is_none());
        assert!(cache.is_pending(&key));
        assert_eq!(cache.complete(&key, cached(1)), Completion::Memoized);
        assert!(cache.is_memoized(&key));
        assert_eq!(cache.memoized_len(), 1);
    }

    #[test]
    fn eviction_mid_flight_discards_result() {
        let mut cache = ResolutionCache::new();
        let key = Key::from("a");
        cache.begin(key.clone());
        assert!(!cache.evict(&key), "nothing memoized yet");
        assert_eq!(cache.complete(&key, cached(1)), Completion::Discarded);
        assert!(cache.get_ready(&key).is_none());
    }

    #[test]
    fn downcast_reports_both_types() {
        let key = Key::from("port");
        assert_eq!(*cached(8080).downcast::<u32>(&key).unwrap(), 8080);
        let err = cached(8080).downcast::<String>(&key).unwrap_err();
        assert!(matches!(
            err,
            CanisterError::TypeMismatch { found: "u32", .. }
        ));
    }

    #[test]
    fn abandon_leaves_ready_values_alone() {
        let mut cache = ResolutionCache::new();
        let key = Key::from("a");
        cache.begin(key.clone());
        cache.complete(&key, cached(7));
        cache.abandon(&key);
        assert!(cache.is_memoized(&key));

        let failing = Key::from("b");
        cache.begin(failing.clone());
        cache.abandon(&failing);
        assert_eq!(cache.memoized_len(), 1);
        assert!(cache.evict(&key));
        assert_eq!(cache.memoized_len(), 0);
    }
}
