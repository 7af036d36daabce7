use crate::factory::Factory;
use crate::key::Key;
use std::collections::HashMap;

/// Key -> factory bindings of one context
#[derive(Debug, Clone, Default)]
pub(crate) struct Registry {
    bindings: HashMap<Key, Factory>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bind `factory`, returning the binding it displaced
    pub(crate) fn insert(&mut self, key: Key, factory: Factory) -> Option<Factory> {
        self.bindings.insert(key, factory)
    }

    pub(crate) fn get(&self, key: &Key) -> Option<&Factory> {
        self.bindings.get(key)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// Bound keys, sorted for stable output
    pub(crate) fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.bindings.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Shallow copy: factories are shared, nothing else carries over
    pub(crate) fn duplicate(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_reports_displaced_binding() {
        let mut registry = Registry::new();
        assert!(registry
            .insert(Key::from("a"), Factory::value(1u32))
            .is_none());
        let displaced = registry.insert(Key::from("a"), Factory::value("one"));
        assert_eq!(displaced.map(|f| f.type_name()), Some("u32"));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("a"));
    }

    #[test]
    fn keys_are_sorted() {
        let mut registry = Registry::new();
        for name in ["foo", "alice", "bar"] {
            registry.insert(Key::from(name), Factory::value(()));
        }
        assert_eq!(
            registry.keys(),
            vec![Key::from("alice"), Key::from("bar"), Key::from("foo")]
        );
    }

    #[test]
    fn duplicate_is_independent() {
        let mut registry = Registry::new();
        registry.insert(Key::from("a"), Factory::value(1u8));
        let mut copy = registry.duplicate();
        copy.insert(Key::from("b"), Factory::value(2u8));
        assert_eq!(registry.len(), 1);
        assert_eq!(copy.len(), 2);
    }
}
