use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Dependency graph keyed by registration name.
///
/// An edge `a -> b` means the value of `b` was computed while resolving `a`,
/// i.e. `b` is a dependent of `a` and goes stale whenever `a` does.
#[derive(Debug, Clone)]
pub struct DependencyGraph<K> {
    /// Directed graph (dependency -> dependent)
    pub(crate) graph: StableDiGraph<K, ()>,

    /// Key -> NodeIndex mapping for fast lookup
    pub(crate) key_index: HashMap<K, NodeIndex>,
}

impl<K> DependencyGraph<K>
where
    K: Clone + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            key_index: HashMap::new(),
        }
    }

    /// Find node by key
    pub(crate) fn find_node(&self, key: &K) -> Option<NodeIndex> {
        self.key_index.get(key).copied()
    }

    fn node_for(&mut self, key: &K) -> NodeIndex {
        if let Some(idx) = self.find_node(key) {
            return idx;
        }
        let idx = self.graph.add_node(key.clone());
        self.key_index.insert(key.clone(), idx);
        idx
    }

    /// Record that `dependent` resolved `dependency` while computing itself.
    ///
    /// Returns `false` when the edge was already known.
    pub fn add_dependent(&mut self, dependency: &K, dependent: &K) -> bool {
        let from = self.node_for(dependency);
        let to = self.node_for(dependent);
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    /// Direct dependents of `key`
    pub fn dependents(&self, key: &K) -> Vec<K> {
        let Some(idx) = self.find_node(key) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .filter_map(|n| self.graph.node_weight(n).cloned())
            .collect()
    }

    pub fn has_dependents(&self, key: &K) -> bool {
        self.find_node(key).is_some_and(|idx| {
            self.graph
                .neighbors_directed(idx, Direction::Outgoing)
                .next()
                .is_some()
        })
    }

    /// Drop every outgoing edge of `key`. Edges pointing *at* `key` survive:
    /// whatever `key` itself depended on still invalidates it.
    pub fn clear_dependents(&mut self, key: &K) -> usize {
        let Some(idx) = self.find_node(key) else {
            return 0;
        };
        let edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.id())
            .collect();
        for edge in &edges {
            self.graph.remove_edge(*edge);
        }
        if !edges.is_empty() {
            log::trace!("Dropped {} dependent edge(s) of {:?}", edges.len(), key);
        }
        edges.len()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.key_index.contains_key(key)
    }

    /// All edges as `(dependency, dependent)` pairs
    pub fn edges(&self) -> Vec<(K, K)> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = self.graph.edge_endpoints(e)?;
                Some((
                    self.graph.node_weight(from)?.clone(),
                    self.graph.node_weight(to)?.clone(),
                ))
            })
            .collect()
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }
}

impl<K> Default for DependencyGraph<K>
where
    K: Clone + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
