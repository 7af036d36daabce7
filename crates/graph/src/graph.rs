use crate::types::DependencyGraph;
use petgraph::algo::has_path_connecting;
use petgraph::Direction;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

impl<K> DependencyGraph<K>
where
    K: Clone + Eq + Hash + Debug,
{
    /// Every key computed, directly or transitively, from `key`.
    ///
    /// Each dependent appears once even when reachable along several paths
    /// (diamonds). `key` itself is never part of the result. Order is unspecified.
    pub fn transitive_dependents(&self, key: &K) -> Vec<K> {
        let Some(start) = self.find_node(key) else {
            return Vec::new();
        };

        let mut visited = HashSet::new();
        visited.insert(start);
        let mut result = Vec::new();
        let mut stack = vec![start];

        while let Some(current) = stack.pop() {
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if !visited.insert(next) {
                    continue;
                }
                if let Some(weight) = self.graph.node_weight(next) {
                    result.push(weight.clone());
                }
                stack.push(next);
            }
        }

        result
    }

    /// True if `dependent` was computed (possibly transitively) from `dependency`
    pub fn depends_on(&self, dependent: &K, dependency: &K) -> bool {
        let (Some(from), Some(to)) = (self.find_node(dependency), self.find_node(dependent)) else {
            return false;
        };
        from != to && has_path_connecting(&self.graph, from, to, None)
    }
}
