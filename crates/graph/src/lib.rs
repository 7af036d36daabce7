//! # Canister Graph
//!
//! Dependency tracking for lazily resolved registrations.
//!
//! ## Features
//!
//! - **Implicit edges** - an edge is recorded each time one key is resolved while
//!   computing another, no up-front wiring
//! - **Transitive invalidation** - everything reachable from a changed key is found
//!   in one traversal, diamonds included
//! - **Edge reset** - a re-bound key drops its outgoing edges so the new binding
//!   can build a different shape
//!
//! ## Architecture
//!
//! ```text
//! resolve(c) ──> resolve(b) ──> resolve(a)
//!
//! DependencyGraph (petgraph)
//!     ├─ Nodes: keys
//!     └─ Edges: dependency -> dependent
//!
//!        a ──> b ──> c
//!
//! re-register(a)
//!     ├─ transitive_dependents(a) = [b, c]
//!     └─ clear_dependents(a)
//! ```

mod graph;
mod types;

pub use types::DependencyGraph;
