use crate::cache::{CachedValue, Completion, ResolutionCache};
use crate::config::CanisterConfig;
use crate::container::Canister;
use crate::error::{CanisterError, Result};
use crate::factory::Factory;
use crate::key::Key;
use crate::lock::EngineLock;
use crate::registry::Registry;
use crate::resolver::Resolver;
use crate::stack::ResolutionStack;
use crate::stats::ResolutionStats;
use canister_graph::DependencyGraph;

/// One layer of the context stack: bindings, memoized values and the
/// dependency edges discovered while resolving them.
///
/// Everything inside is guarded by a single reentrant lock, so `register` and
/// `resolve` are safe to call from any thread.
pub struct Context {
    state: EngineLock<ContextState>,
}

struct ContextState {
    registry: Registry,
    cache: ResolutionCache,
    graph: DependencyGraph<Key>,
}

enum Lookup {
    Hit(CachedValue),
    Miss(Factory),
}

impl ContextState {
    fn new(registry: Registry) -> Self {
        Self {
            registry,
            cache: ResolutionCache::new(),
            graph: DependencyGraph::new(),
        }
    }

    /// Evict `key` and everything computed from it, then forget the edges
    /// leaving `key`. Only the re-bound key loses its edges; dependents keep
    /// theirs, since their own inputs are unchanged.
    fn invalidate(&mut self, key: &Key) -> usize {
        let dependents = self.graph.transitive_dependents(key);
        let mut evicted = usize::from(self.cache.evict(key));
        for dependent in &dependents {
            if self.cache.evict(dependent) {
                evicted += 1;
            }
        }
        self.graph.clear_dependents(key);

        log::debug!(
            "Invalidated {key} and {} dependent(s), {evicted} cached value(s) dropped",
            dependents.len()
        );
        evicted
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    fn with_registry(registry: Registry) -> Self {
        Self {
            state: EngineLock::new(ContextState::new(registry)),
        }
    }

    /// Child context sharing this one's bindings but starting cold: no
    /// memoized values, no dependency edges.
    pub fn derive(&self) -> Self {
        let registry = self.state.with(|state| state.registry.duplicate());
        Self::with_registry(registry)
    }

    pub fn keys(&self) -> Vec<Key> {
        self.state.with(|state| state.registry.keys())
    }

    pub fn len(&self) -> usize {
        self.state.with(|state| state.registry.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_registered(&self, key: &Key) -> bool {
        self.state.with(|state| state.registry.contains(key.as_str()))
    }

    pub fn is_memoized(&self, key: &Key) -> bool {
        self.state.with(|state| state.cache.is_memoized(key))
    }

    pub fn memoized_len(&self) -> usize {
        self.state.with(|state| state.cache.memoized_len())
    }

    /// Keys that resolved `key` while computing themselves
    pub fn dependents(&self, key: &Key) -> Vec<Key> {
        let mut dependents = self.state.with(|state| state.graph.dependents(key));
        dependents.sort();
        dependents
    }

    /// True if `dependent` was computed, directly or not, from `dependency`
    pub fn depends_on(&self, dependent: &Key, dependency: &Key) -> bool {
        self.state
            .with(|state| state.graph.depends_on(dependent, dependency))
    }

    pub(crate) fn register(&self, key: Key, factory: Factory, stats: &ResolutionStats) {
        let _guard = self.state.lock();
        let (replaced, evicted) = self.state.with(|state| {
            let replaced = state.registry.contains(key.as_str());
            let evicted = if replaced { state.invalidate(&key) } else { 0 };
            state.registry.insert(key.clone(), factory);
            (replaced, evicted)
        });

        stats.record_registration();
        stats.record_evictions(evicted);
        if replaced {
            log::debug!("Re-registered {key}");
        } else {
            log::debug!("Registered {key}");
        }
    }

    pub(crate) fn resolve(
        &self,
        canister: &Canister,
        key: Key,
        parent: Option<&ResolutionStack<'_>>,
    ) -> Result<CachedValue> {
        let config = canister.config();
        let stats = canister.stats_ref();
        stats.record_resolution();

        let _guard = self.state.lock();

        if let Some(parent) = parent {
            if config.detect_cycles && parent.contains(&key) {
                let mut chain = parent.chain();
                chain.push(key);
                return Err(CanisterError::CyclicDependency { chain });
            }
            if parent.depth() >= config.max_depth {
                return Err(CanisterError::DepthLimitExceeded {
                    key,
                    limit: config.max_depth,
                });
            }
        }

        let lookup = self.state.with(|state| {
            let Some(factory) = state.registry.get(&key).cloned() else {
                return Err(CanisterError::UnregisteredKey(key.clone()));
            };
            // The lock is held while a factory runs, so a pending slot seen here
            // belongs to this thread: the key re-entered itself through a handle
            // that carries no resolution chain.
            if state.cache.is_pending(&key) {
                return Err(reentry_error(config, parent, &key));
            }
            if let Some(parent) = parent {
                if state.graph.add_dependent(&key, parent.key()) {
                    log::trace!("Recorded {} as dependent of {key}", parent.key());
                }
            }
            if let Some(cached) = state.cache.get_ready(&key) {
                return Ok(Lookup::Hit(cached));
            }
            state.cache.begin(key.clone());
            Ok(Lookup::Miss(factory))
        })?;

        let factory = match lookup {
            Lookup::Hit(cached) => {
                stats.record_cache_hit();
                log::trace!("Cache hit for {key}");
                return Ok(cached);
            }
            Lookup::Miss(factory) => factory,
        };

        let frame = match parent {
            Some(parent) => ResolutionStack::push(parent, key.clone()),
            None => ResolutionStack::root(key.clone()),
        };
        let pending = PendingSlot {
            context: self,
            key: &key,
            armed: true,
        };
        let resolver = Resolver::new(canister, self, &frame);

        stats.record_factory_call();
        log::debug!("Invoking factory for {key} (depth {})", frame.depth());
        let value = match factory.invoke(&resolver) {
            Ok(value) => value,
            Err(err) => {
                stats.record_factory_failure();
                return Err(CanisterError::from_factory(&key, err));
            }
        };
        pending.disarm();

        let cached = CachedValue {
            value,
            type_name: factory.type_name(),
        };
        let completion = self
            .state
            .with(|state| state.cache.complete(&key, cached.clone()));
        if completion == Completion::Discarded {
            log::warn!("Not memoizing {key}: it was invalidated while its factory ran");
        }
        Ok(cached)
    }
}

fn reentry_error(
    config: &CanisterConfig,
    parent: Option<&ResolutionStack<'_>>,
    key: &Key,
) -> CanisterError {
    if !config.detect_cycles {
        return CanisterError::DepthLimitExceeded {
            key: key.clone(),
            limit: config.max_depth,
        };
    }
    let mut chain = parent.map(|frame| frame.chain()).unwrap_or_default();
    if !chain.contains(key) {
        chain.insert(0, key.clone());
    }
    chain.push(key.clone());
    CanisterError::CyclicDependency { chain }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.state.with(|state| {
            f.debug_struct("Context")
                .field("keys", &state.registry.len())
                .field("memoized", &state.cache.memoized_len())
                .field("edges", &state.graph.edge_count())
                .finish()
        })
    }
}

/// Clears a pending cache slot if the factory errors or unwinds
struct PendingSlot<'a> {
    context: &'a Context,
    key: &'a Key,
    armed: bool,
}

impl PendingSlot<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.context
                .state
                .with(|state| state.cache.abandon(self.key));
        }
    }
}
