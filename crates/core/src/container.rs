use crate::config::CanisterConfig;
use crate::context::Context;
use crate::error::{CanisterError, Result};
use crate::factory::{Factory, Value};
use crate::key::Key;
use crate::resolver::Resolver;
use crate::stats::{ResolutionStats, StatsSnapshot};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;

/// Lazy, memoizing, dependency-tracking container.
///
/// Cloning is cheap and every clone addresses the same registrations.
///
/// # Thread safety
///
/// `register` and `resolve` may be called from any number of threads. Each
/// context serializes them behind one reentrant lock, so a factory runs at most
/// once per registration even under contention, and a slow factory stalls every
/// other caller of that context until it returns.
///
/// The context stack (`push_context`, `pop_context`, `with_override`) is shared
/// by all threads. These calls are memory safe, but interleaving them across
/// threads makes "the active context" meaningless; callers must serialize them.
#[derive(Clone)]
pub struct Canister {
    inner: Arc<Shared>,
}

struct Shared {
    config: CanisterConfig,
    contexts: RwLock<ContextStack>,
    stats: ResolutionStats,
}

/// Base context plus the overrides pushed on top of it. The base is a field,
/// not a stack entry, so there is always an active context.
#[derive(Clone)]
struct ContextStack {
    base: Arc<Context>,
    overrides: Vec<Arc<Context>>,
}

impl ContextStack {
    fn new() -> Self {
        Self {
            base: Arc::new(Context::new()),
            overrides: Vec::new(),
        }
    }

    fn current(&self) -> &Arc<Context> {
        self.overrides.last().unwrap_or(&self.base)
    }

    fn depth(&self) -> usize {
        self.overrides.len() + 1
    }
}

impl Canister {
    pub fn new() -> Self {
        Self::with_config(CanisterConfig::default())
    }

    pub fn with_config(config: CanisterConfig) -> Self {
        Self {
            inner: Arc::new(Shared {
                config,
                contexts: RwLock::new(ContextStack::new()),
                stats: ResolutionStats::default(),
            }),
        }
    }

    /// Construct and hand the fresh container to `init`, typically to register
    /// the initial bindings.
    pub fn build(init: impl FnOnce(&Canister)) -> Self {
        Self::build_with_config(CanisterConfig::default(), init)
    }

    pub fn build_with_config(config: CanisterConfig, init: impl FnOnce(&Canister)) -> Self {
        let canister = Self::with_config(config);
        init(&canister);
        canister
    }

    pub fn config(&self) -> &CanisterConfig {
        &self.inner.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub(crate) fn stats_ref(&self) -> &ResolutionStats {
        &self.inner.stats
    }

    /// Bind `key` to `factory` in the active context.
    ///
    /// An existing binding is replaced after its memoized value, and the
    /// memoized values of everything computed from it, have been evicted.
    pub fn register<T, F>(&self, key: impl Into<Key>, factory: F) -> &Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.register_factory(key, Factory::new(factory))
    }

    pub fn register_value<T>(&self, key: impl Into<Key>, value: T) -> &Self
    where
        T: Send + Sync + 'static,
    {
        self.register_factory(key, Factory::value(value))
    }

    pub fn register_factory(&self, key: impl Into<Key>, factory: Factory) -> &Self {
        self.current_context()
            .register(key.into(), factory, &self.inner.stats);
        self
    }

    /// Resolve `key` in the active context, running its factory on first use.
    pub fn resolve<T>(&self, key: impl Into<Key>) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let key = key.into();
        self.current_context()
            .resolve(self, key.clone(), None)?
            .downcast(&key)
    }

    pub fn resolve_value(&self, key: impl Into<Key>) -> Result<Value> {
        let cached = self.current_context().resolve(self, key.into(), None)?;
        Ok(cached.value)
    }

    /// Keys bound in the active context, sorted
    pub fn keys(&self) -> Vec<Key> {
        self.current_context().keys()
    }

    pub fn is_registered(&self, key: impl Into<Key>) -> bool {
        self.current_context().is_registered(&key.into())
    }

    pub fn is_memoized(&self, key: impl Into<Key>) -> bool {
        self.current_context().is_memoized(&key.into())
    }

    /// Direct dependents of `key` recorded in the active context
    pub fn dependents(&self, key: impl Into<Key>) -> Vec<Key> {
        self.current_context().dependents(&key.into())
    }

    pub fn depends_on(&self, dependent: impl Into<Key>, dependency: impl Into<Key>) -> bool {
        self.current_context()
            .depends_on(&dependent.into(), &dependency.into())
    }

    pub fn current_context(&self) -> Arc<Context> {
        self.inner.contexts.read().current().clone()
    }

    /// Number of contexts on the stack, base included
    pub fn context_depth(&self) -> usize {
        self.inner.contexts.read().depth()
    }

    /// Activate a cold copy of the current context.
    pub fn push_context(&self) -> &Self {
        let derived = self.current_context().derive();
        self.push_context_from(derived)
    }

    pub fn push_context_from(&self, context: Context) -> &Self {
        let mut contexts = self.inner.contexts.write();
        contexts.overrides.push(Arc::new(context));
        log::debug!("Pushed context (depth {})", contexts.depth());
        self
    }

    /// Drop the active context. The base context is never popped.
    pub fn pop_context(&self) -> Result<&Self> {
        let mut contexts = self.inner.contexts.write();
        if contexts.overrides.pop().is_none() {
            return Err(CanisterError::InvalidPop);
        }
        log::debug!("Popped context (depth {})", contexts.depth());
        Ok(self)
    }

    /// Run `work` against a temporary cold copy of the current context.
    ///
    /// The stack found on entry is reinstated afterwards, including when
    /// `work` panics, leaves contexts of its own pushed, or pops below its
    /// own frame.
    pub fn with_override<R>(&self, work: impl FnOnce(&Self) -> R) -> R {
        let restore = RestoreStack {
            canister: self,
            saved: self.inner.contexts.read().clone(),
        };
        self.push_context();
        let result = work(self);
        drop(restore);
        result
    }
}

impl Default for Canister {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Canister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canister")
            .field("config", &self.inner.config)
            .field("contexts", &self.context_depth())
            .field("current", &self.current_context())
            .finish()
    }
}

struct RestoreStack<'a> {
    canister: &'a Canister,
    saved: ContextStack,
}

impl Drop for RestoreStack<'_> {
    fn drop(&mut self) {
        let mut contexts = self.canister.inner.contexts.write();
        *contexts = self.saved.clone();
        log::debug!("Restored context depth {}", contexts.depth());
    }
}
