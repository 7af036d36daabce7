use crate::container::Canister;
use crate::context::Context;
use crate::error::Result;
use crate::factory::Value;
use crate::key::Key;
use crate::stack::ResolutionStack;
use std::any::Any;
use std::sync::Arc;

/// The container as seen by a running factory.
///
/// Every key resolved through a `Resolver` is recorded as a dependency of the
/// key being computed, and resolution stays pinned to the context the outer
/// request started in.
pub struct Resolver<'a> {
    canister: &'a Canister,
    context: &'a Context,
    frame: &'a ResolutionStack<'a>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        canister: &'a Canister,
        context: &'a Context,
        frame: &'a ResolutionStack<'a>,
    ) -> Self {
        Self {
            canister,
            context,
            frame,
        }
    }

    /// Key whose factory is running
    pub fn key(&self) -> &Key {
        self.frame.key()
    }

    pub fn depth(&self) -> usize {
        self.frame.depth()
    }

    /// Keys from the outermost request down to the current one
    pub fn chain(&self) -> Vec<Key> {
        self.frame.chain()
    }

    /// Owning container. Clone it to hand the container to other threads;
    /// resolutions made through it are top-level and record no edges.
    pub fn canister(&self) -> &Canister {
        self.canister
    }

    pub fn resolve<T>(&self, key: impl Into<Key>) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let key = key.into();
        self.context
            .resolve(self.canister, key.clone(), Some(self.frame))?
            .downcast(&key)
    }

    pub fn resolve_value(&self, key: impl Into<Key>) -> Result<Value> {
        let cached = self
            .context
            .resolve(self.canister, key.into(), Some(self.frame))?;
        Ok(cached.value)
    }

    pub fn keys(&self) -> Vec<Key> {
        self.context.keys()
    }

    pub fn is_registered(&self, key: impl Into<Key>) -> bool {
        self.context.is_registered(&key.into())
    }
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("key", self.key())
            .field("depth", &self.depth())
            .finish()
    }
}
