use crate::resolver::Resolver;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased memoized value
pub type Value = Arc<dyn Any + Send + Sync>;

type FactoryFn = dyn Fn(&Resolver<'_>) -> anyhow::Result<Value> + Send + Sync;

/// Deferred computation bound to a key.
///
/// Cloning shares the closure; a derived context copies its parent's bindings
/// this way.
#[derive(Clone)]
pub struct Factory {
    call: Arc<FactoryFn>,
    type_name: &'static str,
}

impl Factory {
    pub fn new<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            call: Arc::new(move |resolver: &Resolver<'_>| {
                f(resolver).map(|value| Arc::new(value) as Value)
            }),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// A constant. Every invocation hands out the same allocation.
    pub fn value<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        let shared: Value = Arc::new(value);
        Self {
            call: Arc::new(move |_: &Resolver<'_>| Ok(shared.clone())),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn invoke(&self, resolver: &Resolver<'_>) -> anyhow::Result<Value> {
        (self.call)(resolver)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
