//! Name-based access sugar over [`Canister::resolve`].
//!
//! Callers that look values up by an arbitrary accessor name (a config key, a
//! scripting bridge, a template variable) go through [`Accessor`]. The only
//! difference from plain resolution is error translation: asking for a name
//! that is not bound reports [`CanisterError::NoSuchAccessor`], so generic
//! introspection can tell "not an accessor" apart from "an accessor whose
//! factory failed".

use crate::container::Canister;
use crate::error::{CanisterError, Result};
use crate::resolver::Resolver;
use std::any::Any;
use std::sync::Arc;

pub trait Accessor {
    /// True iff `name` is bound in the active context
    fn responds_to(&self, name: &str) -> bool;

    /// Resolve `name`, reporting an unbound `name` as `NoSuchAccessor`.
    ///
    /// A key missing further down the dependency chain is reported the way the
    /// factory that asked for it looked it up.
    fn access<T>(&self, name: &str) -> Result<Arc<T>>
    where
        T: Any + Send + Sync;
}

impl Accessor for Canister {
    fn responds_to(&self, name: &str) -> bool {
        self.is_registered(name)
    }

    fn access<T>(&self, name: &str) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.resolve(name).map_err(|err| translate(name, err))
    }
}

impl Accessor for Resolver<'_> {
    fn responds_to(&self, name: &str) -> bool {
        self.is_registered(name)
    }

    fn access<T>(&self, name: &str) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.resolve(name).map_err(|err| translate(name, err))
    }
}

fn translate(name: &str, err: CanisterError) -> CanisterError {
    match err {
        CanisterError::UnregisteredKey(key) if key.as_str() == name => {
            CanisterError::NoSuchAccessor(name.to_string())
        }
        other => other,
    }
}
