use crate::key::Key;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CanisterError>;

#[derive(Error, Debug)]
pub enum CanisterError {
    #[error("Unregistered key: {0}")]
    UnregisteredKey(Key),

    #[error("Cannot pop the base context")]
    InvalidPop,

    #[error("Cyclic dependency: {}", format_chain(.chain))]
    CyclicDependency { chain: Vec<Key> },

    #[error("Resolution of {key} exceeded the depth limit of {limit}")]
    DepthLimitExceeded { key: Key, limit: usize },

    #[error("Type mismatch for {key}: expected {expected}, found {found}")]
    TypeMismatch {
        key: Key,
        expected: &'static str,
        found: &'static str,
    },

    #[error("No such accessor: {0}")]
    NoSuchAccessor(String),

    #[error("Factory for {key} failed: {source}")]
    Factory {
        key: Key,
        #[source]
        source: anyhow::Error,
    },

    #[error("Config error: {0}")]
    Config(String),
}

impl CanisterError {
    /// Lift a factory failure into the engine's error type.
    ///
    /// Engine errors raised by nested resolutions pass through untouched, so an
    /// unbound key deep in a chain still reports as `UnregisteredKey`.
    pub(crate) fn from_factory(key: &Key, err: anyhow::Error) -> Self {
        match err.downcast::<CanisterError>() {
            Ok(inner) => inner,
            Err(source) => CanisterError::Factory {
                key: key.clone(),
                source,
            },
        }
    }
}

fn format_chain(chain: &[Key]) -> String {
    chain
        .iter()
        .map(Key::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
