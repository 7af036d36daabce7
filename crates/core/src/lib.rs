//! # Canister
//!
//! Lazy, memoized, dependency-tracking container.
//!
//! ## Features
//!
//! - **Out-of-order declaration** - register factories in any order, they only
//!   run when first resolved
//! - **Memoization** - each factory runs at most once per registration
//! - **Automatic invalidation** - re-registering a key evicts its cached value and
//!   the cached values of everything that was computed from it
//! - **Override contexts** - temporarily shadow registrations, then revert
//! - **Thread safety** - one reentrant lock per context; factories may resolve
//!   their own dependencies without deadlocking
//!
//! ## Architecture
//!
//! ```text
//! Canister
//!     │
//!     └──> Context stack (base + overrides)
//!            │
//!            ├─ Registry           key -> factory
//!            ├─ ResolutionCache    key -> memoized value
//!            ├─ DependencyGraph    key -> dependents
//!            └─ EngineLock         reentrant, per context
//!
//! resolve(c)
//!     └─> factory(c) ──> resolver.resolve(b)   records edge b -> c
//!                            └─> factory(b) ──> resolver.resolve(a)
//! ```
//!
//! ## Example
//!
//! ```
//! use canister_core::Canister;
//!
//! # fn main() -> canister_core::Result<()> {
//! let canister = Canister::new();
//! canister
//!     .register("greeting", |c| Ok(format!("{}, world", c.resolve::<String>("word")?)))
//!     .register_value("word", String::from("hello"));
//!
//! assert_eq!(*canister.resolve::<String>("greeting")?, "hello, world");
//!
//! canister.register_value("word", String::from("goodbye"));
//! assert_eq!(*canister.resolve::<String>("greeting")?, "goodbye, world");
//! # Ok(())
//! # }
//! ```

mod accessor;
mod cache;
mod config;
mod container;
mod context;
mod error;
mod factory;
mod key;
mod lock;
mod registry;
mod resolver;
mod stack;
mod stats;

pub use accessor::Accessor;
pub use config::CanisterConfig;
pub use container::Canister;
pub use context::Context;
pub use error::{CanisterError, Result};
pub use factory::{Factory, Value};
pub use key::Key;
pub use resolver::Resolver;
pub use stack::ResolutionStack;
pub use stats::StatsSnapshot;
