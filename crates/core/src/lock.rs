use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::cell::RefCell;

/// Reentrant, per-context engine lock.
///
/// The owning thread may re-acquire freely (a factory resolving its own
/// dependencies); any other thread blocks until the outermost guard drops.
/// Contention across threads therefore fully serializes.
///
/// State is reached through [`EngineLock::with`], which must never call back
/// into user code: the `RefCell` borrow would otherwise still be held when a
/// factory re-enters the engine.
pub(crate) struct EngineLock<T> {
    inner: ReentrantMutex<RefCell<T>>,
}

pub(crate) type EngineGuard<'a, T> = ReentrantMutexGuard<'a, RefCell<T>>;

impl<T> EngineLock<T> {
    pub(crate) fn new(state: T) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(state)),
        }
    }

    /// Hold the lock across a whole operation (including factory calls)
    pub(crate) fn lock(&self) -> EngineGuard<'_, T> {
        self.inner.lock()
    }

    /// Short critical section over the state
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let guard = self.inner.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }
}
