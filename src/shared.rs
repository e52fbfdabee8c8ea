// src/shared.rs

// pieces shared by the wrappers

// dependencies
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The wrapped callback. `A` is the argument tuple forwarded on every invocation.
pub(crate) type Callback<A> = Arc<dyn Fn(A) + Send + Sync>;

// callbacks never run under a wrapper lock, so a poisoned lock still holds consistent state
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
