use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock `mutex`, recovering the guard if another thread panicked while
/// holding it. Every critical section in the engine leaves its data valid
/// between statements, so a poisoned value is still a usable one.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
