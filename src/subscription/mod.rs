//! Provides structures and traits related to subscription management.
//!
//! This module includes `Subscriber` for handling observed values, errors, and
//! completions, `Subscription` for controlling the lifetime of one observation,
//! and `CompositeDisposable` for disposing many subscriptions at once.
mod composite;
pub mod subscribe;

pub use composite::CompositeDisposable;

use std::sync::{Mutex, MutexGuard, PoisonError};

// Poisoned locks are recovered, disposal keeps working after a callback panicked.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
