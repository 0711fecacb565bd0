use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, trace};

use super::lock;
use super::subscribe::{Disposable, Subscription};

/// An unordered, reusable container of subscriptions with bulk disposal.
///
/// `add` and `remove` are O(1) amortized, keyed by [`Subscription::id`]. The
/// internal lock is held only while the map changes; subscriptions are always
/// disposed after the lock is released, so a teardown may call back into the
/// same composite.
///
/// After [`dispose`](CompositeDisposable::dispose) the composite is empty and new
/// subscriptions can be added to it again.
///
/// Dropping a composite does not dispose its members. Call `dispose` first if
/// they should end with it.
///
/// ```no_run
/// use rxlite::{CompositeDisposable, Observable, Subscribeable};
/// use rxlite::subscribe::Subscriber;
///
/// let composite = CompositeDisposable::new();
///
/// composite.add(Observable::<i32>::never().subscribe(Subscriber::empty()));
/// composite.add(Observable::<i32>::never().subscribe(Subscriber::empty()));
///
/// // Disposes both subscriptions and leaves the composite empty.
/// composite.dispose();
/// assert!(composite.is_empty());
/// ```
#[derive(Default)]
pub struct CompositeDisposable {
    subscriptions: Mutex<HashMap<u64, Subscription>>,
}

impl CompositeDisposable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscription. Returns `false` without storing it if the
    /// subscription is already disposed.
    pub fn add(&self, subscription: Subscription) -> bool {
        if subscription.is_disposed() {
            trace!(subscription = subscription.id(), "skipping disposed subscription");
            return false;
        }
        lock(&self.subscriptions).insert(subscription.id(), subscription);
        true
    }

    /// Removes the subscription and disposes it. Returns `false` if it was not
    /// part of this composite.
    pub fn remove(&self, subscription: &Subscription) -> bool {
        let removed = lock(&self.subscriptions).remove(&subscription.id());
        match removed {
            Some(s) => {
                s.dispose();
                true
            }
            None => false,
        }
    }

    /// Removes the subscription without disposing it.
    pub fn delete(&self, subscription: &Subscription) -> bool {
        lock(&self.subscriptions).remove(&subscription.id()).is_some()
    }

    /// Disposes every held subscription exactly once and clears the composite.
    pub fn dispose(&self) {
        let drained = std::mem::take(&mut *lock(&self.subscriptions));
        if drained.is_empty() {
            return;
        }
        debug!(count = drained.len(), "disposing composite");
        for s in drained.into_values() {
            s.dispose();
        }
    }

    /// Returns the number of held subscriptions.
    pub fn len(&self) -> usize {
        lock(&self.subscriptions).len()
    }

    /// Returns `true` if no subscriptions are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
