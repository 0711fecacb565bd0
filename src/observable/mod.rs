//! The `observable` module provides the building blocks for creating cold
//! observables: lazy producers that do nothing until subscribed and run their
//! production again for every subscription.

use std::{error::Error, sync::Arc, time::Duration};

use tracing::trace;

use crate::errors::{ObservableError, Result};
use crate::observer::Observer;
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription, SubscriptionState};

mod interval;

/// The `Observable` struct represents a lazy source of values followed by an
/// optional terminal signal.
///
/// An `Observable` only describes how to produce events. It holds no subscriber
/// state, and each call to `subscribe` runs the production from the start for
/// the new subscriber.
///
/// # Example: synchronous `Observable`
///
/// ```no_run
/// use rxlite::subscribe::Subscriber;
/// use rxlite::{Observable, Subscribeable};
///
/// let mut observable = Observable::of([1, 2, 3]);
///
/// let mut observer = Subscriber::on_next(|v| println!("{}", v));
/// observer.on_complete(|| println!("Completed"));
///
/// // Observables are cold, nothing is emitted before this call.
/// observable.subscribe(observer);
/// ```
///
/// # Example: custom producer with teardown
///
/// The producer passed to [`Observable::new`] returns a `Subscription` that
/// describes what to release when the observation ends, either by a terminal
/// signal or by disposal.
///
/// ```no_run
/// use std::time::Duration;
///
/// use rxlite::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic};
/// use rxlite::{Disposable, Observable, Observer, Subscribeable};
///
/// let mut observable = Observable::new(|mut o| {
///     let (tx, rx) = std::sync::mpsc::channel::<()>();
///
///     let join_handle = std::thread::spawn(move || {
///         let mut i = 0;
///         // Stop emitting once the teardown below signals or drops the sender.
///         while let Err(std::sync::mpsc::RecvTimeoutError::Timeout) =
///             rx.recv_timeout(Duration::from_millis(10))
///         {
///             o.next(i);
///             i += 1;
///         }
///     });
///
///     Subscription::new(
///         UnsubscribeLogic::Logic(Box::new(move || {
///             let _ = tx.send(());
///         })),
///         SubscriptionHandle::JoinThread(join_handle),
///     )
/// });
///
/// let subscription = observable.subscribe(Subscriber::on_next(|v: i32| println!("{}", v)));
/// std::thread::sleep(Duration::from_millis(100));
///
/// subscription.dispose();
/// ```
pub struct Observable<T> {
    subscribe_fn: Box<dyn FnMut(Subscriber<T>) -> Subscription + Send + Sync>,
}

impl<T> Observable<T> {
    /// Creates a new `Observable` with the provided subscribe function.
    ///
    /// The subscribe function runs once per subscription. It drives the
    /// `Subscriber` it receives and returns a `Subscription` holding the teardown
    /// for resources allocated during production, and optionally a handle to
    /// await background work.
    pub fn new(sf: impl FnMut(Subscriber<T>) -> Subscription + Send + Sync + 'static) -> Self {
        Observable {
            subscribe_fn: Box::new(sf),
        }
    }

    /// Creates an `Observable` from an emitter-style producer.
    ///
    /// The producer is called with a fresh `Subscriber` for every subscription and
    /// drives the sequence with `next`, `error` and `complete`. Calls made after a
    /// terminal signal are ignored.
    ///
    /// A producer that never calls `complete` or `error` leaves its subscription
    /// live until it is disposed.
    pub fn create(mut producer: impl FnMut(Subscriber<T>) + Send + Sync + 'static) -> Self {
        Observable::new(move |o| {
            producer(o);
            Subscription::empty()
        })
    }

    /// Emits nothing and completes immediately.
    #[must_use]
    pub fn empty() -> Self {
        Observable::create(|mut o| o.complete())
    }

    /// Emits nothing and never reaches a terminal signal.
    ///
    /// The returned subscription stays live until it is disposed.
    #[must_use]
    pub fn never() -> Self {
        Observable::new(|_| Subscription::empty())
    }

    /// Emits no values and terminates every subscription with `err`.
    pub fn error(err: impl Error + Send + Sync + 'static) -> Self {
        let err: Arc<dyn Error + Send + Sync> = Arc::new(err);
        Observable::create(move |mut o| o.error(Arc::clone(&err)))
    }

    /// Calls `factory` on every subscription and subscribes to the `Observable`
    /// it returns.
    ///
    /// The factory runs synchronously inside `subscribe`, before any emission,
    /// so state owned by the factory closure can change what each subscription
    /// observes.
    pub fn defer<F>(mut factory: F) -> Self
    where
        F: FnMut() -> Observable<T> + Send + Sync + 'static,
        T: 'static,
    {
        Observable::new(move |o| {
            let mut inner = factory();
            inner.subscribe(o)
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Emits each value in argument order, then completes.
    pub fn of<const N: usize>(values: [T; N]) -> Self {
        Observable::from_sequence(values)
    }

    /// Emits a single value, then completes.
    pub fn just(value: T) -> Self {
        Observable::create(move |mut o| {
            o.next(value.clone());
            o.complete();
        })
    }

    /// Emits every element of `sequence` in order, then completes.
    ///
    /// The sequence is collected when the `Observable` is created and replayed
    /// for every subscription.
    pub fn from_sequence(sequence: impl IntoIterator<Item = T>) -> Self {
        let values: Vec<T> = sequence.into_iter().collect();
        Observable::create(move |mut o| {
            for v in &values {
                if o.is_closed() {
                    return;
                }
                o.next(v.clone());
            }
            o.complete();
        })
    }
}

impl<T: Clone + Send + Sync + 'static> FromIterator<T> for Observable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Observable::from_sequence(iter)
    }
}

impl Observable<i64> {
    /// Emits `count` consecutive integers starting at `start`, then completes.
    ///
    /// # Errors
    ///
    /// Fails at the call, not at subscription time, if `count` is negative or
    /// the last value would overflow `i64`.
    pub fn range(start: i64, count: i64) -> Result<Self> {
        if count < 0 {
            return Err(ObservableError::NegativeCount { count });
        }
        if count > 0 && start.checked_add(count - 1).is_none() {
            return Err(ObservableError::RangeOverflow { start, count });
        }
        Ok(Observable::create(move |mut o| {
            for v in (0..count).map(|i| start + i) {
                if o.is_closed() {
                    return;
                }
                o.next(v);
            }
            o.complete();
        }))
    }
}

impl Observable<u64> {
    /// Emits `0, 1, 2, ...` every `period` and never completes.
    ///
    /// Inside a Tokio runtime the ticks come from a Tokio task, otherwise from an
    /// OS thread. The subscription has to be disposed to stop the worker. Periods
    /// shorter than one millisecond are raised to one millisecond.
    #[must_use]
    pub fn interval(period: Duration) -> Self {
        Observable::new(move |o| interval::spawn(period, o))
    }
}

impl<T: 'static> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&mut self, mut v: Subscriber<Self::ObsType>) -> Subscription {
        let state = SubscriptionState::new();
        v.attach(&state);
        trace!(subscription = state.id(), "subscribing");
        let teardown = (self.subscribe_fn)(v);
        Subscription::from_teardown(state, teardown)
    }
}
