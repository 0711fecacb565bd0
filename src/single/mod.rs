//! `Single` is an `Observable` variant that terminates with exactly one of a
//! success value or an error.
//!
//! It is the natural wrapper for one-shot fallible work, such as a lookup, when
//! the caller wants the same subscription and disposal semantics as for
//! streams of values.

use std::{error::Error, sync::Arc};

use crate::observable::Observable;
use crate::observer::Observer;
use crate::subscription::subscribe::{ErrorFn, Subscribeable, Subscriber, Subscription};

/// A lazy producer of exactly one success value or one error.
///
/// ```no_run
/// use rxlite::{Single, SingleSubscriber};
///
/// let mut lookup = Single::from_fallible(|| "42".parse::<i32>());
///
/// let mut observer = SingleSubscriber::on_success(|v| println!("found {}", v));
/// observer.on_error(|e| eprintln!("lookup failed: {}", e));
///
/// lookup.subscribe(observer);
/// ```
pub struct Single<T> {
    source: Observable<T>,
}

/// Producer-side handle passed to [`Single::create`].
///
/// The first call to [`success`](SingleEmitter::success) or
/// [`error`](SingleEmitter::error) wins; later calls are ignored.
pub struct SingleEmitter<T>(Subscriber<T>);

impl<T> SingleEmitter<T> {
    /// Terminates the subscription with `value`.
    pub fn success(&mut self, value: T) {
        if self.0.is_closed() {
            return;
        }
        self.0.next(value);
        self.0.complete();
    }

    /// Terminates the subscription with `e`.
    pub fn error(&mut self, e: impl Error + Send + Sync + 'static) {
        self.0.error(Arc::new(e));
    }

    /// Returns `true` once a result was emitted or the subscription was disposed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

type SuccessFn<T> = Box<dyn FnMut(T) + Send>;

/// Callbacks for a `Single` subscription. Both are optional.
pub struct SingleSubscriber<T> {
    success_fn: Option<SuccessFn<T>>,
    error_fn: Option<ErrorFn>,
}

impl<T> SingleSubscriber<T> {
    pub fn new(
        success_fn: impl FnMut(T) + 'static + Send,
        error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send,
    ) -> Self {
        SingleSubscriber {
            success_fn: Some(Box::new(success_fn)),
            error_fn: Some(Box::new(error_fn)),
        }
    }

    pub fn on_success(success_fn: impl FnMut(T) + 'static + Send) -> Self {
        SingleSubscriber {
            success_fn: Some(Box::new(success_fn)),
            error_fn: None,
        }
    }

    pub fn on_error(&mut self, error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send) {
        self.error_fn = Some(Box::new(error_fn));
    }
}

impl<T> From<SingleSubscriber<T>> for Subscriber<T> {
    fn from(value: SingleSubscriber<T>) -> Self {
        Subscriber::from_parts(value.success_fn, value.error_fn, None)
    }
}

impl<T> Single<T> {
    /// Creates a `Single` whose producer runs once per subscription.
    ///
    /// A producer that calls neither `success` nor `error` leaves its
    /// subscription live until it is disposed.
    pub fn create(mut producer: impl FnMut(SingleEmitter<T>) + Send + Sync + 'static) -> Self {
        Single {
            source: Observable::create(move |o| producer(SingleEmitter(o))),
        }
    }

    /// Terminates every subscription with `err`.
    pub fn error(err: impl Error + Send + Sync + 'static) -> Self {
        Single {
            source: Observable::error(err),
        }
    }

    /// Calls `factory` on every subscription and subscribes to the `Single` it
    /// returns.
    pub fn defer<F>(mut factory: F) -> Self
    where
        F: FnMut() -> Single<T> + Send + Sync + 'static,
        T: 'static,
    {
        Single {
            source: Observable::defer(move || factory().source),
        }
    }

    /// Runs `operation` on every subscription and emits its outcome.
    pub fn from_fallible<E>(mut operation: impl FnMut() -> Result<T, E> + Send + Sync + 'static) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Single::create(move |mut emitter| match operation() {
            Ok(v) => emitter.success(v),
            Err(e) => emitter.error(e),
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Single<T> {
    /// Succeeds with `value` on every subscription.
    pub fn just(value: T) -> Self {
        Single::create(move |mut emitter| emitter.success(value.clone()))
    }
}

impl<T: 'static> Single<T> {
    /// Subscribes and starts the producer.
    pub fn subscribe(&mut self, s: SingleSubscriber<T>) -> Subscription {
        self.source.subscribe(s.into())
    }
}

impl<T> From<Single<T>> for Observable<T> {
    fn from(value: Single<T>) -> Self {
        value.source
    }
}
