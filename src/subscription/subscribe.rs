use std::{
    error::Error,
    fmt,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    thread::{self, JoinHandle as ThreadJoinHandle, ThreadId},
};

use tokio::runtime;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::lock;
use crate::errors::{ObservableError, Result};
use crate::observer::Observer;

/// A trait for types that can be subscribed to, allowing consumers to receive
/// values emitted by an observable stream.
pub trait Subscribeable {
    /// The type of items emitted by the observable stream.
    type ObsType;

    /// Subscribes to the observable stream and starts its production.
    ///
    /// Nothing is produced before this call. Every call runs the production
    /// again for the new `Subscriber`, independently of earlier subscriptions.
    ///
    /// The returned `Subscription` bounds the lifetime of this observation and
    /// can be disposed from any thread.
    fn subscribe(&mut self, s: Subscriber<Self::ObsType>) -> Subscription;
}

/// A trait for types that can be unsubscribed, consuming the handle.
pub trait Unsubscribeable {
    /// Unsubscribes from a subscription and releases associated resources.
    ///
    /// This is the consuming form of [`Disposable::dispose`]. Other clones of the
    /// same `Subscription` observe the disposal as well.
    fn unsubscribe(self);
}

/// A handle whose resources can be released at most once.
///
/// Disposal is idempotent: disposing an already disposed or already terminated
/// handle does nothing.
pub trait Disposable {
    /// Releases the resources held by this handle and stops any further
    /// callback delivery.
    ///
    /// If a callback of the subscription is running on another thread, this
    /// waits for it to return, so no callback is running or starts once
    /// `dispose` has returned. Disposing from inside one of the subscription's
    /// own callbacks does not wait.
    fn dispose(&self);

    /// Returns `true` once the handle was disposed or its production reached a
    /// terminal signal.
    fn is_disposed(&self) -> bool;
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;
pub(crate) type ErrorFn = Box<dyn FnMut(Arc<dyn Error + Send + Sync>) + Send>;

/// A type that acts as an observer, allowing users to handle emitted values, errors,
/// and completion when subscribing to an `Observable`.
///
/// The same value is handed to the producer callback of an `Observable`, where it
/// plays the emitter role: the producer drives the sequence through its
/// [`Observer`] methods. After `complete` or `error` every further call is a
/// silent no-op, and once the owning subscription is disposed nothing is
/// delivered anymore.
pub struct Subscriber<NextFnType> {
    next_fn: Option<NextFn<NextFnType>>,
    complete_fn: Option<CompleteFn>,
    error_fn: Option<ErrorFn>,
    terminated: bool,
    state: Option<Arc<SubscriptionState>>,
}

impl<NextFnType> Subscriber<NextFnType> {
    /// Creates a new `Subscriber` instance with custom handling functions for emitted
    /// values, errors, and completion.
    pub fn new(
        next_fn: impl FnMut(NextFnType) + 'static + Send,
        error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send,
        complete_fn: impl FnMut() + 'static + Send,
    ) -> Self {
        Self::from_parts(
            Some(Box::new(next_fn)),
            Some(Box::new(error_fn)),
            Some(Box::new(complete_fn)),
        )
    }

    /// Create a new Subscriber with the provided `next` function.
    ///
    /// The `next` closure is called when the observable emits a new item.
    pub fn on_next(next_fn: impl FnMut(NextFnType) + 'static + Send) -> Self {
        Self::from_parts(Some(Box::new(next_fn)), None, None)
    }

    /// Create a new Subscriber that ignores every notification.
    ///
    /// Callbacks can be attached afterwards with [`on_complete`] and [`on_error`].
    ///
    /// [`on_complete`]: Subscriber::on_complete
    /// [`on_error`]: Subscriber::on_error
    #[must_use]
    pub fn empty() -> Self {
        Self::from_parts(None, None, None)
    }

    pub(crate) fn from_parts(
        next_fn: Option<NextFn<NextFnType>>,
        error_fn: Option<ErrorFn>,
        complete_fn: Option<CompleteFn>,
    ) -> Self {
        Subscriber {
            next_fn,
            complete_fn,
            error_fn,
            terminated: false,
            state: None,
        }
    }

    /// Set the completion function for the Subscriber.
    pub fn on_complete(&mut self, complete_fn: impl FnMut() + 'static + Send) {
        self.complete_fn = Some(Box::new(complete_fn));
    }

    /// Set the error-handling function for the Subscriber.
    ///
    /// The closure receives the error wrapped in an `Arc`, so the same error can be
    /// shared between threads without cloning it.
    pub fn on_error(&mut self, error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send) {
        self.error_fn = Some(Box::new(error_fn));
    }

    /// Returns `true` if this subscriber will not deliver anything anymore, either
    /// because a terminal signal was emitted or because its subscription was
    /// disposed.
    ///
    /// Long running producers should poll this between emissions and stop early.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.terminated || self.state.as_ref().is_some_and(|s| s.is_closed())
    }

    /// Binds this subscriber to the state of the subscription that owns it.
    ///
    /// A subscriber forwarded from one observable into another keeps the state of
    /// the outermost subscription.
    pub(crate) fn attach(&mut self, state: &Arc<SubscriptionState>) {
        if self.state.is_none() {
            self.state = Some(Arc::clone(state));
        }
    }

    fn terminate(&mut self) {
        self.terminated = true;
        if let Some(state) = &self.state {
            state.close();
        }
    }
}

impl<T> Observer for Subscriber<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        let state = self.state.clone();
        let _delivery = state.as_deref().map(SubscriptionState::begin_delivery);
        if self.is_closed() {
            trace!("next ignored on closed subscriber");
            return;
        }
        if let Some(nfn) = &mut self.next_fn {
            (nfn)(v);
        }
    }

    fn error(&mut self, observable_error: Arc<dyn Error + Send + Sync>) {
        let state = self.state.clone();
        {
            let _delivery = state.as_deref().map(SubscriptionState::begin_delivery);
            if self.is_closed() {
                trace!("error ignored on closed subscriber");
                return;
            }
            match &mut self.error_fn {
                Some(efn) => (efn)(observable_error),
                None => debug!(error = %observable_error, "observable error without error handler"),
            }
        }
        self.terminate();
    }

    fn complete(&mut self) {
        let state = self.state.clone();
        {
            let _delivery = state.as_deref().map(SubscriptionState::begin_delivery);
            if self.is_closed() {
                trace!("complete ignored on closed subscriber");
                return;
            }
            if let Some(cfn) = &mut self.complete_fn {
                (cfn)();
            }
        }
        self.terminate();
    }
}

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// State shared by every clone of a `Subscription` and by the `Subscriber` it gates.
pub(crate) struct SubscriptionState {
    id: u64,
    closed: AtomicBool,
    teardown: Mutex<Option<UnsubscribeLogic>>,
    runtime_handle: Option<runtime::Handle>,
    // Held for the whole of a gated callback.
    delivery: Mutex<()>,
    // Thread currently holding `delivery`, if any.
    delivering: Mutex<Option<ThreadId>>,
}

/// Keeps `close` from returning while a callback of the same subscription runs
/// on another thread.
pub(crate) struct DeliveryGuard<'a> {
    state: &'a SubscriptionState,
    _delivery: MutexGuard<'a, ()>,
}

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        // Cleared before `_delivery` is released.
        *lock(&self.state.delivering) = None;
    }
}

impl SubscriptionState {
    pub(crate) fn new() -> Arc<Self> {
        Self::with_teardown(None)
    }

    fn with_teardown(teardown: Option<UnsubscribeLogic>) -> Arc<Self> {
        Arc::new(SubscriptionState {
            id: NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed),
            closed: AtomicBool::new(false),
            teardown: Mutex::new(teardown),
            runtime_handle: runtime::Handle::try_current().ok(),
            delivery: Mutex::new(()),
            delivering: Mutex::new(None),
        })
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn begin_delivery(&self) -> DeliveryGuard<'_> {
        let delivery = lock(&self.delivery);
        *lock(&self.delivering) = Some(thread::current().id());
        DeliveryGuard {
            state: self,
            _delivery: delivery,
        }
    }

    /// Marks the state closed, waits for a callback running on another thread
    /// to return and runs the teardown. Returns `false` if the state was
    /// already closed.
    ///
    /// Called from inside one of its own callbacks it does not wait.
    pub(crate) fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        let reentrant = *lock(&self.delivering) == Some(thread::current().id());
        if !reentrant {
            drop(lock(&self.delivery));
        }
        // Taken under the lock, run outside of it: a teardown may call back
        // into code that touches this subscription.
        let teardown = lock(&self.teardown).take();
        if let Some(teardown) = teardown {
            teardown.unsubscribe(self.runtime_handle.as_ref());
        }
        true
    }

    /// Installs the teardown produced by a subscribe function. If production
    /// already reached a terminal signal the teardown runs right away.
    pub(crate) fn set_teardown(&self, teardown: UnsubscribeLogic) {
        let mut slot = lock(&self.teardown);
        if self.is_closed() {
            drop(slot);
            teardown.unsubscribe(self.runtime_handle.as_ref());
            return;
        }
        *slot = Some(teardown);
    }
}

/// Enumeration representing different types of handles used to await
/// background production.
pub enum SubscriptionHandle {
    /// No specific handle for task or thread awaiting.
    Nil,

    /// Holds a join handle for awaiting an asynchronous observable using Tokio task.
    JoinTask(JoinHandle<()>),

    /// Holds a join handle for awaiting an asynchronous observable using OS thread.
    JoinThread(ThreadJoinHandle<()>),
}

/// Represents one active observation of an `Observable`.
///
/// A `Subscription` is returned by every `subscribe` call. Disposing it stops
/// delivery to the subscriber and runs the teardown supplied by the producer
/// exactly once. When production reaches a terminal signal the teardown runs
/// on its own and the subscription reports itself as disposed.
///
/// Cloning is shallow: all clones share the same state, so one clone can be kept
/// in a [`CompositeDisposable`] while another is disposed from a different thread.
///
/// [`CompositeDisposable`]: super::CompositeDisposable
#[derive(Clone)]
pub struct Subscription {
    state: Arc<SubscriptionState>,
    subscription_future: Arc<Mutex<SubscriptionHandle>>,
}

impl Subscription {
    /// Creates a new Subscription instance with the specified unsubscribe logic and
    /// subscription handle.
    ///
    /// Producers passed to `Observable::new` return one of these to describe
    /// what has to be released when the observation ends.
    #[must_use]
    pub fn new(unsubscribe_logic: UnsubscribeLogic, subscription_future: SubscriptionHandle) -> Self {
        Subscription {
            state: SubscriptionState::with_teardown(Some(unsubscribe_logic)),
            subscription_future: Arc::new(Mutex::new(subscription_future)),
        }
    }

    /// A subscription without teardown logic or background worker.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
    }

    /// Wraps the teardown returned by a subscribe function into the subscription
    /// handed back to the caller.
    pub(crate) fn from_teardown(state: Arc<SubscriptionState>, teardown: Subscription) -> Self {
        let handle = teardown.take_handle();
        state.set_teardown(UnsubscribeLogic::Wrapped(Box::new(teardown)));
        Subscription {
            state,
            subscription_future: Arc::new(Mutex::new(handle)),
        }
    }

    fn take_handle(&self) -> SubscriptionHandle {
        std::mem::replace(&mut *lock(&self.subscription_future), SubscriptionHandle::Nil)
    }

    /// Process-unique identity of this subscription, shared by all its clones.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.state.id()
    }

    /// Awaits the background task or thread that produces for this subscription.
    ///
    /// A Tokio task that was aborted by disposal counts as finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread panicked or the Tokio task failed.
    pub async fn join_concurrent(self) -> Result<()> {
        match self.take_handle() {
            SubscriptionHandle::JoinTask(task_handle) => match task_handle.await {
                Err(e) if e.is_cancelled() => Ok(()),
                r => Ok(r?),
            },
            SubscriptionHandle::JoinThread(thread_handle) => {
                tokio::task::spawn_blocking(move || thread_handle.join())
                    .await?
                    .map_err(|_| ObservableError::WorkerPanicked)
            }
            SubscriptionHandle::Nil => Ok(()),
        }
    }

    /// Blocks until the OS thread producing for this subscription finishes.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread panicked, or if the producer runs on
    /// a Tokio task, which has to be awaited with `join_concurrent().await`.
    pub fn join(self) -> Result<()> {
        match self.take_handle() {
            SubscriptionHandle::JoinThread(thread_handle) => {
                thread_handle.join().map_err(|_| ObservableError::WorkerPanicked)
            }
            SubscriptionHandle::Nil => Ok(()),
            task @ SubscriptionHandle::JoinTask(_) => {
                *lock(&self.subscription_future) = task;
                Err(ObservableError::BlockingJoinOnTask)
            }
        }
    }
}

impl Disposable for Subscription {
    fn dispose(&self) {
        if self.state.close() {
            trace!(subscription = self.id(), "subscription disposed");
        }
    }

    fn is_disposed(&self) -> bool {
        self.state.is_closed()
    }
}

impl Unsubscribeable for Subscription {
    fn unsubscribe(self) {
        self.dispose();
    }
}

impl PartialEq for Subscription {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for Subscription {}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Enumerates various unsubscribe logic options for a subscription.
pub enum UnsubscribeLogic {
    /// No specific unsubscribe logic.
    Nil,

    /// If one subscription depends on another. Wrapped subscription's dispose
    /// will be called upon unsubscribing.
    Wrapped(Box<Subscription>),

    /// Unsubscribe logic defined by a function.
    Logic(Box<dyn FnOnce() + Send>),

    /// Asynchronous unsubscribe logic represented by a future. It is spawned on the
    /// Tokio runtime that was current when the subscription was created.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

impl UnsubscribeLogic {
    fn unsubscribe(self, runtime_handle: Option<&runtime::Handle>) {
        match self {
            UnsubscribeLogic::Nil => (),
            UnsubscribeLogic::Logic(fnc) => fnc(),
            UnsubscribeLogic::Wrapped(subscription) => subscription.dispose(),
            UnsubscribeLogic::Future(future) => match runtime_handle {
                Some(handle) => {
                    handle.spawn(future);
                }
                None => warn!("asynchronous teardown dropped, subscription was created outside of a Tokio runtime"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;

    fn counting_subscription() -> (Subscription, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_c = Arc::clone(&runs);
        let s = Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || {
                runs_c.fetch_add(1, Ordering::SeqCst);
            })),
            SubscriptionHandle::Nil,
        );
        (s, runs)
    }

    #[test]
    fn dispose_runs_teardown_once() {
        let (s, runs) = counting_subscription();
        let clone = s.clone();

        s.dispose();
        s.dispose();
        clone.unsubscribe();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(s.is_disposed());
    }

    #[test]
    fn clones_share_identity() {
        let (s, _) = counting_subscription();
        let (other, _) = counting_subscription();

        assert_eq!(s, s.clone());
        assert_eq!(s.id(), s.clone().id());
        assert_ne!(s, other);
    }

    #[test]
    fn wrapped_teardown_disposes_inner() {
        let (inner, runs) = counting_subscription();
        let outer = Subscription::new(
            UnsubscribeLogic::Wrapped(Box::new(inner.clone())),
            SubscriptionHandle::Nil,
        );

        outer.dispose();

        assert!(inner.is_disposed());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn teardown_installed_after_close_runs_immediately() {
        let state = SubscriptionState::new();
        assert!(state.close());
        assert!(!state.close());

        let (inner, runs) = counting_subscription();
        let s = Subscription::from_teardown(state, inner);

        assert!(s.is_disposed());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscriber_terminal_signal_is_sticky() {
        let nexts = Arc::new(Mutex::new(Vec::new()));
        let nexts_c = Arc::clone(&nexts);
        let completes = Arc::new(AtomicUsize::new(0));
        let completes_c = Arc::clone(&completes);
        let errors = Arc::new(AtomicUsize::new(0));
        let errors_c = Arc::clone(&errors);

        let mut s = Subscriber::new(
            move |v: i32| nexts_c.lock().unwrap().push(v),
            move |_| {
                errors_c.fetch_add(1, Ordering::SeqCst);
            },
            move || {
                completes_c.fetch_add(1, Ordering::SeqCst);
            },
        );

        s.next(1);
        s.complete();
        s.next(2);
        s.error(Arc::new(std::fmt::Error));
        s.complete();

        assert_eq!(*nexts.lock().unwrap(), vec![1]);
        assert_eq!(completes.load(Ordering::SeqCst), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
        assert!(s.is_closed());
    }

    #[test]
    fn closed_state_gates_subscriber() {
        let nexts = Arc::new(AtomicUsize::new(0));
        let nexts_c = Arc::clone(&nexts);
        let mut s = Subscriber::on_next(move |_: i32| {
            nexts_c.fetch_add(1, Ordering::SeqCst);
        });
        let state = SubscriptionState::new();
        s.attach(&state);

        s.next(1);
        state.close();
        s.next(2);

        assert_eq!(nexts.load(Ordering::SeqCst), 1);
        assert!(s.is_closed());
    }

    #[test]
    fn close_waits_for_callback_on_other_thread() {
        let finished = Arc::new(AtomicBool::new(false));
        let finished_c = Arc::clone(&finished);
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let mut s = Subscriber::on_next(move |_: i32| {
            let _ = entered_tx.send(());
            std::thread::sleep(std::time::Duration::from_millis(50));
            finished_c.store(true, Ordering::SeqCst);
        });
        let state = SubscriptionState::new();
        s.attach(&state);

        let worker = std::thread::spawn(move || s.next(1));
        entered_rx.recv().unwrap();
        state.close();

        assert!(finished.load(Ordering::SeqCst));
        worker.join().unwrap();
    }

    #[test]
    fn close_from_own_callback_does_not_wait() {
        let state = SubscriptionState::new();
        let state_c = Arc::clone(&state);
        let mut s = Subscriber::on_next(move |_: i32| {
            state_c.close();
        });
        s.attach(&state);

        s.next(1);

        assert!(s.is_closed());
    }

    #[test]
    fn blocking_join_on_task_keeps_handle() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let task = rt.spawn(async {});
        let s = Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::JoinTask(task));

        let r = s.clone().join();
        assert!(matches!(r, Err(ObservableError::BlockingJoinOnTask)));
        assert!(rt.block_on(s.join_concurrent()).is_ok());
    }

    #[tokio::test]
    async fn future_teardown_spawns_on_runtime() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let s = Subscription::new(
            UnsubscribeLogic::Future(Box::pin(async move {
                let _ = tx.send(());
            })),
            SubscriptionHandle::Nil,
        );

        s.dispose();

        assert!(rx.await.is_ok());
    }
}
