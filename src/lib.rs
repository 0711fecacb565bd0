//! `rxlite` is a minimal set of reactive primitives: cold observables, singles,
//! and disposable subscriptions.
//!
//! An [`Observable`] is a lazy description of how to produce a sequence of values
//! followed by a terminal signal. Nothing happens until it is subscribed to, and
//! each subscription runs the production again. Subscribing returns a
//! [`Subscription`](subscribe::Subscription), a handle that bounds the lifetime of
//! the observation: disposing it stops further delivery and releases whatever the
//! producer allocated. Production reaching `complete` or `error` releases those
//! resources as well.
//!
//! [`Single`] narrows an observable down to exactly one success value or one
//! error. [`CompositeDisposable`] groups subscriptions so they can be disposed
//! together.
//!
//! # Example
//!
//! ```no_run
//! use rxlite::subscribe::Subscriber;
//! use rxlite::{CompositeDisposable, Disposable, Observable, Subscribeable};
//!
//! let subscriptions = CompositeDisposable::new();
//!
//! // Prints 1, 2 and 3.
//! let mut numbers = Observable::of([1, 2, 3]);
//! subscriptions.add(numbers.subscribe(Subscriber::on_next(|v| println!("{}", v))));
//!
//! // Never terminates on its own.
//! let forever = Observable::<i32>::never().subscribe(Subscriber::empty());
//! subscriptions.add(forever.clone());
//!
//! subscriptions.dispose();
//! assert!(forever.is_disposed());
//! ```

mod errors;
mod observable;
mod observer;
mod single;
mod subscription;

pub use errors::ObservableError;
pub use observable::Observable;
pub use observer::Observer;
pub use single::{Single, SingleEmitter, SingleSubscriber};
pub use subscription::subscribe;
pub use subscription::CompositeDisposable;

pub use subscribe::{Disposable, Subscribeable, Unsubscribeable};
