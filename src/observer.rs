use std::{error::Error, sync::Arc};

/// The producer-facing side of a subscription.
///
/// Producers push values with `next` and finish with exactly one of `error` or
/// `complete`. Implementations treat the terminal signal as sticky: once `error`
/// or `complete` has been delivered, every further call is ignored.
pub trait Observer {
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);
    fn error(&mut self, _: Arc<dyn Error + Send + Sync>);
    fn complete(&mut self);
}
