use thiserror::Error;

/// Errors raised by the library itself, as opposed to errors emitted by a
/// producer through `Observer::error`.
///
/// Construction errors such as [`ObservableError::NegativeCount`] are returned
/// synchronously from the factory call, before any subscription exists.
#[derive(Debug, Error)]
pub enum ObservableError {
    #[error("range count must not be negative, got {count}")]
    NegativeCount { count: i64 },

    #[error("range starting at {start} with {count} values overflows i64")]
    RangeOverflow { start: i64, count: i64 },

    #[error("observable worker thread panicked")]
    WorkerPanicked,

    #[error("subscription runs on a Tokio task, use `join_concurrent().await` instead of `join()`")]
    BlockingJoinOnTask,

    #[error("observable task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ObservableError>;
