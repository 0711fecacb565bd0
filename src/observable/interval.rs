use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::debug;

use crate::observer::Observer;
use crate::subscription::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Starts the ticking worker for one `interval` subscription.
pub(super) fn spawn(period: Duration, o: Subscriber<u64>) -> Subscription {
    let period = period.max(MIN_PERIOD);
    match Handle::try_current() {
        Ok(handle) => spawn_task(&handle, period, o),
        Err(_) => spawn_thread(period, o),
    }
}

fn spawn_task(handle: &Handle, period: Duration, mut o: Subscriber<u64>) -> Subscription {
    let join_handle = handle.spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        let mut n = 0;
        loop {
            ticker.tick().await;
            if o.is_closed() {
                break;
            }
            o.next(n);
            n += 1;
        }
    });
    let abort_handle = join_handle.abort_handle();

    Subscription::new(
        UnsubscribeLogic::Logic(Box::new(move || {
            debug!("stopping interval task");
            abort_handle.abort();
        })),
        SubscriptionHandle::JoinTask(join_handle),
    )
}

fn spawn_thread(period: Duration, mut o: Subscriber<u64>) -> Subscription {
    let (tx, rx) = mpsc::channel::<()>();

    let join_handle = std::thread::spawn(move || {
        let mut n = 0;
        // A message or a dropped sender both mean the subscription ended.
        while let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(period) {
            if o.is_closed() {
                break;
            }
            o.next(n);
            n += 1;
        }
    });

    Subscription::new(
        UnsubscribeLogic::Logic(Box::new(move || {
            debug!("stopping interval thread");
            let _ = tx.send(());
        })),
        SubscriptionHandle::JoinThread(join_handle),
    )
}
