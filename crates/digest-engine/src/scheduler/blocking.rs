use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::backend::DigestBackend;
use crate::scheduler::{is_done, tick, TickResult};
use crate::stream::StreamInner;

/// Pause between retries of a backend that returned `Retry`/`Error`.
const RETRY_BACKOFF: Duration = Duration::from_millis(5);

/// Upper bound on how long an idle thread parks before re-checking its own
/// exit conditions, in case a wakeup is ever missed.
const IDLE_POLL: Duration = Duration::from_secs(1);

/// Spawns the dedicated blocking-pool thread for `SchedulerMode::Blocking`.
/// Grounded on the retry-sleep-continue shape of the teacher's
/// `compute_witness` loop, generalized from a fixed job list to an
/// open-ended pending queue.
pub(crate) fn spawn<B: DigestBackend>(
    inner: Arc<StreamInner<B>>,
    notify: Arc<Notify>,
) -> JoinHandle<()> {
    let handle = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || {
        debug!(backend = inner.backend.name(), "blocking scheduler started");
        loop {
            if inner.deleted.load(Ordering::SeqCst) || is_done(&inner) {
                break;
            }
            match tick(&inner) {
                TickResult::Active => continue,
                TickResult::Backoff => std::thread::sleep(RETRY_BACKOFF),
                TickResult::Idle => {
                    let notify = Arc::clone(&notify);
                    handle.block_on(async move {
                        let _ = tokio::time::timeout(IDLE_POLL, notify.notified()).await;
                    });
                }
            }
        }
        debug!(backend = inner.backend.name(), "blocking scheduler stopped");
    })
}
