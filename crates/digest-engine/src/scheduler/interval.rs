use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::backend::DigestBackend;
use crate::scheduler::{is_done, tick, TickResult};
use crate::stream::StreamInner;

/// Spawns the polling task for `SchedulerMode::Interval`.
///
/// The source spec drives this mode from a repeating zero-delay timer; a
/// literal zero-delay `tokio::time::interval` panics (the period must be
/// non-zero), so the configured tick is floored at 1ms and
/// `MissedTickBehavior::Burst` is used to fire back-to-back ticks without
/// drift when a tick is missed, which is the closest async-idiomatic
/// equivalent to "never wait if work is pending."
pub(crate) fn spawn<B: DigestBackend>(
    inner: Arc<StreamInner<B>>,
    notify: Arc<Notify>,
) -> JoinHandle<()> {
    let period = inner.interval_tick.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        debug!(backend = inner.backend.name(), "interval scheduler started");

        'outer: loop {
            if inner.deleted.load(Ordering::SeqCst) || is_done(&inner) {
                break;
            }
            loop {
                match tick(&inner) {
                    TickResult::Active => {
                        if inner.deleted.load(Ordering::SeqCst) || is_done(&inner) {
                            break 'outer;
                        }
                        continue;
                    }
                    TickResult::Backoff | TickResult::Idle => break,
                }
            }
            tokio::select! {
                _ = ticker.tick() => {}
                _ = notify.notified() => {}
            }
        }

        debug!(backend = inner.backend.name(), "interval scheduler stopped");
    })
}
