//! Scheduler backends that drive a stream's feed/digest machinery (§4.5).
//!
//! Both modes share the same per-tick step logic ([`tick`]); they differ only
//! in how they wait between ticks. `blocking` parks a dedicated
//! `spawn_blocking` thread; `interval` polls from a lightweight async task,
//! for hosts that can't spare a blocking-pool thread per stream.

mod blocking;
mod interval;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use digest_core::EngineError;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::backend::DigestBackend;
use crate::feed::{digest_step, feed_step, DigestOutcome, FeedOutcome};
use crate::stream::{SchedulerMode, StreamInner};

/// Handle to a stream's running scheduler task. Dropping it does not stop
/// the task (the task holds its own `Arc<StreamInner<B>>>`); it only drops
/// this handle's wake channel once the stream itself is torn down.
pub(crate) struct SchedulerHandle {
    notify: Arc<Notify>,
    // Kept to tie the task's lifetime to the handle's for diagnostics; the
    // task exits on its own once the stream is finished or deleted.
    _task: JoinHandle<()>,
}

/// Starts the stream's scheduler task if one isn't already running, else
/// wakes it so it re-checks the pending queue immediately.
pub(crate) fn ensure_started<B: DigestBackend>(
    inner: &Arc<StreamInner<B>>,
) -> Result<(), EngineError> {
    let mut slot = inner.scheduler.lock().unwrap();
    if let Some(handle) = slot.as_ref() {
        handle.notify.notify_one();
        return Ok(());
    }

    let notify = Arc::new(Notify::new());
    let task = match inner.scheduler_mode {
        SchedulerMode::Blocking => blocking::spawn(Arc::clone(inner), Arc::clone(&notify)),
        SchedulerMode::Interval => interval::spawn(Arc::clone(inner), Arc::clone(&notify)),
    };
    *slot = Some(SchedulerHandle {
        notify,
        _task: task,
    });
    Ok(())
}

/// Wakes the scheduler so it observes a just-set `deleted` flag promptly.
pub(crate) fn cancel<B: DigestBackend>(inner: &Arc<StreamInner<B>>) {
    if let Some(handle) = inner.scheduler.lock().unwrap().as_ref() {
        handle.notify.notify_one();
    }
}

/// Outcome of one [`tick`] call, telling the caller how urgently to come
/// back: immediately (`Active`), after a short backoff (`Backoff`), or only
/// once woken or the next tick boundary (`Idle`).
pub(crate) enum TickResult {
    Active,
    Backoff,
    Idle,
}

/// Drives one feed step and one digest step, dispatching any callbacks the
/// steps complete. Shared by both scheduler modes so their retry/backoff and
/// callback-dispatch semantics never diverge.
pub(crate) fn tick<B: DigestBackend>(inner: &StreamInner<B>) -> TickResult {
    let mut active = false;
    let mut backoff = false;

    match feed_step(inner) {
        FeedOutcome::Idle => {}
        FeedOutcome::Progress => active = true,
        FeedOutcome::Retry => backoff = true,
        FeedOutcome::BlobDone { blob, status } => {
            active = true;
            if let Some(on_feed_done) = &inner.on_feed_done {
                on_feed_done(blob, status);
            }
        }
    }

    match digest_step(inner) {
        DigestOutcome::NoDigest => {}
        DigestOutcome::Retry => backoff = true,
        DigestOutcome::Ready(blob) => {
            active = true;
            (inner.on_digest_ready)(blob);
        }
    }

    if active {
        TickResult::Active
    } else if backoff {
        TickResult::Backoff
    } else {
        TickResult::Idle
    }
}

/// True once the stream has no more work: the final blob was consumed and
/// its digest delivered, or nothing was ever pending and no feed has been
/// marked final yet — checked alongside `deleted` by both scheduler loops.
pub(crate) fn is_done<B: DigestBackend>(inner: &StreamInner<B>) -> bool {
    inner.finished.load(Ordering::SeqCst)
        && inner.queue.lock().unwrap().is_empty()
        && inner.digest.lock().unwrap().is_none()
}
