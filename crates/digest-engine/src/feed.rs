use std::sync::atomic::{AtomicU32, Ordering};

use digest_core::Blob;
use tracing::warn;

use crate::backend::{BackendProgress, DigestBackend};
use crate::digest_progress::DigestProgress;
use crate::event::EngineEvent;
use crate::stream::{FeedStatus, StreamInner};

/// Consecutive `BackendProgress::Retry` responses (for one step kind) before
/// a burst is surfaced as a `EngineEvent::Warning`. Chosen high enough that
/// an ordinary one-or-two-tick retry (the common case) stays silent.
const RETRY_WARNING_STREAK: u32 = 32;

/// Bumps `counter`; once it first reaches `RETRY_WARNING_STREAK`, emits a
/// warning and keeps counting (so a stuck backend doesn't warn on every
/// single tick forever, but does warn again after another full streak).
fn note_retry<B: DigestBackend>(inner: &StreamInner<B>, counter: &AtomicU32, op: &str) {
    let streak = counter.fetch_add(1, Ordering::Relaxed) + 1;
    if streak % RETRY_WARNING_STREAK == 0 {
        inner.events.send(EngineEvent::Warning(format!(
            "{}: {op} has retried {streak} times in a row",
            inner.backend.name()
        )));
    }
}

/// Result of one feed-driver step (§4.3 of SPEC_FULL.md).
#[derive(Debug)]
pub(crate) enum FeedOutcome {
    /// The pending queue was empty.
    Idle,
    /// The backend accepted a partial slice; more work remains.
    Progress,
    /// The backend returned `Retry` or a persistent (logged) error.
    Retry,
    /// The front blob was fully consumed.
    BlobDone { blob: Blob, status: FeedStatus },
}

/// Result of one digest-receiver step (§4.4).
#[derive(Debug)]
pub(crate) enum DigestOutcome {
    /// No digest buffer exists yet (the `is_last` chunk hasn't completed).
    NoDigest,
    /// The backend returned `Retry` or a persistent (logged) error.
    Retry,
    /// The digest buffer is now fully populated.
    Ready(Blob),
}

pub(crate) fn feed_step<B: DigestBackend>(inner: &StreamInner<B>) -> FeedOutcome {
    let snapshot = {
        let queue = inner.queue.lock().unwrap();
        let Some(entry) = queue.front() else {
            return FeedOutcome::Idle;
        };
        (entry.blob.clone(), entry.offset, entry.is_last)
    };
    let (blob, offset, entry_is_last) = snapshot;

    let remaining = blob.len() - offset;
    let (len, call_is_last) = match inner.max_feed_block {
        Some(max) if remaining > max => (max, false),
        _ => (remaining, entry_is_last),
    };

    let progress = {
        let mut ctx = inner.ctx.lock().unwrap();
        inner
            .backend
            .feed(&mut ctx, &blob[offset..offset + len], call_is_last)
    };

    match progress {
        BackendProgress::Retry => {
            note_retry(inner, &inner.feed_retry_streak, "feed");
            FeedOutcome::Retry
        }
        BackendProgress::Error(err) => {
            warn!(backend = inner.backend.name(), error = %err, "feed: persistent backend error, retrying");
            inner
                .events
                .send(EngineEvent::Error(format!("{}: {err}", inner.backend.name())));
            FeedOutcome::Retry
        }
        BackendProgress::Done(n) => {
            inner.feed_retry_streak.store(0, Ordering::Relaxed);
            debug_assert!(n <= len);
            if offset + n < blob.len() {
                let mut queue = inner.queue.lock().unwrap();
                queue.advance_front(n);
                FeedOutcome::Progress
            } else {
                if call_is_last {
                    start_digest(inner);
                }
                let mut queue = inner.queue.lock().unwrap();
                queue.pop_front_consumed(n);
                FeedOutcome::BlobDone {
                    blob,
                    status: FeedStatus::Ok,
                }
            }
        }
    }
}

fn start_digest<B: DigestBackend>(inner: &StreamInner<B>) {
    let mut digest = inner.digest.lock().unwrap();
    if digest.is_none() {
        *digest = Some(DigestProgress::new(inner.backend.digest_size()));
    }
}

pub(crate) fn digest_step<B: DigestBackend>(inner: &StreamInner<B>) -> DigestOutcome {
    let mut digest_slot = inner.digest.lock().unwrap();
    let Some(progress) = digest_slot.as_mut() else {
        return DigestOutcome::NoDigest;
    };

    let result = {
        let mut ctx = inner.ctx.lock().unwrap();
        inner.backend.read_digest(&mut ctx, progress.remaining_mut())
    };

    match result {
        BackendProgress::Retry => {
            note_retry(inner, &inner.digest_retry_streak, "read_digest");
            DigestOutcome::Retry
        }
        BackendProgress::Error(err) => {
            warn!(backend = inner.backend.name(), error = %err, "read_digest: persistent backend error, retrying");
            inner
                .events
                .send(EngineEvent::Error(format!("{}: {err}", inner.backend.name())));
            DigestOutcome::Retry
        }
        BackendProgress::Done(n) => {
            inner.digest_retry_streak.store(0, Ordering::Relaxed);
            progress.advance(n);
            if progress.is_complete() {
                let progress = digest_slot.take().expect("checked Some above");
                DigestOutcome::Ready(progress.into_blob())
            } else {
                DigestOutcome::Retry
            }
        }
    }
}
