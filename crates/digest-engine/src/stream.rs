use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use digest_core::{Blob, EngineError};
use tokio::sync::broadcast;
use tracing::debug;

use crate::backend::DigestBackend;
use crate::digest_progress::DigestProgress;
use crate::event::{EngineEvent, EventChannel};
use crate::queue::PendingQueue;
use crate::scheduler::{self, SchedulerHandle};

/// Outcome reported to a registered `on_feed_done` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// The blob was fully consumed by the backend.
    Ok,
    /// The stream was deleted before this blob was consumed.
    Canceled,
}

/// Which scheduler drives this stream's feed/digest machinery.
///
/// `Blocking` is for backends that may genuinely block (e.g. a kernel-crypto
/// socket); `Interval` is for backends guaranteed to return promptly, and
/// avoids spawning a dedicated blocking-pool task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerMode {
    /// Drive the backend from a dedicated `spawn_blocking` task.
    Blocking,
    /// Drive the backend from a repeating `tokio::time::interval` task.
    Interval,
}

/// Construction-time configuration for a `DigestStream`.
pub struct DigestConfig {
    /// Invoked exactly once per stream, when the digest is fully computed.
    pub on_digest_ready: Arc<dyn Fn(Blob) + Send + Sync>,
    /// Invoked once per submitted blob, in submission order, when this
    /// engine is finished with the blob (consumed or canceled).
    pub on_feed_done: Option<Arc<dyn Fn(Blob, FeedStatus) + Send + Sync>>,
    /// Upper bound on `accumulated_tx` (exclusive); `None` = unbounded.
    pub feed_size: Option<u64>,
    /// Which scheduler drives this stream.
    pub scheduler_mode: SchedulerMode,
    /// Per-call block ceiling for the feed driver (§4.3 step 2); `None`
    /// feeds each pending blob's full remaining span in one backend call.
    pub max_feed_block: Option<usize>,
    /// Poll period for `SchedulerMode::Interval`; ignored in `Blocking` mode.
    pub interval_tick: Duration,
}

impl DigestConfig {
    /// Default interval-mode poll period: effectively zero-delay, yielding
    /// to the Tokio scheduler between ticks rather than busy-spinning.
    pub const DEFAULT_INTERVAL_TICK: Duration = Duration::from_millis(0);
}

pub(crate) struct StreamInner<B: DigestBackend> {
    pub(crate) backend: Arc<B>,
    pub(crate) ctx: Mutex<B::Context>,
    pub(crate) queue: Mutex<PendingQueue>,
    pub(crate) digest: Mutex<Option<DigestProgress>>,
    pub(crate) feed_size: Option<u64>,
    pub(crate) max_feed_block: Option<usize>,
    pub(crate) finished: AtomicBool,
    pub(crate) deleted: AtomicBool,
    pub(crate) on_digest_ready: Arc<dyn Fn(Blob) + Send + Sync>,
    pub(crate) on_feed_done: Option<Arc<dyn Fn(Blob, FeedStatus) + Send + Sync>>,
    pub(crate) scheduler_mode: SchedulerMode,
    pub(crate) interval_tick: Duration,
    pub(crate) scheduler: Mutex<Option<SchedulerHandle>>,
    pub(crate) events: EventChannel,
    pub(crate) feed_retry_streak: AtomicU32,
    pub(crate) digest_retry_streak: AtomicU32,
}

impl<B: DigestBackend> Drop for StreamInner<B> {
    fn drop(&mut self) {
        // Teardown (§4.7): drain unreported blobs as Canceled, drop any
        // undelivered digest, then let the backend release its resources.
        let leftovers = self.queue.lock().unwrap().drain_all();
        if let Some(on_feed_done) = &self.on_feed_done {
            for entry in leftovers {
                on_feed_done(entry.blob, FeedStatus::Canceled);
            }
        }
        self.digest.lock().unwrap().take();

        let mut ctx = self.ctx.lock().unwrap();
        self.backend.cleanup(&mut ctx);
    }
}

/// A streaming digest handle over backend `B`. See `SPEC_FULL.md` §3-4.
pub struct DigestStream<B: DigestBackend> {
    pub(crate) inner: Arc<StreamInner<B>>,
}

impl<B: DigestBackend> Clone for DigestStream<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: DigestBackend> DigestStream<B> {
    /// Constructs a new digest stream. Fails only if the backend reports a
    /// zero digest size.
    pub fn new(backend: Arc<B>, config: DigestConfig) -> Result<Self, EngineError> {
        if backend.digest_size() == 0 {
            return Err(EngineError::InvalidArgument);
        }

        let ctx = backend.new_context();
        let inner = Arc::new(StreamInner {
            ctx: Mutex::new(ctx),
            backend,
            queue: Mutex::new(PendingQueue::default()),
            digest: Mutex::new(None),
            feed_size: config.feed_size,
            max_feed_block: config.max_feed_block,
            finished: AtomicBool::new(false),
            deleted: AtomicBool::new(false),
            on_digest_ready: config.on_digest_ready,
            on_feed_done: config.on_feed_done,
            scheduler_mode: config.scheduler_mode,
            interval_tick: config.interval_tick,
            scheduler: Mutex::new(None),
            events: EventChannel::new(),
            feed_retry_streak: AtomicU32::new(0),
            digest_retry_streak: AtomicU32::new(0),
        });

        Ok(Self { inner })
    }

    /// Subscribes to this stream's user-facing event feed (warnings and
    /// persistent backend errors). Multiple subscribers may coexist; each
    /// sees every event sent after it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.events.subscribe()
    }

    /// Submits a blob for feeding (§4.2). Returns as soon as the blob is
    /// enqueued; completion is reported asynchronously.
    pub fn feed(&self, blob: Blob, is_last: bool) -> Result<(), EngineError> {
        if self.inner.deleted.load(Ordering::SeqCst) || self.inner.finished.load(Ordering::SeqCst)
        {
            return Err(EngineError::InvalidArgument);
        }

        {
            let mut queue = self.inner.queue.lock().unwrap();
            queue.try_push(blob, is_last, self.inner.feed_size)?;
            if is_last {
                // Set before releasing the lock: closes the TOCTOU window a
                // second concurrent `feed` could otherwise race through.
                self.inner.finished.store(true, Ordering::SeqCst);
            }
        }

        if let Err(err) = scheduler::ensure_started(&self.inner) {
            let mut queue = self.inner.queue.lock().unwrap();
            queue.rollback_last_push();
            if is_last {
                self.inner.finished.store(false, Ordering::SeqCst);
            }
            return Err(err);
        }

        Ok(())
    }

    /// Cancels the stream (§4.7). Idempotent: a second call logs and
    /// returns. Teardown itself runs from `Drop` once the last reference —
    /// caller's and scheduler's — goes away.
    pub fn delete(&self) {
        if self.inner.deleted.swap(true, Ordering::SeqCst) {
            debug!("delete: stream already deleted, ignoring");
            return;
        }
        scheduler::cancel(&self.inner);
    }

    /// Current `accumulated_tx`, exposed for tests and diagnostics.
    pub fn accumulated_tx(&self) -> u64 {
        self.inner.queue.lock().unwrap().accumulated_tx()
    }
}
