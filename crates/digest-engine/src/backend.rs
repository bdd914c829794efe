/// Result of one `feed`/`read_digest` call into a backend.
///
/// Mirrors the source spec's signed-`ssize` return discipline without the
/// signed-integer encoding: `Done(n)` is "bytes accepted/produced ≥ 0",
/// `Retry` is the `-EAGAIN`/`-EINTR` case, and `Error` is any other negative
/// return — logged by the engine and retried indefinitely, never escalated.
#[derive(Debug)]
pub enum BackendProgress {
    /// `n` bytes were consumed (`feed`) or produced (`read_digest`).
    Done(usize),
    /// The backend isn't ready; call again later with the same arguments.
    Retry,
    /// A backend-internal error occurred. Non-fatal: the engine logs it and
    /// retries on the next scheduler pass.
    Error(anyhow::Error),
}

/// The engine's backend contract. Implementations own the concrete hash
/// algorithm and any OS resources it needs (e.g. a kernel-crypto socket);
/// the engine never inspects `Context`, it only routes bytes through it.
///
/// `feed`/`read_digest` are called serially, never concurrently, for a given
/// context: the engine's scheduler is the single writer. Implementations for
/// the blocking-task scheduler mode may block for as long as they need to;
/// implementations intended for the interval scheduler mode must return
/// promptly, using `BackendProgress::Retry` when more time is needed.
pub trait DigestBackend: Send + Sync + 'static {
    /// Per-stream backend state (e.g. partial hash state, an open socket).
    type Context: Send + 'static;

    /// Creates a fresh context for one digest stream.
    fn new_context(&self) -> Self::Context;

    /// Feeds up to `data.len()` bytes. `is_last` marks the final slice of
    /// the final pending blob; the engine never sets it on any other call.
    fn feed(&self, ctx: &mut Self::Context, data: &[u8], is_last: bool) -> BackendProgress;

    /// Drains up to `out.len()` bytes of digest output. Only called after an
    /// `is_last` feed has been fully accepted.
    fn read_digest(&self, ctx: &mut Self::Context, out: &mut [u8]) -> BackendProgress;

    /// Releases backend-held resources. Called exactly once, during handle
    /// teardown, before `Context` itself is dropped. Default: no-op.
    fn cleanup(&self, _ctx: &mut Self::Context) {}

    /// Fixed digest size in bytes; checked non-zero at stream construction.
    fn digest_size(&self) -> usize;

    /// Backend name, used only in log lines.
    fn name(&self) -> &'static str;
}
