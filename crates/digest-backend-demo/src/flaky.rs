use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use digest_engine::{BackendProgress, DigestBackend};

/// Per-stream state for [`FlakyBackend`]: the wrapped backend's own context
/// plus a seeded RNG, so a given seed reproduces the same retry/partial-
/// accept sequence on every run.
pub struct FlakyContext<C> {
    inner: C,
    rng: StdRng,
}

/// Wraps another backend and randomly injects `Retry` responses and partial
/// (short) accepts, to exercise the engine's retry-and-resume paths without
/// a real flaky I/O source. Deterministic for a given `seed`.
pub struct FlakyBackend<B> {
    inner: B,
    seed: u64,
    retry_probability: f64,
}

impl<B: DigestBackend> FlakyBackend<B> {
    /// Wraps `inner`, retrying with probability `retry_probability` (clamped
    /// to `[0.0, 1.0]`) before ever accepting a call, seeded by `seed`.
    pub fn new(inner: B, seed: u64, retry_probability: f64) -> Self {
        Self {
            inner,
            seed,
            retry_probability: retry_probability.clamp(0.0, 1.0),
        }
    }
}

impl<B: DigestBackend> DigestBackend for FlakyBackend<B> {
    type Context = FlakyContext<B::Context>;

    fn new_context(&self) -> Self::Context {
        FlakyContext {
            inner: self.inner.new_context(),
            rng: StdRng::seed_from_u64(self.seed),
        }
    }

    fn feed(&self, ctx: &mut Self::Context, data: &[u8], is_last: bool) -> BackendProgress {
        if data.is_empty() {
            return self.inner.feed(&mut ctx.inner, data, is_last);
        }
        if ctx.rng.random_bool(self.retry_probability) {
            return BackendProgress::Retry;
        }
        let accepted = ctx.rng.random_range(1..=data.len());
        let call_is_last = is_last && accepted == data.len();
        self.inner
            .feed(&mut ctx.inner, &data[..accepted], call_is_last)
    }

    fn read_digest(&self, ctx: &mut Self::Context, out: &mut [u8]) -> BackendProgress {
        if out.is_empty() {
            return self.inner.read_digest(&mut ctx.inner, out);
        }
        if ctx.rng.random_bool(self.retry_probability) {
            return BackendProgress::Retry;
        }
        let produced = ctx.rng.random_range(1..=out.len());
        self.inner.read_digest(&mut ctx.inner, &mut out[..produced])
    }

    fn cleanup(&self, ctx: &mut Self::Context) {
        self.inner.cleanup(&mut ctx.inner);
    }

    fn digest_size(&self) -> usize {
        self.inner.digest_size()
    }

    fn name(&self) -> &'static str {
        "flaky-demo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sum32Backend;

    #[test]
    fn same_seed_reproduces_same_call_sequence() {
        let backend = FlakyBackend::new(Sum32Backend, 7, 0.5);
        let mut ctx_a = backend.new_context();
        let mut ctx_b = backend.new_context();
        for _ in 0..5 {
            let a = backend.feed(&mut ctx_a, &[1, 2, 3, 4], false);
            let b = backend.feed(&mut ctx_b, &[1, 2, 3, 4], false);
            assert_eq!(format!("{a:?}"), format!("{b:?}"));
        }
    }

    #[test]
    fn zero_retry_probability_always_makes_progress() {
        let backend = FlakyBackend::new(Sum32Backend, 1, 0.0);
        let mut ctx = backend.new_context();
        match backend.feed(&mut ctx, &[9, 9, 9], true) {
            BackendProgress::Done(n) => assert!(n >= 1 && n <= 3),
            other => panic!("expected Done, got {other:?}"),
        }
    }
}
