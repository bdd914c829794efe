use digest_engine::{BackendProgress, DigestBackend};

/// Per-stream state for [`Sum32Backend`]: a running wrapping sum.
#[derive(Debug, Default)]
pub struct Sum32Context {
    sum: u32,
}

/// A deterministic, non-cryptographic backend: the digest is the
/// little-endian wrapping sum of every fed byte. Always accepts its entire
/// input slice in one call and never returns `Retry`.
#[derive(Debug, Default)]
pub struct Sum32Backend;

impl DigestBackend for Sum32Backend {
    type Context = Sum32Context;

    fn new_context(&self) -> Self::Context {
        Sum32Context::default()
    }

    fn feed(&self, ctx: &mut Self::Context, data: &[u8], _is_last: bool) -> BackendProgress {
        for &byte in data {
            ctx.sum = ctx.sum.wrapping_add(byte as u32);
        }
        BackendProgress::Done(data.len())
    }

    fn read_digest(&self, ctx: &mut Self::Context, out: &mut [u8]) -> BackendProgress {
        let bytes = ctx.sum.to_le_bytes();
        let n = out.len().min(bytes.len());
        out[..n].copy_from_slice(&bytes[..n]);
        BackendProgress::Done(n)
    }

    fn digest_size(&self) -> usize {
        4
    }

    fn name(&self) -> &'static str {
        "sum32-demo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_wraps_and_encodes_little_endian() {
        let backend = Sum32Backend;
        let mut ctx = backend.new_context();
        assert!(matches!(
            backend.feed(&mut ctx, &[1, 2, 3], true),
            BackendProgress::Done(3)
        ));
        let mut out = [0u8; 4];
        assert!(matches!(
            backend.read_digest(&mut ctx, &mut out),
            BackendProgress::Done(4)
        ));
        assert_eq!(out, 6u32.to_le_bytes());
    }
}
