use bytes::BytesMut;

use digest_core::Blob;

/// Output digest buffer and partial-read progress, allocated exactly once
/// per stream when the `is_last` chunk is fully accepted.
#[derive(Debug)]
pub(crate) struct DigestProgress {
    buf: BytesMut,
    written: usize,
}

impl DigestProgress {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            buf: BytesMut::zeroed(size),
            written: 0,
        }
    }

    pub(crate) fn remaining_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.written..]
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.written += n;
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.written == self.buf.len()
    }

    pub(crate) fn into_blob(self) -> Blob {
        Blob::from_bytes(self.buf.freeze())
    }
}
