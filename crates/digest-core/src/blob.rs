use bytes::Bytes;

/// An immutable, reference-counted byte buffer.
///
/// `Clone` is the spec's `blob_ref` (a cheap atomic refcount bump, not a
/// copy); letting the last clone drop is `blob_unref`. Both fall out of
/// `bytes::Bytes` for free, so there is no bespoke refcounting here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob(Bytes);

impl Blob {
    /// Wraps an owned byte vector, taking ownership without copying.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self(Bytes::from(data))
    }

    /// Wraps an existing `Bytes`, sharing its storage.
    pub fn from_bytes(data: Bytes) -> Self {
        Self(data)
    }

    /// Number of bytes in the blob.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the full byte range.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Borrows the underlying `Bytes` handle.
    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

impl From<Bytes> for Blob {
    fn from(data: Bytes) -> Self {
        Self::from_bytes(data)
    }
}

impl std::ops::Deref for Blob {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_storage_without_copying() {
        let blob = Blob::from_vec(vec![1, 2, 3]);
        let cloned = blob.clone();
        assert_eq!(blob.as_slice(), cloned.as_slice());
        assert_eq!(blob.as_bytes().as_ptr(), cloned.as_bytes().as_ptr());
    }

    #[test]
    fn len_and_is_empty() {
        assert!(Blob::from_vec(Vec::new()).is_empty());
        assert_eq!(Blob::from_vec(vec![0u8; 5]).len(), 5);
    }
}
