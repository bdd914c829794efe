/// Synchronous errors surfaced by `DigestStream::new`/`feed`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The handle is deleted, finished, or the request is otherwise malformed.
    #[error("invalid argument")]
    InvalidArgument,
    /// `accumulated_tx + blob.len()` would overflow `u64`.
    #[error("accumulated feed size overflow")]
    Overflow,
    /// A configured feed-size ceiling would be reached or exceeded.
    #[error("feed-size ceiling exceeded")]
    NoSpace,
    /// Starting the scheduler task failed (e.g. the runtime is shutting down).
    #[error("out of memory starting scheduler")]
    OutOfMemory,
}
