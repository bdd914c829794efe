#![forbid(unsafe_code)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]

//! A streaming message-digest engine: an asynchronous, blob-oriented façade
//! over a pluggable, possibly-blocking hashing backend.
//!
//! Callers submit [`digest_core::Blob`] chunks via [`DigestStream::feed`];
//! completions and the final digest are delivered through caller-registered
//! closures on a Tokio task, never directly from the backend's own thread.
//! See `SPEC_FULL.md` for the full design rationale.

mod backend;
mod digest_progress;
mod event;
mod feed;
mod queue;
mod scheduler;
mod stream;

pub use backend::{BackendProgress, DigestBackend};
pub use digest_core::{Blob, EngineError};
pub use event::EngineEvent;
pub use stream::{DigestConfig, DigestStream, FeedStatus, SchedulerMode};
