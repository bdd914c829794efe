#![forbid(unsafe_code)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]

//! Shared primitives for the digest engine crates: the refcounted blob type
//! and the synchronous error taxonomy surfaced by `feed`/`new`.

mod blob;
mod error;

#[cfg(feature = "logging-init")]
mod logging;

pub use blob::Blob;
pub use error::EngineError;

#[cfg(feature = "logging-init")]
pub use logging::init_tracing;
