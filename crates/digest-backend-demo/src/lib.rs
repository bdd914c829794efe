#![forbid(unsafe_code)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]

//! Toy [`DigestBackend`] implementations used by `digest-engine`'s
//! integration tests and the `digest-cli` demo binary. Neither is meant for
//! real hashing: `Sum32Backend` is trivially predictable, and `FlakyBackend`
//! exists only to exercise the engine's retry/partial-accept paths.

mod flaky;
mod sum32;

pub use flaky::FlakyBackend;
pub use sum32::Sum32Backend;
