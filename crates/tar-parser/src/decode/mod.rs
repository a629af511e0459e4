//! Chunk-fed streaming decode of tar archives.
//!
//! [`TarDecoder`] is a push-based state machine: feed it raw byte
//! chunks in order, pop completed [`TarEntry`] values, and validate
//! termination with `finish()`. See the type-level docs for the
//! contract.

mod decoder;
mod entry;
mod error;
mod limits;

pub use decoder::TarDecoder;
pub use entry::TarEntry;
pub use error::DecodeError;
pub use limits::Limits;
