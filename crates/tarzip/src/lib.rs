//! Streaming conversion of (optionally gzipped) tar archives into
//! deterministic zip files.
//!
//! The pipeline reads the source in fixed-size chunks
//! ([`chunks::ChunkReader`]), optionally inflates gzip on the fly
//! ([`gzip`]), feeds the bytes to a streaming tar decoder
//! (`tar_parser::decode`), validates and remaps each entry's path
//! ([`sanitize`]), and materializes the survivors into a zip container
//! ([`sink::ZipSink`]) with normalized permissions and a fixed
//! timestamp, so converting the same archive twice yields
//! byte-identical output.
//!
//! [`convert::convert_to_zip`] runs one conversion end to end;
//! [`pool::TaskPool`] schedules many of them under a concurrency
//! bound.

pub mod chunks;
pub mod config;
pub mod convert;
pub mod error;
pub mod gzip;
pub mod pool;
pub mod sanitize;
pub mod sink;

pub use config::{CompressionLevel, ExtractOptions, PoolConfig, PoolMode};
pub use convert::{convert_to_zip, JobSource, JobSpec};
pub use error::ConvertError;
pub use pool::TaskPool;

/// Default chunk size for reading source archives: 10 MiB, matching
/// the upstream package pipeline this replaces.
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Timestamp stamped on every zip entry: 1984-06-22 21:50:00 UTC,
/// seconds since the epoch. Old enough to predate every package, new
/// enough for the DOS date format zip uses (which starts in 1980).
pub const SAFE_TIME: u64 = 456_789_000;
