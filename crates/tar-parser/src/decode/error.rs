use thiserror::Error;

use crate::{HeaderError, PaxError};

/// Errors produced while decoding an archive stream.
///
/// Every variant carries the byte offset (into the uncompressed tar
/// stream) at which the problem was detected. All errors are fatal:
/// the decoder does not resynchronize.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A header block failed validation.
    #[error("invalid header at offset {offset}: {source}")]
    Header {
        /// Offset of the header block.
        offset: u64,
        /// The underlying header error.
        source: HeaderError,
    },

    /// The stream ended in the middle of a header or payload.
    #[error("truncated archive at offset {offset}")]
    Truncated {
        /// Offset reached when the stream ended.
        offset: u64,
    },

    /// An entry path exceeds the configured limit.
    #[error("path too long at offset {offset}: {len} bytes (limit {limit})")]
    PathTooLong {
        /// Offset of the offending record.
        offset: u64,
        /// Length of the rejected path.
        len: usize,
        /// The configured limit.
        limit: usize,
    },

    /// A metadata record payload exceeds the configured limit.
    #[error("{kind} record too large at offset {offset}: {size} bytes (limit {limit})")]
    RecordTooLarge {
        /// Offset of the offending record.
        offset: u64,
        /// Which kind of record ("PAX", "GNU long name", "GNU long link").
        kind: &'static str,
        /// Declared payload size.
        size: u64,
        /// The configured limit.
        limit: usize,
    },

    /// Two metadata records of the same kind precede one entry.
    #[error("duplicate {kind} record at offset {offset}")]
    DuplicateRecord {
        /// Offset of the second record.
        offset: u64,
        /// Which kind of record was duplicated.
        kind: &'static str,
    },

    /// Too many metadata records precede one entry.
    #[error("too many metadata records at offset {offset} (limit {limit})")]
    TooManyRecords {
        /// Offset of the record that exceeded the limit.
        offset: u64,
        /// The configured limit.
        limit: usize,
    },

    /// The stream ended with metadata records not attached to any entry.
    #[error("metadata records at end of archive not followed by an entry (offset {offset})")]
    OrphanedMetadata {
        /// Offset at which the archive ended.
        offset: u64,
    },

    /// A PAX extended header payload is malformed.
    #[error("invalid PAX data at offset {offset}: {source}")]
    Pax {
        /// Offset of the PAX record.
        offset: u64,
        /// The underlying parse error.
        source: PaxError,
    },

    /// GNU sparse entries cannot be decoded or safely skipped.
    #[error("GNU sparse entry at offset {offset} is not supported")]
    Sparse {
        /// Offset of the sparse entry's header.
        offset: u64,
    },
}

impl DecodeError {
    /// Byte offset into the tar stream at which the error was detected.
    #[must_use]
    pub fn offset(&self) -> u64 {
        match self {
            DecodeError::Header { offset, .. }
            | DecodeError::Truncated { offset }
            | DecodeError::PathTooLong { offset, .. }
            | DecodeError::RecordTooLarge { offset, .. }
            | DecodeError::DuplicateRecord { offset, .. }
            | DecodeError::TooManyRecords { offset, .. }
            | DecodeError::OrphanedMetadata { offset }
            | DecodeError::Pax { offset, .. }
            | DecodeError::Sparse { offset } => *offset,
        }
    }
}
