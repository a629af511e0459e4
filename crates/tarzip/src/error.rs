use std::io;

use tar_parser::decode::DecodeError;
use thiserror::Error;

use crate::sink::SinkError;

/// A conversion failure, identified by the phase that produced it.
///
/// Sanitizer rejections are not errors; they are skips.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Reading the source archive failed.
    #[error("failed to read source archive")]
    Read(#[source] io::Error),

    /// The gzip stream is malformed.
    #[error("failed to inflate gzip stream")]
    Inflate(#[source] io::Error),

    /// The tar stream is malformed (the error carries the byte offset).
    #[error("failed to decode tar stream")]
    Decode(#[from] DecodeError),

    /// Writing the output archive failed.
    #[error("failed to write zip archive")]
    Write(#[from] SinkError),

    /// The pool executor disappeared before the job completed.
    #[error("task pool shut down before the job completed")]
    WorkerGone,
}
