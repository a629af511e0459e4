//! The output side of a conversion: where sanitized entries land.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use flate2::{write::DeflateEncoder, Compression};
use log::trace;
use thiserror::Error;
use zip::{write::SimpleFileOptions, CompressionMethod, DateTime, ZipWriter};

use crate::config::CompressionLevel;
use crate::sanitize::EXEC_MODE;

/// Errors from materializing entries into the output archive.
#[derive(Debug, Error)]
pub enum SinkError {
    /// An I/O error on the destination.
    #[error("destination I/O error")]
    Io(#[from] io::Error),

    /// A zip structural error.
    #[error("zip write error")]
    Zip(#[from] zip::result::ZipError),
}

/// Where sanitized entries are materialized.
///
/// The pipeline drives a sink through exactly these three operations;
/// implementations own ordering guarantees such as parent-directory
/// synthesis.
pub trait ArchiveSink {
    /// Create a directory (and any missing parents). Idempotent.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the directory cannot be recorded.
    fn create_dir(&mut self, path: &Path, mode: u32) -> Result<(), SinkError>;

    /// Create a regular file with the given content and mode.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the file cannot be written.
    fn create_file(&mut self, path: &Path, content: &[u8], mode: u32) -> Result<(), SinkError>;

    /// Create a symbolic link. The target is stored verbatim.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the link cannot be recorded.
    fn create_symlink(&mut self, path: &Path, target: &str) -> Result<(), SinkError>;
}

/// An [`ArchiveSink`] writing a zip container.
///
/// Parent directories are synthesized on demand, every entry carries
/// the sentinel timestamp ([`SAFE_TIME`](crate::SAFE_TIME)), and entry
/// order is insertion order, so the same input always produces
/// byte-identical output.
pub struct ZipSink {
    writer: ZipWriter<File>,
    dest: PathBuf,
    level: CompressionLevel,
    dirs: HashSet<String>,
}

impl ZipSink {
    /// Create (truncating) the destination zip.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the destination cannot be created.
    pub fn create(dest: &Path, level: CompressionLevel) -> Result<Self, SinkError> {
        let file = File::create(dest)?;
        Ok(Self {
            writer: ZipWriter::new(file),
            dest: dest.to_owned(),
            level,
            dirs: HashSet::new(),
        })
    }

    /// Finalize the central directory and return the destination path.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the trailing records cannot be
    /// written.
    pub fn finish(mut self) -> Result<PathBuf, SinkError> {
        self.writer.finish()?;
        Ok(self.dest)
    }

    /// The fixed timestamp stamped on every entry: 1984-06-22
    /// 21:50:00, i.e. [`SAFE_TIME`](crate::SAFE_TIME) rendered in the
    /// DOS date format zip uses.
    #[must_use]
    pub fn sentinel_timestamp() -> DateTime {
        DateTime::from_date_and_time(1984, 6, 22, 21, 50, 0).unwrap_or_default()
    }

    fn base_options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default().last_modified_time(Self::sentinel_timestamp())
    }

    /// Zip entry name: normal path components joined with `/`. Root
    /// and `..`-free by construction (the sanitizer ran first), but an
    /// absolute prefix still loses its leading `/` here, as zip names
    /// are always relative.
    fn zip_name(path: &Path) -> String {
        let mut name = String::new();
        for component in path.components() {
            if let Component::Normal(part) = component {
                if !name.is_empty() {
                    name.push('/');
                }
                name.push_str(&part.to_string_lossy());
            }
        }
        name
    }

    fn add_dir_entry(&mut self, name: &str) -> Result<(), SinkError> {
        let options = self
            .base_options()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(EXEC_MODE);
        self.writer.add_directory(name, options)?;
        self.dirs.insert(name.to_string());
        Ok(())
    }

    fn ensure_parents(&mut self, name: &str) -> Result<(), SinkError> {
        let mut idx = 0;
        while let Some(pos) = name[idx..].find('/') {
            let dir = &name[..idx + pos];
            if !dir.is_empty() && !self.dirs.contains(dir) {
                self.add_dir_entry(dir)?;
            }
            idx += pos + 1;
        }
        Ok(())
    }

    fn file_options(&self, content: &[u8], mode: u32) -> Result<SimpleFileOptions, SinkError> {
        let options = self.base_options().unix_permissions(mode);
        let options = match self.level {
            CompressionLevel::Mixed => {
                if deflates_smaller(content)? {
                    options.compression_method(CompressionMethod::Deflated)
                } else {
                    options.compression_method(CompressionMethod::Stored)
                }
            }
            CompressionLevel::Level(0) => options.compression_method(CompressionMethod::Stored),
            CompressionLevel::Level(level) => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(level))),
        };
        Ok(options)
    }
}

impl ArchiveSink for ZipSink {
    fn create_dir(&mut self, path: &Path, _mode: u32) -> Result<(), SinkError> {
        let name = Self::zip_name(path);
        if name.is_empty() || self.dirs.contains(&name) {
            return Ok(());
        }
        trace!("zip dir {name}");
        self.ensure_parents(&name)?;
        self.add_dir_entry(&name)
    }

    fn create_file(&mut self, path: &Path, content: &[u8], mode: u32) -> Result<(), SinkError> {
        let name = Self::zip_name(path);
        trace!("zip file {name} ({} bytes, mode {mode:03o})", content.len());
        self.ensure_parents(&name)?;
        let options = self.file_options(content, mode)?;
        self.writer.start_file(name.as_str(), options)?;
        self.writer.write_all(content)?;
        Ok(())
    }

    fn create_symlink(&mut self, path: &Path, target: &str) -> Result<(), SinkError> {
        let name = Self::zip_name(path);
        trace!("zip symlink {name} -> {target}");
        self.ensure_parents(&name)?;
        let options = self.base_options();
        self.writer.add_symlink(name.as_str(), target, options)?;
        Ok(())
    }
}

/// Probe whether deflating `content` at the default level shrinks it.
fn deflates_smaller(content: &[u8]) -> io::Result<bool> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    Ok(encoder.finish()?.len() < content.len())
}
