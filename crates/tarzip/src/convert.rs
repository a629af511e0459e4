//! One end-to-end conversion: source bytes in, finalized zip out.

use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;

use log::debug;
use tar_parser::decode::TarDecoder;

use crate::chunks::{ChunkRead, ChunkReader};
use crate::config::ExtractOptions;
use crate::error::ConvertError;
use crate::gzip;
use crate::sanitize::{sanitize_entry, EntryKind};
use crate::sink::{ArchiveSink, ZipSink};
use crate::DEFAULT_CHUNK_SIZE;

/// Where a job's archive bytes come from.
#[derive(Clone)]
pub enum JobSource {
    /// Read the archive from a file.
    Path(PathBuf),
    /// The archive is already in memory.
    Buffer(Vec<u8>),
}

impl std::fmt::Debug for JobSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            JobSource::Buffer(buffer) => write!(f, "Buffer({} bytes)", buffer.len()),
        }
    }
}

/// Everything a conversion needs: plain data, safe to hand to another
/// thread or process.
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// The source archive.
    pub source: JobSource,
    /// Destination path for the zip.
    pub dest: PathBuf,
    /// Extraction options.
    pub options: ExtractOptions,
}

/// Convert one (optionally gzipped) tar archive into a zip file.
///
/// Drives chunk reading, gzip sniffing and inflation, streaming tar
/// decode, per-entry sanitization and the zip sink, then finalizes the
/// destination and returns its path.
///
/// # Errors
///
/// Any read, inflate, decode or write failure aborts the job. The
/// partially written destination file is left behind; callers that
/// stage outputs into a temporary location own cleanup.
pub fn convert_to_zip(spec: &JobSpec) -> Result<PathBuf, ConvertError> {
    debug!("converting {:?} -> {:?}", spec.source, spec.dest);
    let mut sink = ZipSink::create(&spec.dest, spec.options.compression_level)?;
    match &spec.source {
        JobSource::Path(path) => {
            let chunks = ChunkReader::open(path).map_err(ConvertError::Read)?;
            extract_archive(chunks, &spec.options, &mut sink)?;
        }
        JobSource::Buffer(buffer) => {
            let chunks = buffer.chunks(DEFAULT_CHUNK_SIZE).map(|c| Ok(c.to_vec()));
            extract_archive(chunks, &spec.options, &mut sink)?;
        }
    }
    Ok(sink.finish()?)
}

/// Stream a chunked archive into `sink`.
///
/// The first bytes are sniffed for gzip; compressed input is inflated
/// on the fly. Entries rejected by the sanitizer are skipped silently.
///
/// # Errors
///
/// See [`ConvertError`] for the failure phases.
pub fn extract_archive<I, S>(
    chunks: I,
    options: &ExtractOptions,
    sink: &mut S,
) -> Result<(), ConvertError>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
    S: ArchiveSink,
{
    let mut reader = ChunkRead::new(chunks);
    let gzipped = gzip::is_gzip(reader.peek(2).map_err(ConvertError::Read)?);
    let mut source: Box<dyn Read> = if gzipped {
        // Tag source errors so they stay distinguishable from the
        // inflater's own errors downstream.
        Box::new(gzip::inflater(TaggedSource(reader)))
    } else {
        Box::new(reader)
    };

    let mut decoder = TarDecoder::default();
    let mut written = 0usize;
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = source
            .read(&mut buf)
            .map_err(|err| classify_read_error(gzipped, err))?;
        if n == 0 {
            break;
        }
        decoder.feed(&buf[..n])?;
        written += apply_entries(&mut decoder, options, sink)?;
        if decoder.is_done() {
            break;
        }
    }
    written += apply_entries(&mut decoder, options, sink)?;
    decoder.finish()?;
    debug!("wrote {written} entries");
    Ok(())
}

fn apply_entries<S: ArchiveSink>(
    decoder: &mut TarDecoder,
    options: &ExtractOptions,
    sink: &mut S,
) -> Result<usize, ConvertError> {
    let mut written = 0;
    while let Some(entry) = decoder.next_entry() {
        let Some(sanitized) = sanitize_entry(&entry, options.strip_components, &options.prefix_path)
        else {
            continue;
        };
        match sanitized.kind {
            EntryKind::Directory => sink.create_dir(&sanitized.mapped_path, sanitized.mode)?,
            EntryKind::File => {
                sink.create_file(&sanitized.mapped_path, &entry.content, sanitized.mode)?;
            }
            EntryKind::Symlink { target } => {
                sink.create_symlink(&sanitized.mapped_path, &target)?;
            }
        }
        written += 1;
    }
    Ok(written)
}

/// Marks an error as coming from the source bytes, not from the
/// inflater. The inflater passes its inner reader's errors through
/// verbatim, so the tag survives to the classification point.
#[derive(Debug)]
struct SourceError(io::Error);

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

struct TaggedSource<R>(R);

impl<R: Read> Read for TaggedSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0
            .read(buf)
            .map_err(|err| io::Error::new(err.kind(), SourceError(err)))
    }
}

/// On a gzipped stream, errors carrying the [`SourceError`] tag are
/// read failures; everything else came out of the inflater.
fn classify_read_error(gzipped: bool, err: io::Error) -> ConvertError {
    if !gzipped {
        return ConvertError::Read(err);
    }
    let kind = err.kind();
    match err.into_inner().map(|inner| inner.downcast::<SourceError>()) {
        Some(Ok(tagged)) => ConvertError::Read(tagged.0),
        Some(Err(other)) => ConvertError::Inflate(io::Error::new(kind, other)),
        None => ConvertError::Inflate(io::Error::from(kind)),
    }
}
