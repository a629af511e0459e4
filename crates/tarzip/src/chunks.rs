//! Fixed-size chunked reading of the source archive.

use std::io::{self, Read};
use std::os::fd::OwnedFd;
use std::path::Path;

use rustix::fs::{open, Mode, OFlags};
use rustix::io::Errno;

use crate::DEFAULT_CHUNK_SIZE;

/// Reads a file as an ordered sequence of owned chunks.
///
/// Every chunk except the last is exactly `chunk_size` bytes; the last
/// holds whatever remains. The reader never buffers more than one
/// chunk, so peak memory stays at `chunk_size` regardless of the file
/// size. A read failure ends the sequence with that error.
pub struct ChunkReader {
    fd: OwnedFd,
    chunk_size: usize,
    finished: bool,
}

impl ChunkReader {
    /// Open `path` for chunked reading with the default 10 MiB chunks.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the file cannot be opened.
    pub fn open(path: &Path) -> io::Result<Self> {
        Self::with_chunk_size(path, DEFAULT_CHUNK_SIZE)
    }

    /// Open `path` for chunked reading with a custom chunk size.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the file cannot be opened.
    pub fn with_chunk_size(path: &Path, chunk_size: usize) -> io::Result<Self> {
        let fd = open(path, OFlags::RDONLY | OFlags::CLOEXEC, Mode::empty())?;
        Ok(Self {
            fd,
            chunk_size: chunk_size.max(1),
            finished: false,
        })
    }
}

impl Iterator for ChunkReader {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < buf.len() {
            match rustix::io::read(&self.fd, &mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(Errno::INTR) => continue,
                Err(errno) => {
                    self.finished = true;
                    return Some(Err(errno.into()));
                }
            }
        }

        if filled == 0 {
            self.finished = true;
            return None;
        }
        if filled < buf.len() {
            // Short read means EOF: this is the last chunk.
            self.finished = true;
            buf.truncate(filled);
        }
        Some(Ok(buf))
    }
}

/// `io::Read` adapter over any chunk sequence, with lookahead for
/// format sniffing.
pub struct ChunkRead<I> {
    chunks: I,
    current: Vec<u8>,
    pos: usize,
}

impl<I: Iterator<Item = io::Result<Vec<u8>>>> ChunkRead<I> {
    /// Wrap a chunk iterator.
    pub fn new(chunks: I) -> Self {
        Self {
            chunks,
            current: Vec::new(),
            pos: 0,
        }
    }

    /// Look at up to `n` bytes without consuming them. Returns fewer
    /// than `n` bytes only at end of input.
    ///
    /// # Errors
    ///
    /// Propagates a read error from the underlying chunk sequence.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        while self.current.len() - self.pos < n {
            match self.chunks.next() {
                Some(Ok(chunk)) => {
                    if self.pos > 0 {
                        self.current.drain(..self.pos);
                        self.pos = 0;
                    }
                    self.current.extend_from_slice(&chunk);
                }
                Some(Err(err)) => return Err(err),
                None => break,
            }
        }
        let avail = (self.current.len() - self.pos).min(n);
        Ok(&self.current[self.pos..self.pos + avail])
    }
}

impl<I: Iterator<Item = io::Result<Vec<u8>>>> Read for ChunkRead<I> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos == self.current.len() {
            match self.chunks.next() {
                Some(Ok(chunk)) => {
                    self.current = chunk;
                    self.pos = 0;
                }
                Some(Err(err)) => return Err(err),
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.current.len() - self.pos);
        buf[..n].copy_from_slice(&self.current[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
