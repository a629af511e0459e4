use std::collections::VecDeque;

use crate::{
    decode::{DecodeError, Limits, TarEntry},
    EntryType, Header, PaxExtensions, BLOCK_SIZE,
};

/// Which metadata record is being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaKind {
    GnuName,
    GnuLink,
    Pax,
}

/// Metadata records seen since the last materialized entry, to be
/// folded into the next one.
#[derive(Debug, Default)]
struct Pending {
    gnu_long_name: Option<Vec<u8>>,
    gnu_long_link: Option<Vec<u8>>,
    pax_path: Option<Vec<u8>>,
    pax_link: Option<Vec<u8>>,
    pax_size: Option<u64>,
    pax_seen: bool,
    count: usize,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug)]
enum State {
    /// Waiting for (the rest of) a header block.
    Header,
    /// Draining payload we do not materialize, padding included.
    Skip { remaining: u64 },
    /// Accumulating a metadata record's payload.
    Meta {
        kind: MetaKind,
        offset: u64,
        remaining: u64,
        padding: u64,
        data: Vec<u8>,
    },
    /// Accumulating (or draining) the in-flight entry's payload.
    Content {
        entry: Box<TarEntry>,
        collect: bool,
        remaining: u64,
        padding: u64,
    },
}

/// Chunk-fed streaming tar decoder.
///
/// The decoder is push-based: callers [`feed`](Self::feed) it byte
/// chunks of arbitrary size (chunk boundaries carry no meaning), drain
/// completed entries with [`next_entry`](Self::next_entry), and call
/// [`finish`](Self::finish) once the input is exhausted to validate
/// clean termination. Feeding the same bytes at different chunk splits
/// yields identical entries.
///
/// An entry is only surfaced after its payload and block padding have
/// been consumed, so peak memory is bounded by one entry's content
/// plus one input chunk. The first all-zero block ends the archive;
/// any bytes after it are ignored.
#[derive(Debug)]
pub struct TarDecoder {
    limits: Limits,
    state: State,
    hold: Vec<u8>,
    pending: Pending,
    ready: VecDeque<TarEntry>,
    pos: u64,
    done: bool,
}

impl Default for TarDecoder {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl TarDecoder {
    /// Create a decoder with the given parsing limits.
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            state: State::Header,
            hold: Vec::new(),
            pending: Pending::default(),
            ready: VecDeque::new(),
            pos: 0,
            done: false,
        }
    }

    /// Bytes of input consumed so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// True once the end-of-archive marker has been seen.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consume one chunk of archive bytes.
    ///
    /// Completed entries become available via
    /// [`next_entry`](Self::next_entry). Errors are fatal; the decoder
    /// must not be fed further after one.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] on malformed input, with the byte
    /// offset at which the problem was detected.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), DecodeError> {
        let mut input = chunk;
        while !input.is_empty() {
            if self.done {
                self.pos += input.len() as u64;
                break;
            }
            match std::mem::replace(&mut self.state, State::Header) {
                State::Header => {
                    if self.hold.is_empty() && input.len() >= BLOCK_SIZE {
                        let (head, rest) = input.split_at(BLOCK_SIZE);
                        let mut block = [0u8; BLOCK_SIZE];
                        block.copy_from_slice(head);
                        input = rest;
                        self.pos += BLOCK_SIZE as u64;
                        self.process_header(&block)?;
                    } else {
                        let need = BLOCK_SIZE - self.hold.len();
                        let take = need.min(input.len());
                        self.hold.extend_from_slice(&input[..take]);
                        input = &input[take..];
                        self.pos += take as u64;
                        if self.hold.len() == BLOCK_SIZE {
                            let mut block = [0u8; BLOCK_SIZE];
                            block.copy_from_slice(&self.hold);
                            self.hold.clear();
                            self.process_header(&block)?;
                        }
                    }
                }
                State::Skip { mut remaining } => {
                    let take = remaining.min(input.len() as u64) as usize;
                    input = &input[take..];
                    self.pos += take as u64;
                    remaining -= take as u64;
                    if remaining > 0 {
                        self.state = State::Skip { remaining };
                    }
                }
                State::Meta {
                    kind,
                    offset,
                    mut remaining,
                    mut padding,
                    mut data,
                } => {
                    if remaining > 0 {
                        let take = remaining.min(input.len() as u64) as usize;
                        data.extend_from_slice(&input[..take]);
                        input = &input[take..];
                        self.pos += take as u64;
                        remaining -= take as u64;
                    }
                    if remaining == 0 {
                        let take = padding.min(input.len() as u64) as usize;
                        input = &input[take..];
                        self.pos += take as u64;
                        padding -= take as u64;
                    }
                    if remaining == 0 && padding == 0 {
                        self.absorb_metadata(kind, offset, data)?;
                    } else {
                        self.state = State::Meta {
                            kind,
                            offset,
                            remaining,
                            padding,
                            data,
                        };
                    }
                }
                State::Content {
                    mut entry,
                    collect,
                    mut remaining,
                    mut padding,
                } => {
                    if remaining > 0 {
                        let take = remaining.min(input.len() as u64) as usize;
                        if collect {
                            entry.content.extend_from_slice(&input[..take]);
                        }
                        input = &input[take..];
                        self.pos += take as u64;
                        remaining -= take as u64;
                    }
                    if remaining == 0 {
                        let take = padding.min(input.len() as u64) as usize;
                        input = &input[take..];
                        self.pos += take as u64;
                        padding -= take as u64;
                    }
                    if remaining == 0 && padding == 0 {
                        self.ready.push_back(*entry);
                    } else {
                        self.state = State::Content {
                            entry,
                            collect,
                            remaining,
                            padding,
                        };
                    }
                }
            }
        }
        Ok(())
    }

    /// Pop the next completed entry, if any.
    pub fn next_entry(&mut self) -> Option<TarEntry> {
        self.ready.pop_front()
    }

    /// Validate that the input ended cleanly.
    ///
    /// Call after the last [`feed`](Self::feed). Acceptable endings
    /// are the end-of-archive marker or a plain EOF at a block
    /// boundary between entries.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Truncated`] if the stream ended inside a header
    /// or payload, [`DecodeError::OrphanedMetadata`] if metadata
    /// records were never attached to an entry.
    pub fn finish(&self) -> Result<(), DecodeError> {
        if !self.pending.is_empty() {
            return Err(DecodeError::OrphanedMetadata { offset: self.pos });
        }
        if self.done || (matches!(self.state, State::Header) && self.hold.is_empty()) {
            Ok(())
        } else {
            Err(DecodeError::Truncated { offset: self.pos })
        }
    }

    fn process_header(&mut self, block: &[u8; BLOCK_SIZE]) -> Result<(), DecodeError> {
        let offset = self.pos - BLOCK_SIZE as u64;
        let header = Header::from_block(block);

        if header.is_empty() {
            self.done = true;
            return Ok(());
        }

        header
            .verify_checksum()
            .map_err(|source| DecodeError::Header { offset, source })?;
        let size = header
            .entry_size()
            .map_err(|source| DecodeError::Header { offset, source })?;

        match header.entry_type() {
            EntryType::GnuLongName => {
                self.begin_metadata(MetaKind::GnuName, offset, size)?;
            }
            EntryType::GnuLongLink => {
                self.begin_metadata(MetaKind::GnuLink, offset, size)?;
            }
            EntryType::XHeader => {
                self.begin_metadata(MetaKind::Pax, offset, size)?;
            }
            EntryType::XGlobalHeader => {
                self.skip(padded(size));
            }
            EntryType::GnuSparse => {
                return Err(DecodeError::Sparse { offset });
            }
            kind if kind.is_file() || kind.is_dir() || kind.is_symlink() => {
                self.begin_entry(header, offset, size)?;
            }
            _ => {
                // Hard links, devices, FIFOs and unknown types: drain
                // the payload, emit nothing. Any metadata attached to
                // them is discarded with them.
                self.pending = Pending::default();
                self.skip(padded(size));
            }
        }
        Ok(())
    }

    fn begin_metadata(
        &mut self,
        kind: MetaKind,
        offset: u64,
        size: u64,
    ) -> Result<(), DecodeError> {
        let (name, limit) = match kind {
            MetaKind::GnuName => ("GNU long name", self.limits.max_gnu_long_size),
            MetaKind::GnuLink => ("GNU long link", self.limits.max_gnu_long_size),
            MetaKind::Pax => ("PAX", self.limits.max_pax_size),
        };
        if size > limit as u64 {
            return Err(DecodeError::RecordTooLarge {
                offset,
                kind: name,
                size,
                limit,
            });
        }

        let duplicate = match kind {
            MetaKind::GnuName => self.pending.gnu_long_name.is_some(),
            MetaKind::GnuLink => self.pending.gnu_long_link.is_some(),
            MetaKind::Pax => self.pending.pax_seen,
        };
        if duplicate {
            return Err(DecodeError::DuplicateRecord { offset, kind: name });
        }
        if kind == MetaKind::Pax {
            self.pending.pax_seen = true;
        }

        self.pending.count += 1;
        if self.pending.count > self.limits.max_pending_records {
            return Err(DecodeError::TooManyRecords {
                offset,
                limit: self.limits.max_pending_records,
            });
        }

        if size == 0 {
            self.absorb_metadata(kind, offset, Vec::new())
        } else {
            self.state = State::Meta {
                kind,
                offset,
                remaining: size,
                padding: padded(size) - size,
                data: Vec::with_capacity(size as usize),
            };
            Ok(())
        }
    }

    fn absorb_metadata(
        &mut self,
        kind: MetaKind,
        offset: u64,
        data: Vec<u8>,
    ) -> Result<(), DecodeError> {
        match kind {
            MetaKind::GnuName => {
                self.pending.gnu_long_name = Some(crate::truncate_null(&data).to_vec());
            }
            MetaKind::GnuLink => {
                self.pending.gnu_long_link = Some(crate::truncate_null(&data).to_vec());
            }
            MetaKind::Pax => {
                for record in PaxExtensions::new(&data) {
                    let record = record.map_err(|source| DecodeError::Pax { offset, source })?;
                    let key = record
                        .key()
                        .map_err(|e| DecodeError::Pax {
                            offset,
                            source: crate::PaxError::InvalidKey(e),
                        })?;
                    match key {
                        "path" => self.pending.pax_path = Some(record.value_bytes().to_vec()),
                        "linkpath" => {
                            self.pending.pax_link = Some(record.value_bytes().to_vec());
                        }
                        "size" => {
                            let value = std::str::from_utf8(record.value_bytes())
                                .ok()
                                .and_then(|s| s.parse::<u64>().ok())
                                .ok_or(DecodeError::Pax {
                                    offset,
                                    source: crate::PaxError::Malformed,
                                })?;
                            self.pending.pax_size = Some(value);
                        }
                        // mtime, uid, gid and friends are normalized
                        // away downstream.
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn begin_entry(
        &mut self,
        header: &Header,
        offset: u64,
        header_size: u64,
    ) -> Result<(), DecodeError> {
        let pending = std::mem::take(&mut self.pending);
        let entry_type = header.entry_type();

        let path = if let Some(path) = pending.pax_path {
            path
        } else if let Some(path) = pending.gnu_long_name {
            path
        } else {
            let name = header.path_bytes();
            match header.prefix() {
                Some(prefix) if !prefix.is_empty() => {
                    let mut joined = Vec::with_capacity(prefix.len() + 1 + name.len());
                    joined.extend_from_slice(prefix);
                    joined.push(b'/');
                    joined.extend_from_slice(name);
                    joined
                }
                _ => name.to_vec(),
            }
        };
        if path.len() > self.limits.max_path_len {
            return Err(DecodeError::PathTooLong {
                offset,
                len: path.len(),
                limit: self.limits.max_path_len,
            });
        }

        let link_target = if entry_type.is_symlink() {
            pending
                .pax_link
                .or(pending.gnu_long_link)
                .or_else(|| {
                    let raw = header.link_name_bytes();
                    (!raw.is_empty()).then(|| raw.to_vec())
                })
        } else {
            None
        };

        let mode = header
            .mode()
            .map_err(|source| DecodeError::Header { offset, source })?;
        let mtime = header
            .mtime()
            .map_err(|source| DecodeError::Header { offset, source })?;

        // PAX size overrides the header field (which cannot encode
        // payloads past 8 GiB in plain octal).
        let size = pending.pax_size.unwrap_or(header_size);
        let collect = entry_type.is_file();

        let entry = TarEntry {
            entry_type,
            path,
            link_target,
            mode,
            mtime,
            size,
            content: Vec::new(),
        };

        if size == 0 {
            self.ready.push_back(entry);
        } else {
            self.state = State::Content {
                entry: Box::new(entry),
                collect,
                remaining: size,
                padding: padded(size) - size,
            };
        }
        Ok(())
    }

    fn skip(&mut self, bytes: u64) {
        if bytes > 0 {
            self.state = State::Skip { remaining: bytes };
        }
    }
}

/// Payload size rounded up to the next block boundary.
fn padded(size: u64) -> u64 {
    size.div_ceil(BLOCK_SIZE as u64) * BLOCK_SIZE as u64
}
