use std::borrow::Cow;

use crate::EntryType;

/// One fully decoded archive entry.
///
/// Produced by [`TarDecoder::next_entry`](super::TarDecoder::next_entry)
/// only after the entry's payload and block padding have been consumed,
/// so the decoder's cursor is always at the next header when an entry
/// is handed out. Paths are kept as raw bytes; tar imposes no encoding.
#[derive(Debug, Clone)]
pub struct TarEntry {
    /// The entry type.
    pub entry_type: EntryType,

    /// The entry path, resolved from PAX `path`, GNU long name, or the
    /// header name (with UStar prefix), in that priority order.
    pub path: Vec<u8>,

    /// Symlink target, for symlink entries.
    pub link_target: Option<Vec<u8>>,

    /// Permission bits from the header.
    pub mode: u32,

    /// Modification time, seconds since the epoch.
    pub mtime: u64,

    /// Declared payload size in bytes.
    pub size: u64,

    /// Payload, for regular files. Empty for other entry types.
    pub content: Vec<u8>,
}

impl TarEntry {
    /// The path as a string, with invalid UTF-8 replaced.
    #[must_use]
    pub fn path_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path)
    }

    /// Returns true for regular files (either encoding).
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.entry_type.is_file()
    }

    /// Returns true for directories.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.entry_type.is_dir()
    }

    /// Returns true for symbolic links.
    #[must_use]
    pub fn is_symlink(&self) -> bool {
        self.entry_type.is_symlink()
    }
}
