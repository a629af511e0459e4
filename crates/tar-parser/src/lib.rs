//! Zerocopy-based tar header access and a chunk-fed streaming decoder.
//!
//! Tar archives are a sequence of 512-byte blocks: a header block
//! describing one entry, followed by the entry's payload rounded up to
//! the next block boundary. This crate exposes the header layout
//! ([`Header`]), the numeric field encodings ([`parse_octal`],
//! [`parse_numeric`]), PAX extended-header records ([`PaxExtensions`]),
//! and a push-based decoder ([`decode::TarDecoder`]) that is fed raw
//! byte chunks of arbitrary size and yields complete entries.
//!
//! Only the header fields a conversion pipeline reads are exposed:
//! path (with UStar prefix), entry type, size, mode, mtime and link
//! name. Sparse descriptors, device numbers and ownership fields are
//! intentionally not modelled.
//!
//! # Example
//!
//! ```
//! use tar_parser::decode::TarDecoder;
//!
//! let mut decoder = TarDecoder::default();
//! decoder.feed(&[]).unwrap();
//! assert!(decoder.next_entry().is_none());
//! decoder.finish().unwrap();
//! ```

pub mod decode;

use std::fmt;

use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Size of a tar block (header or payload unit) in bytes.
pub const BLOCK_SIZE: usize = 512;

/// Magic string for UStar format headers ("ustar\0").
pub const USTAR_MAGIC: &[u8; 6] = b"ustar\0";

/// Version field for UStar format headers ("00").
pub const USTAR_VERSION: &[u8; 2] = b"00";

/// Magic string for GNU tar format headers ("ustar ").
pub const GNU_MAGIC: &[u8; 6] = b"ustar ";

/// Version field for GNU tar format headers (" \0").
pub const GNU_VERSION: &[u8; 2] = b" \0";

/// Errors from interpreting a single header block.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// A numeric field contains invalid characters.
    #[error("invalid numeric field: {0:?}")]
    InvalidNumeric(Vec<u8>),

    /// The header checksum does not match the computed value.
    #[error("checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch {
        /// The checksum value stored in the header.
        stored: u64,
        /// The checksum computed from the header bytes.
        computed: u64,
    },

    /// A value does not fit the fixed-size header field.
    #[error("{field} does not fit header field ({len} bytes)")]
    FieldTooLong {
        /// Name of the header field.
        field: &'static str,
        /// Length of the rejected value.
        len: usize,
    },
}

/// Result type for header operations.
pub type Result<T> = std::result::Result<T, HeaderError>;

/// Raw 512-byte tar header block.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct RawHeader {
    /// The raw header bytes.
    pub bytes: [u8; BLOCK_SIZE],
}

impl Default for RawHeader {
    fn default() -> Self {
        Self {
            bytes: [0u8; BLOCK_SIZE],
        }
    }
}

impl fmt::Debug for RawHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawHeader")
            .field("name", &truncate_null(&self.bytes[0..100]))
            .finish_non_exhaustive()
    }
}

/// Tar entry type, from the header's typeflag byte.
///
/// Only regular files (modern `'0'` and pre-POSIX `'\0'`), directories
/// and symbolic links are materialized by the decoder; the remaining
/// variants exist so their payloads can be skipped correctly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file (type '0').
    Regular,
    /// Regular file in the pre-POSIX encoding (type '\0').
    LegacyRegular,
    /// Hard link to another entry (type '1').
    Link,
    /// Symbolic link (type '2').
    Symlink,
    /// Character device (type '3').
    Char,
    /// Block device (type '4').
    Block,
    /// Directory (type '5').
    Directory,
    /// FIFO/named pipe (type '6').
    Fifo,
    /// Contiguous file (type '7', rarely used).
    Continuous,
    /// GNU long name extension record (type 'L').
    GnuLongName,
    /// GNU long link extension record (type 'K').
    GnuLongLink,
    /// GNU sparse file (type 'S').
    GnuSparse,
    /// PAX extended header for the next entry (type 'x').
    XHeader,
    /// PAX global extended header (type 'g').
    XGlobalHeader,
    /// Unknown entry type.
    Other(u8),
}

impl EntryType {
    /// Parse an entry type from a raw typeflag byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'0' => EntryType::Regular,
            b'\0' => EntryType::LegacyRegular,
            b'1' => EntryType::Link,
            b'2' => EntryType::Symlink,
            b'3' => EntryType::Char,
            b'4' => EntryType::Block,
            b'5' => EntryType::Directory,
            b'6' => EntryType::Fifo,
            b'7' => EntryType::Continuous,
            b'L' => EntryType::GnuLongName,
            b'K' => EntryType::GnuLongLink,
            b'S' => EntryType::GnuSparse,
            b'x' => EntryType::XHeader,
            b'g' => EntryType::XGlobalHeader,
            other => EntryType::Other(other),
        }
    }

    /// Convert an entry type back to its raw typeflag byte.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            EntryType::Regular => b'0',
            EntryType::LegacyRegular => b'\0',
            EntryType::Link => b'1',
            EntryType::Symlink => b'2',
            EntryType::Char => b'3',
            EntryType::Block => b'4',
            EntryType::Directory => b'5',
            EntryType::Fifo => b'6',
            EntryType::Continuous => b'7',
            EntryType::GnuLongName => b'L',
            EntryType::GnuLongLink => b'K',
            EntryType::GnuSparse => b'S',
            EntryType::XHeader => b'x',
            EntryType::XGlobalHeader => b'g',
            EntryType::Other(b) => b,
        }
    }

    /// Returns true for both regular-file encodings.
    #[must_use]
    pub fn is_file(self) -> bool {
        matches!(self, EntryType::Regular | EntryType::LegacyRegular)
    }

    /// Returns true for directory entries.
    #[must_use]
    pub fn is_dir(self) -> bool {
        self == EntryType::Directory
    }

    /// Returns true for symbolic link entries.
    #[must_use]
    pub fn is_symlink(self) -> bool {
        self == EntryType::Symlink
    }
}

impl From<u8> for EntryType {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

/// High-level wrapper over a raw 512-byte header block.
///
/// Format detection looks at the magic field: "ustar\0"+"00" is UStar,
/// "ustar "+" \0" is GNU, anything else is the pre-POSIX layout (which
/// shares the fields this crate reads).
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct Header {
    raw: RawHeader,
}

impl Header {
    /// Create an empty header with UStar magic and version.
    #[must_use]
    pub fn new_ustar() -> Self {
        let mut header = Self {
            raw: RawHeader::default(),
        };
        header.raw.bytes[257..263].copy_from_slice(USTAR_MAGIC);
        header.raw.bytes[263..265].copy_from_slice(USTAR_VERSION);
        header
    }

    /// View a 512-byte block as a header without copying.
    #[must_use]
    pub fn from_block(bytes: &[u8; BLOCK_SIZE]) -> &Header {
        zerocopy::transmute_ref!(bytes)
    }

    /// Get a reference to the underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.raw.bytes
    }

    /// Get a mutable reference to the underlying bytes.
    pub fn as_mut_bytes(&mut self) -> &mut [u8; BLOCK_SIZE] {
        &mut self.raw.bytes
    }

    /// Check if this header uses the UStar format.
    #[must_use]
    pub fn is_ustar(&self) -> bool {
        self.raw.bytes[257..263] == *USTAR_MAGIC && self.raw.bytes[263..265] == *USTAR_VERSION
    }

    /// Check if this header uses the GNU tar format.
    #[must_use]
    pub fn is_gnu(&self) -> bool {
        self.raw.bytes[257..263] == *GNU_MAGIC && self.raw.bytes[263..265] == *GNU_VERSION
    }

    /// Get the entry type.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        EntryType::from_byte(self.raw.bytes[156])
    }

    /// Get the payload size in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidNumeric`] if the size field is not
    /// valid octal or base-256.
    pub fn entry_size(&self) -> Result<u64> {
        parse_numeric(&self.raw.bytes[124..136])
    }

    /// Get the file mode (permission bits).
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidNumeric`] if the mode field is not valid.
    pub fn mode(&self) -> Result<u32> {
        parse_numeric(&self.raw.bytes[100..108]).map(|v| v as u32)
    }

    /// Get the modification time as a Unix timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::InvalidNumeric`] if the mtime field is not valid.
    pub fn mtime(&self) -> Result<u64> {
        parse_numeric(&self.raw.bytes[136..148])
    }

    /// Get the raw path bytes from the name field (bytes 0..100).
    ///
    /// For UStar headers the [`prefix`](Self::prefix) field may hold
    /// leading path components to prepend.
    #[must_use]
    pub fn path_bytes(&self) -> &[u8] {
        truncate_null(&self.raw.bytes[0..100])
    }

    /// Get the raw link target bytes.
    #[must_use]
    pub fn link_name_bytes(&self) -> &[u8] {
        truncate_null(&self.raw.bytes[157..257])
    }

    /// Get the UStar prefix field for long paths.
    ///
    /// Returns `None` for pre-POSIX or GNU headers, which reuse these
    /// bytes for other purposes.
    #[must_use]
    pub fn prefix(&self) -> Option<&[u8]> {
        if !self.is_ustar() {
            return None;
        }
        Some(truncate_null(&self.raw.bytes[345..500]))
    }

    /// Verify the header checksum.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::ChecksumMismatch`] if the stored and
    /// computed checksums differ, or [`HeaderError::InvalidNumeric`] if
    /// the stored checksum cannot be parsed.
    pub fn verify_checksum(&self) -> Result<()> {
        let stored = parse_octal(&self.raw.bytes[148..156])?;
        let computed = self.compute_checksum();
        if stored == computed {
            Ok(())
        } else {
            Err(HeaderError::ChecksumMismatch { stored, computed })
        }
    }

    /// Compute the header checksum: the unsigned sum of all header
    /// bytes with the checksum field (bytes 148..156) read as spaces.
    #[must_use]
    pub fn compute_checksum(&self) -> u64 {
        let mut sum: u64 = 0;
        for (i, &byte) in self.raw.bytes.iter().enumerate() {
            if (148..156).contains(&i) {
                sum += u64::from(b' ');
            } else {
                sum += u64::from(byte);
            }
        }
        sum
    }

    /// Check if this block is all zeros (end-of-archive marker).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.bytes.iter().all(|&b| b == 0)
    }

    // Setters, mainly for constructing fixture archives.

    /// Set the name field.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::FieldTooLong`] for paths over 100 bytes;
    /// longer paths need a GNU or PAX extension record.
    pub fn set_path(&mut self, path: &str) -> Result<()> {
        write_str_field(&mut self.raw.bytes[0..100], path.as_bytes(), "path")
    }

    /// Set the link target field.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::FieldTooLong`] for targets over 100 bytes.
    pub fn set_link_name(&mut self, target: &str) -> Result<()> {
        write_str_field(&mut self.raw.bytes[157..257], target.as_bytes(), "linkname")
    }

    /// Set the mode field.
    pub fn set_mode(&mut self, mode: u32) {
        write_octal(&mut self.raw.bytes[100..108], u64::from(mode));
    }

    /// Set the payload size field.
    pub fn set_size(&mut self, size: u64) {
        write_octal(&mut self.raw.bytes[124..136], size);
    }

    /// Set the mtime field.
    pub fn set_mtime(&mut self, mtime: u64) {
        write_octal(&mut self.raw.bytes[136..148], mtime);
    }

    /// Set the typeflag byte.
    pub fn set_entry_type(&mut self, entry_type: EntryType) {
        self.raw.bytes[156] = entry_type.to_byte();
    }

    /// Recompute and store the checksum. Call after all other setters.
    pub fn set_checksum(&mut self) {
        let sum = self.compute_checksum();
        // Traditional encoding: six octal digits, NUL, space.
        let field = &mut self.raw.bytes[148..156];
        field.copy_from_slice(b"000000\0 ");
        let mut value = sum;
        for slot in field[..6].iter_mut().rev() {
            *slot = b'0' + (value % 8) as u8;
            value /= 8;
        }
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new_ustar()
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("path", &String::from_utf8_lossy(self.path_bytes()))
            .field("entry_type", &self.entry_type())
            .field("size", &self.entry_size().ok())
            .field("mode", &self.mode().ok().map(|m| format!("{m:04o}")))
            .finish()
    }
}

fn write_str_field(field: &mut [u8], value: &[u8], name: &'static str) -> Result<()> {
    if value.len() > field.len() {
        return Err(HeaderError::FieldTooLong {
            field: name,
            len: value.len(),
        });
    }
    field.fill(0);
    field[..value.len()].copy_from_slice(value);
    Ok(())
}

fn write_octal(field: &mut [u8], value: u64) {
    // Zero-padded octal digits with a trailing NUL, GNU tar style.
    field.fill(b'0');
    let last = field.len() - 1;
    field[last] = 0;
    let mut value = value;
    for slot in field[..last].iter_mut().rev() {
        *slot = b'0' + (value % 8) as u8;
        value /= 8;
    }
}

/// Parse an octal ASCII field into a u64.
///
/// Fields may carry leading spaces and trailing spaces or NUL bytes;
/// an all-blank field parses as zero.
///
/// # Errors
///
/// Returns [`HeaderError::InvalidNumeric`] on non-octal characters or
/// overflow.
pub fn parse_octal(bytes: &[u8]) -> Result<u64> {
    let start = bytes.iter().position(|&b| b != b' ').unwrap_or(bytes.len());
    let end = bytes[start..]
        .iter()
        .position(|&b| b == b' ' || b == b'\0')
        .map_or(bytes.len(), |i| start + i);

    let trimmed = &bytes[start..end];
    if trimmed.is_empty() {
        return Ok(0);
    }

    let mut value: u64 = 0;
    for &byte in trimmed {
        if !(b'0'..=b'7').contains(&byte) {
            return Err(HeaderError::InvalidNumeric(bytes.to_vec()));
        }
        value = value
            .checked_mul(8)
            .and_then(|v| v.checked_add(u64::from(byte - b'0')))
            .ok_or_else(|| HeaderError::InvalidNumeric(bytes.to_vec()))?;
    }

    Ok(value)
}

/// Parse a numeric field that may be octal ASCII or GNU base-256.
///
/// When the high bit of the first byte is set, the remaining bits hold
/// the value in big-endian binary; otherwise the field is octal ASCII.
///
/// # Errors
///
/// Returns [`HeaderError::InvalidNumeric`] if parsing fails or the
/// value overflows u64.
pub fn parse_numeric(bytes: &[u8]) -> Result<u64> {
    if bytes.is_empty() {
        return Ok(0);
    }

    if bytes[0] & 0x80 != 0 {
        let mut value: u64 = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            let b = if i == 0 { byte & 0x7f } else { byte };
            value = value
                .checked_shl(8)
                .and_then(|v| v.checked_add(u64::from(b)))
                .ok_or_else(|| HeaderError::InvalidNumeric(bytes.to_vec()))?;
        }
        Ok(value)
    } else {
        parse_octal(bytes)
    }
}

/// Truncate a byte slice at the first NUL byte.
///
/// # Example
///
/// ```
/// use tar_parser::truncate_null;
///
/// assert_eq!(truncate_null(b"hello\0world"), b"hello");
/// assert_eq!(truncate_null(b"no null here"), b"no null here");
/// ```
#[must_use]
pub fn truncate_null(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(pos) => &bytes[..pos],
        None => bytes,
    }
}

/// Error parsing a PAX extension record.
#[derive(Debug, Error)]
pub enum PaxError {
    /// The record format is malformed.
    #[error("malformed PAX extension record")]
    Malformed,

    /// The key is not valid UTF-8.
    #[error("PAX key is not valid UTF-8: {0}")]
    InvalidKey(#[from] std::str::Utf8Error),
}

/// A single PAX extended header key/value pair.
#[derive(Debug, Clone)]
pub struct PaxExtension<'a> {
    key: &'a [u8],
    value: &'a [u8],
}

impl<'a> PaxExtension<'a> {
    /// Returns the key as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not valid UTF-8.
    pub fn key(&self) -> std::result::Result<&'a str, std::str::Utf8Error> {
        std::str::from_utf8(self.key)
    }

    /// Returns the raw value bytes.
    #[must_use]
    pub fn value_bytes(&self) -> &'a [u8] {
        self.value
    }
}

/// Iterator over PAX extended header records.
///
/// Records have the form `<length> <key>=<value>\n` where `<length>`
/// counts the whole record including the length field itself.
///
/// # Example
///
/// ```
/// use tar_parser::PaxExtensions;
///
/// let data = b"20 path=foo/bar.txt\n";
/// let ext = PaxExtensions::new(data).next().unwrap().unwrap();
/// assert_eq!(ext.key().unwrap(), "path");
/// assert_eq!(ext.value_bytes(), b"foo/bar.txt");
/// ```
#[derive(Debug)]
pub struct PaxExtensions<'a> {
    data: &'a [u8],
}

impl<'a> PaxExtensions<'a> {
    /// Create a new iterator over PAX extension records.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl<'a> Iterator for PaxExtensions<'a> {
    type Item = std::result::Result<PaxExtension<'a>, PaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }

        let space_pos = self.data.iter().position(|&b| b == b' ')?;
        let len_str = std::str::from_utf8(&self.data[..space_pos]).ok()?;
        let len: usize = len_str.parse().ok()?;

        if len > self.data.len() || len < space_pos + 2 {
            return Some(Err(PaxError::Malformed));
        }
        if self.data.get(len.saturating_sub(1)) != Some(&b'\n') {
            return Some(Err(PaxError::Malformed));
        }

        let kv = &self.data[space_pos + 1..len - 1];
        let eq_pos = match kv.iter().position(|&b| b == b'=') {
            Some(pos) => pos,
            None => return Some(Err(PaxError::Malformed)),
        };

        let key = &kv[..eq_pos];
        let value = &kv[eq_pos + 1..];
        self.data = &self.data[len..];

        Some(Ok(PaxExtension { key, value }))
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(size_of::<RawHeader>(), BLOCK_SIZE);
        assert_eq!(size_of::<Header>(), BLOCK_SIZE);
    }

    #[test]
    fn test_new_ustar() {
        let header = Header::new_ustar();
        assert!(header.is_ustar());
        assert!(!header.is_gnu());
    }

    #[test]
    fn test_parse_octal() {
        assert_eq!(parse_octal(b"0000644\0").unwrap(), 0o644);
        assert_eq!(parse_octal(b"0000755\0").unwrap(), 0o755);
        assert_eq!(parse_octal(b"     123 ").unwrap(), 0o123);
        assert_eq!(parse_octal(b"0").unwrap(), 0);
        assert_eq!(parse_octal(b"").unwrap(), 0);
        assert_eq!(parse_octal(b"   \0\0\0").unwrap(), 0);
        assert_eq!(parse_octal(b"77777777777").unwrap(), 0o77777777777);
    }

    #[test]
    fn test_parse_octal_invalid() {
        assert!(parse_octal(b"abc").is_err());
        assert!(parse_octal(b"128").is_err());
    }

    #[test]
    fn test_parse_numeric_base256() {
        assert_eq!(parse_numeric(&[0x80, 0x00, 0x00, 0x01]).unwrap(), 1);
        assert_eq!(parse_numeric(&[0x80, 0x00, 0x01, 0x00]).unwrap(), 256);
        assert_eq!(parse_numeric(&[0x80, 0xFF]).unwrap(), 255);
    }

    #[test]
    fn test_truncate_null() {
        assert_eq!(truncate_null(b"hello\0world"), b"hello");
        assert_eq!(truncate_null(b"no null"), b"no null");
        assert_eq!(truncate_null(b"\0start"), b"");
        assert_eq!(truncate_null(b""), b"");
    }

    #[test]
    fn test_entry_type_roundtrip() {
        let types = [
            EntryType::Regular,
            EntryType::LegacyRegular,
            EntryType::Link,
            EntryType::Symlink,
            EntryType::Char,
            EntryType::Block,
            EntryType::Directory,
            EntryType::Fifo,
            EntryType::Continuous,
            EntryType::GnuLongName,
            EntryType::GnuLongLink,
            EntryType::GnuSparse,
            EntryType::XHeader,
            EntryType::XGlobalHeader,
        ];
        for t in types {
            assert_eq!(EntryType::from_byte(t.to_byte()), t);
        }
    }

    #[test]
    fn test_entry_type_predicates() {
        assert!(EntryType::Regular.is_file());
        assert!(EntryType::LegacyRegular.is_file());
        assert!(!EntryType::Directory.is_file());
        assert!(EntryType::Directory.is_dir());
        assert!(EntryType::Symlink.is_symlink());
    }

    #[test]
    fn test_setters_roundtrip() {
        let mut header = Header::new_ustar();
        header.set_path("pkg/index.js").unwrap();
        header.set_mode(0o644);
        header.set_size(42);
        header.set_mtime(1234567890);
        header.set_entry_type(EntryType::Regular);
        header.set_checksum();

        assert_eq!(header.path_bytes(), b"pkg/index.js");
        assert_eq!(header.mode().unwrap(), 0o644);
        assert_eq!(header.entry_size().unwrap(), 42);
        assert_eq!(header.mtime().unwrap(), 1234567890);
        assert_eq!(header.entry_type(), EntryType::Regular);
        header.verify_checksum().unwrap();
    }

    #[test]
    fn test_set_path_too_long() {
        let mut header = Header::new_ustar();
        let long = "x".repeat(101);
        assert!(matches!(
            header.set_path(&long),
            Err(HeaderError::FieldTooLong { field: "path", .. })
        ));
    }

    #[test]
    fn test_checksum_matches_tar_crate() {
        // Cross-check our checksum against a header produced by the
        // tar crate.
        let mut reference = tar::Header::new_ustar();
        reference.set_path("hello.txt").unwrap();
        reference.set_mode(0o644);
        reference.set_size(5);
        reference.set_mtime(0);
        reference.set_entry_type(tar::EntryType::Regular);
        reference.set_cksum();

        let block: &[u8; BLOCK_SIZE] = reference
            .as_bytes()
            .as_slice()
            .try_into()
            .expect("tar headers are 512 bytes");
        Header::from_block(block).verify_checksum().unwrap();
    }

    #[test]
    fn test_corrupt_checksum_detected() {
        let mut header = Header::new_ustar();
        header.set_path("a.txt").unwrap();
        header.set_checksum();
        header.as_mut_bytes()[0] = b'b';
        assert!(matches!(
            header.verify_checksum(),
            Err(HeaderError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_is_empty() {
        let mut header = Header::new_ustar();
        assert!(!header.is_empty());
        header.as_mut_bytes().fill(0);
        assert!(header.is_empty());
    }

    #[test]
    fn test_pax_extensions() {
        let data = b"20 path=foo/bar.txt\n26 linkpath=../target.txt\n";
        let mut iter = PaxExtensions::new(data);

        let ext = iter.next().unwrap().unwrap();
        assert_eq!(ext.key().unwrap(), "path");
        assert_eq!(ext.value_bytes(), b"foo/bar.txt");

        let ext = iter.next().unwrap().unwrap();
        assert_eq!(ext.key().unwrap(), "linkpath");
        assert_eq!(ext.value_bytes(), b"../target.txt");

        assert!(iter.next().is_none());
    }

    #[test]
    fn test_pax_malformed() {
        let mut iter = PaxExtensions::new(b"20 pathfoo/bar.txtxx\n");
        assert!(matches!(iter.next(), Some(Err(PaxError::Malformed))));
    }
}
