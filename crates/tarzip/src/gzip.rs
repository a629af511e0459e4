//! Gzip detection and streaming inflation of the source archive.

use std::io::Read;

use flate2::read::GzDecoder;

/// The two-byte gzip magic number.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Sniff a stream prefix for the gzip magic.
#[must_use]
pub fn is_gzip(prefix: &[u8]) -> bool {
    prefix.len() >= GZIP_MAGIC.len() && prefix[..GZIP_MAGIC.len()] == GZIP_MAGIC
}

/// Wrap a compressed reader in a streaming inflater. Output is
/// produced on demand; the inflated stream is never materialized as a
/// whole.
pub fn inflater<R: Read>(compressed: R) -> GzDecoder<R> {
    GzDecoder::new(compressed)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn test_sniffing() {
        assert!(is_gzip(&[0x1f, 0x8b, 0x08]));
        assert!(!is_gzip(&[0x1f]));
        assert!(!is_gzip(b"ustar"));
        assert!(!is_gzip(&[]));
    }

    #[test]
    fn test_inflate_round_trip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"payload bytes").unwrap();
        let compressed = encoder.finish().unwrap();
        assert!(is_gzip(&compressed));

        let mut inflated = Vec::new();
        inflater(&compressed[..])
            .read_to_end(&mut inflated)
            .unwrap();
        assert_eq!(inflated, b"payload bytes");
    }
}
