/// Limits applied while decoding, bounding attacker-controlled
/// allocations before entry payloads are even considered.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum length of an entry path in bytes (from any source:
    /// header name+prefix, GNU long name, or PAX `path`).
    pub max_path_len: usize,

    /// Maximum total size of one PAX extended header payload.
    pub max_pax_size: usize,

    /// Maximum size of one GNU long name or long link payload.
    pub max_gnu_long_size: usize,

    /// Maximum number of metadata records (GNU long name/link, PAX)
    /// that may precede a single entry.
    pub max_pending_records: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_path_len: 4096,
            max_pax_size: 1024 * 1024,
            max_gnu_long_size: 4096,
            max_pending_records: 16,
        }
    }
}

impl Limits {
    /// Permissive limits for archives from trusted sources.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            max_path_len: 65536,
            max_pax_size: 16 * 1024 * 1024,
            max_gnu_long_size: 65536,
            max_pending_records: 256,
        }
    }

    /// Strict limits for archives from untrusted sources.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_path_len: 1024,
            max_pax_size: 64 * 1024,
            max_gnu_long_size: 1024,
            max_pending_records: 4,
        }
    }
}
