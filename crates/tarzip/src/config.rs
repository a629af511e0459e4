//! Conversion and pool options.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How entries are compressed into the output zip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Per-entry decision: deflate at the default level, but store
    /// entries whose deflated form would not be smaller.
    #[default]
    Mixed,
    /// A fixed deflate level; `0` stores everything uncompressed.
    Level(u32),
}

impl FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("mixed") {
            return Ok(CompressionLevel::Mixed);
        }
        match s.parse::<u32>() {
            Ok(level) if level <= 9 => Ok(CompressionLevel::Level(level)),
            _ => Err(format!(
                "invalid compression level {s:?}: expected \"mixed\" or 0..=9"
            )),
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionLevel::Mixed => write!(f, "mixed"),
            CompressionLevel::Level(level) => write!(f, "{level}"),
        }
    }
}

/// Options for one conversion.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Number of leading path segments to drop from every entry.
    pub strip_components: usize,

    /// Directory under which surviving entries are placed in the
    /// output. Empty means the archive root.
    pub prefix_path: PathBuf,

    /// Output compression policy.
    pub compression_level: CompressionLevel,
}

/// Which scheduling strategy a [`TaskPool`](crate::pool::TaskPool)
/// uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolMode {
    /// Semaphore-bounded tasks on the blocking thread pool.
    Async,
    /// Dedicated worker threads consuming from a shared queue.
    #[default]
    Workers,
}

/// Pool construction parameters.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Scheduling strategy.
    pub mode: PoolMode,
    /// Concurrency bound: at most this many jobs run at once.
    pub size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            mode: PoolMode::default(),
            size: std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn test_compression_level_parsing() {
        assert_eq!(
            "mixed".parse::<CompressionLevel>().unwrap(),
            CompressionLevel::Mixed
        );
        assert_eq!(
            "Mixed".parse::<CompressionLevel>().unwrap(),
            CompressionLevel::Mixed
        );
        assert_eq!(
            "0".parse::<CompressionLevel>().unwrap(),
            CompressionLevel::Level(0)
        );
        assert_eq!(
            "9".parse::<CompressionLevel>().unwrap(),
            CompressionLevel::Level(9)
        );
        assert!("10".parse::<CompressionLevel>().is_err());
        assert!("fast".parse::<CompressionLevel>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for level in [CompressionLevel::Mixed, CompressionLevel::Level(6)] {
            assert_eq!(level.to_string().parse::<CompressionLevel>(), Ok(level));
        }
    }

    #[test]
    fn test_pool_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.mode, PoolMode::Workers);
        assert!(config.size >= 1);
    }
}
