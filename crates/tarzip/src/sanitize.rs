//! Per-entry path validation, remapping and metadata normalization.

use std::path::{Path, PathBuf};

use log::debug;
use tar_parser::decode::TarEntry;

/// Mode given to files with no execute bit set in the source.
pub const NONEXEC_MODE: u32 = 0o644;

/// Mode given to directories and to files with any execute bit set.
pub const EXEC_MODE: u32 = 0o755;

/// What kind of object a sanitized entry materializes as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory.
    Directory,
    /// A regular file.
    File,
    /// A symbolic link with the given target, stored verbatim.
    Symlink {
        /// The link target.
        target: String,
    },
}

/// An entry that passed validation, with its destination path and
/// normalized mode.
#[derive(Debug, Clone)]
pub struct SanitizedEntry {
    /// Where the entry lands in the output archive.
    pub mapped_path: PathBuf,
    /// Normalized permission bits (meaningless for symlinks).
    pub mode: u32,
    /// What to create.
    pub kind: EntryKind,
}

/// Validate one decoded entry and compute its destination.
///
/// Returns `None` (a silent skip, logged at debug) when the entry is
/// unsafe or stripped away:
///
/// - the raw path is absolute;
/// - any raw `/`-separated segment is `..` (checked before any
///   normalization or joining, so `a/../../x` never escapes by way of
///   a prefix that happens to re-anchor it);
/// - after dropping empty and `.` segments, no more than
///   `strip_components` segments remain.
///
/// Surviving paths lose their first `strip_components` segments and
/// are re-joined under `prefix`. Modes collapse to two classes:
/// directories are always [`EXEC_MODE`]; files are [`EXEC_MODE`] when
/// any execute bit is set in the source mode and [`NONEXEC_MODE`]
/// otherwise. Symlinks carry only their target.
#[must_use]
pub fn sanitize_entry(
    entry: &TarEntry,
    strip_components: usize,
    prefix: &Path,
) -> Option<SanitizedEntry> {
    let raw = entry.path_lossy();

    if raw.starts_with('/') {
        debug!("skipping absolute path {raw:?}");
        return None;
    }
    if raw.split('/').any(|segment| segment == "..") {
        debug!("skipping parent-traversal path {raw:?}");
        return None;
    }

    let segments: Vec<&str> = raw
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    if segments.len() <= strip_components {
        debug!("skipping {raw:?}: stripped away by strip_components={strip_components}");
        return None;
    }

    let mapped_path = prefix.join(segments[strip_components..].join("/"));

    let (kind, mode) = if entry.is_dir() {
        (EntryKind::Directory, EXEC_MODE)
    } else if entry.is_file() {
        let mode = if entry.mode & 0o111 != 0 {
            EXEC_MODE
        } else {
            NONEXEC_MODE
        };
        (EntryKind::File, mode)
    } else if entry.is_symlink() {
        let target = match &entry.link_target {
            Some(target) => String::from_utf8_lossy(target).into_owned(),
            None => {
                debug!("skipping symlink {raw:?} with no target");
                return None;
            }
        };
        (EntryKind::Symlink { target }, 0o777)
    } else {
        // The decoder only emits files, directories and symlinks.
        debug!("skipping unsupported entry {raw:?}");
        return None;
    };

    Some(SanitizedEntry {
        mapped_path,
        mode,
        kind,
    })
}
