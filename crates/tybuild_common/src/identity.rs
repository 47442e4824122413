//! Lightweight file identities for change detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// The `(size, modification time)` pair used as a cheap "content unchanged" proxy.
///
/// This is not a content hash: an edit that preserves both size and mtime goes
/// unnoticed, and a touch without an edit is reported as a change. Every cache
/// in tybuild compares identities rather than file contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct FileIdentity {
    /// File size in bytes.
    pub size: u64,
    /// Modification time in nanoseconds since the Unix epoch.
    pub mtime_ns: u64,
}

impl FileIdentity {
    /// Creates an identity from its raw parts.
    pub fn new(size: u64, mtime_ns: u64) -> Self {
        Self { size, mtime_ns }
    }

    /// Reads the current identity of the file at `path`.
    pub fn of(path: &Path) -> io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self::from_metadata(&meta))
    }

    /// Builds an identity from already-fetched metadata.
    ///
    /// Timestamps before the epoch or unsupported by the platform map to `0`.
    pub fn from_metadata(meta: &Metadata) -> Self {
        let mtime_ns = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self {
            size: meta.len(),
            mtime_ns,
        }
    }

    /// Returns `true` if a file with identity `self` must be re-examined given
    /// the freshly observed identity `current`.
    pub fn is_stale(&self, current: &FileIdentity) -> bool {
        self.size != current.size || self.mtime_ns != current.mtime_ns
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes @ {}ns", self.size, self.mtime_ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_identities_not_stale() {
        let a = FileIdentity::new(10, 1_000);
        assert!(!a.is_stale(&FileIdentity::new(10, 1_000)));
    }

    #[test]
    fn size_change_is_stale() {
        let a = FileIdentity::new(10, 1_000);
        assert!(a.is_stale(&FileIdentity::new(11, 1_000)));
    }

    #[test]
    fn mtime_change_is_stale() {
        let a = FileIdentity::new(10, 1_000);
        assert!(a.is_stale(&FileIdentity::new(10, 1_001)));
    }

    #[test]
    fn stale_matches_field_inequality() {
        let samples = [(0, 0), (0, 1), (1, 0), (1, 1), (42, 7)];
        for &(s1, m1) in &samples {
            for &(s2, m2) in &samples {
                let old = FileIdentity::new(s1, m1);
                let new = FileIdentity::new(s2, m2);
                assert_eq!(old.is_stale(&new), s1 != s2 || m1 != m2);
                assert_eq!(old.is_stale(&new), old != new);
            }
        }
    }

    #[test]
    fn of_reads_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.cpp");
        std::fs::write(&path, "int main() {}\n").unwrap();
        let id = FileIdentity::of(&path).unwrap();
        assert_eq!(id.size, 14);
        assert!(id.mtime_ns > 0);
    }

    #[test]
    fn of_missing_file_errors() {
        assert!(FileIdentity::of(Path::new("/nonexistent/file.h")).is_err());
    }

    #[test]
    fn display_format() {
        let id = FileIdentity::new(12, 345);
        assert_eq!(id.to_string(), "12 bytes @ 345ns");
    }

    #[test]
    fn serde_field_names() {
        let id = FileIdentity::new(3, 9);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#"{"size":3,"mtime_ns":9}"#);
        let back: FileIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
