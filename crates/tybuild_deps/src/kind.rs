//! Classification of scanned files by extension.

use std::path::Path;

use tybuild_common::posix_extension;

/// Extension of compiled units.
pub const SOURCE_EXT: &str = "cpp";

/// Extension of headers.
pub const HEADER_EXT: &str = "h";

/// The two kinds of file the scanner understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// A compiled unit (`.cpp`).
    Source,
    /// A header (`.h`).
    Header,
}

impl FileKind {
    /// Classifies a POSIX relative path. Returns `None` for anything else.
    pub fn of(rel: &str) -> Option<FileKind> {
        Self::from_extension(posix_extension(rel)?)
    }

    /// Classifies a filesystem path.
    pub fn of_path(path: &Path) -> Option<FileKind> {
        Self::from_extension(path.extension()?.to_str()?)
    }

    fn from_extension(ext: &str) -> Option<FileKind> {
        match ext {
            SOURCE_EXT => Some(FileKind::Source),
            HEADER_EXT => Some(FileKind::Header),
            _ => None,
        }
    }
}

/// Returns `true` if `rel` names a compiled unit.
pub fn is_compiled_unit(rel: &str) -> bool {
    FileKind::of(rel) == Some(FileKind::Source)
}
