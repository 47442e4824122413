//! Error types for dependency scanning and queries.

use std::path::PathBuf;

/// Errors that can occur while scanning a tree or answering a dependency query.
///
/// Most scanning problems are not errors at all: unreadable sources contribute
/// no includes, unresolved includes become diagnostics, and a corrupt cache
/// file is treated as empty. The variants here are the failures a caller has
/// to act on.
#[derive(Debug, thiserror::Error)]
pub enum DepsError {
    /// An I/O error occurred while reading the tree or writing the cache.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The query start file lies outside the scanned root.
    #[error("file '{}' is not under root '{}'", path.display(), root.display())]
    NotUnderRoot {
        /// The offending file.
        path: PathBuf,
        /// The root it was expected under.
        root: PathBuf,
    },

    /// The query start file or the scanned root does not exist.
    #[error("file '{path}' does not exist")]
    NotFound {
        /// Path of the missing file, relative to the root when it lies under one.
        path: String,
    },

    /// The cache could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

impl DepsError {
    /// Returns `true` for errors caused by the caller's input rather than by
    /// the environment or a bug.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, DepsError::NotUnderRoot { .. } | DepsError::NotFound { .. })
    }
}
