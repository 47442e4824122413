//! Resolution of include strings to files inside the scanned root.
//!
//! Search order, first hit wins:
//! 1. relative to the directory of the including file,
//! 2. relative to the root.
//!
//! A candidate is accepted only if it exists as a file and its canonical path
//! lies inside the canonical root, so `..` or symlink escapes are rejected
//! even when the target exists.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tybuild_common::relative_posix;
use tybuild_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

use crate::error::DepsError;

/// Code of the diagnostic emitted for an include that cannot be resolved.
pub const UNRESOLVED_INCLUDE: DiagnosticCode = DiagnosticCode::new(Category::Include, 101);

/// Outcome of resolving one include string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The include names this file, as a POSIX path relative to the root.
    Resolved(String),
    /// Neither search location produced a file inside the root.
    Unresolved(UnresolvedInclude),
}

/// Why an include was dropped from the dependency set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedInclude {
    /// The include string as written.
    pub include: String,
    /// The file containing the directive.
    pub includer: PathBuf,
    /// The root that was searched.
    pub root: PathBuf,
}

impl UnresolvedInclude {
    /// Converts this failure into a warning diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::warning(
            UNRESOLVED_INCLUDE,
            format!("could not resolve include \"{}\"", self.include),
        )
        .with_path(&self.includer)
        .with_note(format!(
            "tried relative to the including file and relative to root '{}'",
            self.root.display()
        ))
    }
}

impl fmt::Display for UnresolvedInclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not resolve include '{}' from '{}' (tried relative to file and relative to root '{}')",
            self.include,
            self.includer.display(),
            self.root.display()
        )
    }
}

/// Resolves include strings against a fixed, canonical root.
#[derive(Debug, Clone)]
pub struct IncludeResolver {
    root: PathBuf,
}

impl IncludeResolver {
    /// Creates a resolver for `root`, canonicalizing it.
    pub fn new(root: &Path) -> Result<Self, DepsError> {
        let root = root.canonicalize().map_err(|source| DepsError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(Self { root })
    }

    /// The canonical root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `include`, written in `includer`.
    pub fn resolve(&self, includer: &Path, include: &str) -> Resolution {
        let beside = includer
            .parent()
            .map(|dir| dir.join(include))
            .and_then(|candidate| self.accept(&candidate));
        if let Some(rel) = beside.or_else(|| self.accept(&self.root.join(include))) {
            return Resolution::Resolved(rel);
        }
        Resolution::Unresolved(UnresolvedInclude {
            include: include.to_string(),
            includer: includer.to_path_buf(),
            root: self.root.clone(),
        })
    }

    /// Resolves every include of `includer`, reporting failures to `sink`.
    ///
    /// Returns the deduplicated, sorted set of resolved relative paths.
    pub fn resolve_all(
        &self,
        includer: &Path,
        includes: &[String],
        sink: &DiagnosticSink,
    ) -> Vec<String> {
        let mut resolved = BTreeSet::new();
        for include in includes {
            match self.resolve(includer, include) {
                Resolution::Resolved(rel) => {
                    resolved.insert(rel);
                }
                Resolution::Unresolved(unresolved) => {
                    tracing::debug!("{unresolved}");
                    sink.emit(unresolved.to_diagnostic());
                }
            }
        }
        resolved.into_iter().collect()
    }

    /// Returns the root-relative path of `candidate` if it is an existing file
    /// inside the root.
    fn accept(&self, candidate: &Path) -> Option<String> {
        let canonical = candidate.canonicalize().ok()?;
        if !canonical.is_file() || !canonical.starts_with(&self.root) {
            return None;
        }
        relative_posix(&canonical, &self.root)
    }
}
