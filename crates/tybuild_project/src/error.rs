//! Error types for project generation.

use std::path::PathBuf;

use tybuild_deps::DepsError;

/// Errors that abort a generation or export run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// An I/O error occurred while reading templates or writing outputs.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A directory the run depends on does not exist.
    #[error("{what} directory not found: {}", path.display())]
    MissingDirectory {
        /// Which directory (`source`, `template`, ...).
        what: &'static str,
        /// The expected location.
        path: PathBuf,
    },

    /// Discovery found nothing to generate.
    #[error("no projects found in {}", path.display())]
    NoProjects {
        /// The project discovery root.
        path: PathBuf,
    },

    /// No template exists for a discovered project type.
    #[error("template not found: {} (expected template for project type '{project_type}')", path.display())]
    TemplateNotFound {
        /// The project type lacking a template.
        project_type: String,
        /// The template file that was looked for.
        path: PathBuf,
    },

    /// A template could not be parsed or rewritten as XML.
    #[error("malformed XML in {}: {reason}", path.display())]
    Xml {
        /// The offending file.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// The plan cache could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// Dependency scanning failed.
    #[error(transparent)]
    Deps(#[from] DepsError),
}

impl GenerateError {
    /// Returns `true` for failures caused by the repository layout or the
    /// caller's input rather than by the environment or a bug.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            GenerateError::MissingDirectory { .. }
            | GenerateError::NoProjects { .. }
            | GenerateError::TemplateNotFound { .. }
            | GenerateError::Xml { .. } => true,
            GenerateError::Deps(e) => e.is_invalid_input(),
            GenerateError::Io { .. } | GenerateError::Serialization { .. } => false,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> GenerateError {
        let path = path.into();
        move |source| GenerateError::Io { path, source }
    }
}
