//! Two-level project discovery.
//!
//! Every directory directly under the project root is a project type, and
//! every `.cpp` file directly inside a type directory is the entry file of one
//! project named after its stem:
//!
//! ```text
//! src/project/console/Server.cpp   -> console/Server
//! src/project/gui/Editor.cpp       -> gui/Editor
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use tybuild_deps::SOURCE_EXT;
use walkdir::WalkDir;

/// A discovered project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Project name, the entry file's stem.
    pub name: String,
    /// Project type, the name of the enclosing directory.
    pub kind: String,
    /// Path of the entry `.cpp` file.
    pub entry_file: PathBuf,
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Discovers projects under `project_root`, sorted by `(type, name)`.
///
/// A missing project root yields no projects.
pub fn discover_projects(project_root: &Path) -> Vec<Project> {
    if !project_root.is_dir() {
        tracing::debug!("project root {} does not exist", project_root.display());
        return Vec::new();
    }
    let mut projects = Vec::new();
    for entry in WalkDir::new(project_root).min_depth(2).max_depth(2) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {e}");
                continue;
            }
        };
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXT) || !path.is_file() {
            continue;
        }
        let name = path.file_stem().and_then(|s| s.to_str());
        let kind = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|s| s.to_str());
        if let (Some(name), Some(kind)) = (name, kind) {
            projects.push(Project {
                name: name.to_string(),
                kind: kind.to_string(),
                entry_file: path.to_path_buf(),
            });
        }
    }
    projects.sort_by(|a, b| (&a.kind, &a.name).cmp(&(&b.kind, &b.name)));
    projects
}
