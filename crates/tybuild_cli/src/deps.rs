//! `tybuild deps` — list the compile units a file depends on.
//!
//! Scans the tree under `<root>` (refreshing `<root>/includes.cache`), then
//! prints every `.cpp` file reachable from `<start>` through includes and
//! header/source pairing, one root-relative path per line.

use std::error::Error;
use std::path::{Path, PathBuf};

use tybuild_deps::{DependencyScanner, CACHE_FILE};
use tybuild_diagnostics::DiagnosticSink;

use crate::pipeline::{absolute, render_diagnostics};
use crate::{DepsArgs, GlobalArgs};

/// Runs the `tybuild deps` command.
pub fn run(args: &DepsArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let root = absolute(Path::new(&args.root))?;
    let start = resolve_start(&root, &args.start)?;

    let sink = DiagnosticSink::new();
    let result = DependencyScanner::open(&root, &root.join(CACHE_FILE), args.refresh, &sink)
        .and_then(|mut scanner| scanner.cpp_dependencies(&start, &sink));
    render_diagnostics(&sink, global);

    for dep in result? {
        println!("{dep}");
    }
    Ok(0)
}

/// Locates the start file: absolute paths are used as given, relative ones
/// are tried against the current directory first and then against `root`.
fn resolve_start(root: &Path, start: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = Path::new(start);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let from_cwd = absolute(path)?;
    if from_cwd.exists() {
        Ok(from_cwd)
    } else {
        Ok(root.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn start_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("OnlyUnderRoot_7f3a.cpp"), "").unwrap();
        let start = resolve_start(root, "OnlyUnderRoot_7f3a.cpp").unwrap();
        assert_eq!(start, root.join("OnlyUnderRoot_7f3a.cpp"));
    }

    #[test]
    fn absolute_start_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let abs = dir.path().join("Main.cpp");
        let start = resolve_start(Path::new("/elsewhere"), &abs.display().to_string()).unwrap();
        assert_eq!(start, abs);
    }
}
