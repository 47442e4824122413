//! Dependency queries over a scanned tree.

use std::path::{Path, PathBuf};

use tybuild_diagnostics::DiagnosticSink;

use crate::cache::DependencyCache;
use crate::changes::ChangeSet;
use crate::error::DepsError;
use crate::graph::build_dependency_graph;
use crate::kind::FileKind;
use crate::resolve::IncludeResolver;
use crate::scan::{ensure_file_in_cache, scan};

/// Default name of the include cache inside the scanned root.
pub const CACHE_FILE: &str = "includes.cache";

/// Everything reachable from one start file, split by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyClosure {
    /// Key of the start file.
    pub start: String,
    /// Reachable `.cpp` files, sorted, never including `start`.
    pub sources: Vec<String>,
    /// Reachable `.h` files, sorted, never including `start`.
    pub headers: Vec<String>,
}

/// A scanned tree that can answer many dependency queries.
///
/// Opening the scanner performs one scan and persists the cache; queries after
/// that only add transient entries for start files the scan did not cover.
#[derive(Debug)]
pub struct DependencyScanner {
    resolver: IncludeResolver,
    cache: DependencyCache,
    changes: ChangeSet,
}

impl DependencyScanner {
    /// Scans `root`, loading and saving the cache at `cache_path`.
    pub fn open(
        root: &Path,
        cache_path: &Path,
        refresh: bool,
        sink: &DiagnosticSink,
    ) -> Result<Self, DepsError> {
        if !root.is_dir() {
            return Err(DepsError::NotFound {
                path: root.display().to_string(),
            });
        }
        let resolver = IncludeResolver::new(root)?;
        let outcome = scan(&resolver, cache_path, refresh, sink)?;
        Ok(Self {
            resolver,
            cache: outcome.cache,
            changes: outcome.changes,
        })
    }

    /// The canonical scanned root.
    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// The cache as of the last query.
    pub fn cache(&self) -> &DependencyCache {
        &self.cache
    }

    /// What the opening scan found changed.
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Absolute path of a cache key.
    pub fn path_of(&self, key: &str) -> PathBuf {
        self.root().join(key)
    }

    /// Computes everything reachable from `start`.
    pub fn dependency_closure(
        &mut self,
        start: &Path,
        sink: &DiagnosticSink,
    ) -> Result<DependencyClosure, DepsError> {
        let key = ensure_file_in_cache(&self.resolver, &mut self.cache, start, sink)?;
        let graph = build_dependency_graph(&self.cache);
        let mut sources = Vec::new();
        let mut headers = Vec::new();
        for reached in graph.transitive_reachable(&key) {
            if reached == key {
                continue;
            }
            match FileKind::of(&reached) {
                Some(FileKind::Source) => sources.push(reached),
                Some(FileKind::Header) => headers.push(reached),
                None => {}
            }
        }
        tracing::debug!(
            "{key}: {} sources, {} headers reachable",
            sources.len(),
            headers.len()
        );
        Ok(DependencyClosure {
            start: key,
            sources,
            headers,
        })
    }

    /// Sorted `.cpp` files reachable from `start`, excluding `start`.
    pub fn cpp_dependencies(
        &mut self,
        start: &Path,
        sink: &DiagnosticSink,
    ) -> Result<Vec<String>, DepsError> {
        Ok(self.dependency_closure(start, sink)?.sources)
    }
}

/// Scans `root` (cache at `<root>/includes.cache`) and returns the sorted
/// `.cpp` files reachable from `start`, excluding `start`.
pub fn get_cpp_dependencies(
    root: &Path,
    start: &Path,
    refresh: bool,
    sink: &DiagnosticSink,
) -> Result<Vec<String>, DepsError> {
    let mut scanner = DependencyScanner::open(root, &root.join(CACHE_FILE), refresh, sink)?;
    scanner.cpp_dependencies(start, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn closure_splits_sources_and_headers() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "Main.cpp", "#include \"Net.h\"\n");
        write(root, "Net.h", "#include \"Log.h\"\n");
        write(root, "Net.cpp", "#include \"Net.h\"\n");
        write(root, "Log.h", "");
        let sink = DiagnosticSink::new();
        let mut scanner =
            DependencyScanner::open(root, &root.join(CACHE_FILE), false, &sink).unwrap();
        let closure = scanner
            .dependency_closure(&root.join("Main.cpp"), &sink)
            .unwrap();
        assert_eq!(closure.start, "Main.cpp");
        assert_eq!(closure.sources, vec!["Net.cpp"]);
        assert_eq!(closure.headers, vec!["Log.h", "Net.h"]);
    }

    #[test]
    fn start_is_never_its_own_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "Net.cpp", "#include \"Net.h\"\n");
        write(root, "Net.h", "");
        let deps =
            get_cpp_dependencies(root, &root.join("Net.cpp"), false, &DiagnosticSink::new())
                .unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn missing_root_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = get_cpp_dependencies(
            &missing,
            &missing.join("Main.cpp"),
            false,
            &DiagnosticSink::new(),
        )
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn scanner_serves_several_queries() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "a/One.cpp", "#include \"../lib/Util.h\"\n");
        write(root, "b/Two.cpp", "");
        write(root, "lib/Util.h", "");
        write(root, "lib/Util.cpp", "");
        let sink = DiagnosticSink::new();
        let mut scanner =
            DependencyScanner::open(root, &root.join(CACHE_FILE), false, &sink).unwrap();
        assert_eq!(
            scanner.cpp_dependencies(&root.join("a/One.cpp"), &sink).unwrap(),
            vec!["lib/Util.cpp"]
        );
        assert!(scanner
            .cpp_dependencies(&root.join("b/Two.cpp"), &sink)
            .unwrap()
            .is_empty());
        assert_eq!(scanner.changes().new_files.len(), 4);
    }
}
