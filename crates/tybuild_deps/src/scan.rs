//! Incremental scanning of a source tree into the include cache.
//!
//! A scan loads the persisted cache (unless refreshing), drops entries for
//! deleted files, reparses only files whose identity changed, and writes the
//! cache back atomically.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use tybuild_common::{relative_posix, FileIdentity};
use tybuild_diagnostics::DiagnosticSink;
use walkdir::WalkDir;

use crate::cache::{CacheEntry, DependencyCache};
use crate::changes::{detect_changes, ChangeSet};
use crate::error::DepsError;
use crate::include::read_includes;
use crate::kind::FileKind;
use crate::resolve::IncludeResolver;

/// Result of a scan: the up-to-date cache and what changed.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// The cache after rescanning stale files.
    pub cache: DependencyCache,
    /// Classification of files against the previously persisted cache.
    pub changes: ChangeSet,
}

/// Scans `resolver.root()` and persists the result to `cache_path`.
///
/// With `refresh` the persisted cache is ignored and every file is reparsed.
pub fn scan(
    resolver: &IncludeResolver,
    cache_path: &Path,
    refresh: bool,
    sink: &DiagnosticSink,
) -> Result<ScanOutcome, DepsError> {
    let root = resolver.root();
    let mut cache = if refresh {
        tracing::debug!("refresh requested; ignoring {}", cache_path.display());
        DependencyCache::new()
    } else {
        DependencyCache::load(cache_path)
    };

    let files = enumerate_sources(root);
    let identities: BTreeMap<String, FileIdentity> = files
        .iter()
        .map(|(key, (_, identity))| (key.clone(), *identity))
        .collect();
    let changes = detect_changes(&identities, &cache);
    cache.prune(root);

    for key in changes.dirty_files() {
        let Some((path, identity)) = files.get(key) else {
            continue;
        };
        let includes = resolver.resolve_all(path, &read_includes(path), sink);
        tracing::debug!("parsed {key}: {} includes", includes.len());
        cache.insert(key.to_string(), CacheEntry::new(*identity, includes));
    }

    cache.save(cache_path)?;
    changes.log_summary();
    Ok(ScanOutcome { cache, changes })
}

/// Lists every `.cpp` and `.h` file under `root` with its current identity.
///
/// Symlinked files are included; symlinked directories are not descended.
/// Entries that cannot be read are skipped.
fn enumerate_sources(root: &Path) -> BTreeMap<String, (PathBuf, FileIdentity)> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {e}");
                continue;
            }
        };
        let path = entry.path();
        if FileKind::of_path(path).is_none() || !path.is_file() {
            continue;
        }
        let Some(key) = relative_posix(path, root) else {
            continue;
        };
        match FileIdentity::of(path) {
            Ok(identity) => {
                files.insert(key, (path.to_path_buf(), identity));
            }
            Err(e) => tracing::debug!("cannot stat {}: {e}", path.display()),
        }
    }
    files
}

/// Makes sure `file` has an entry in `cache`, returning its key.
///
/// A file that the scan did not cover (for example one with another extension)
/// is parsed on the spot and inserted as a transient entry. Nothing is written
/// to disk.
pub fn ensure_file_in_cache(
    resolver: &IncludeResolver,
    cache: &mut DependencyCache,
    file: &Path,
    sink: &DiagnosticSink,
) -> Result<String, DepsError> {
    let root = resolver.root();
    let absolute = absolutize(file)?;
    let key = relative_posix(&absolute, root).ok_or_else(|| DepsError::NotUnderRoot {
        path: file.to_path_buf(),
        root: root.to_path_buf(),
    })?;
    if cache.contains(&key) {
        return Ok(key);
    }
    if !absolute.is_file() {
        return Err(DepsError::NotFound { path: key });
    }

    let identity = FileIdentity::of(&absolute).map_err(|source| DepsError::Io {
        path: absolute.clone(),
        source,
    })?;
    let includes = resolver.resolve_all(&absolute, &read_includes(&absolute), sink);
    tracing::debug!("added transient entry for {key}");
    cache.insert(key.clone(), CacheEntry::new(identity, includes));
    Ok(key)
}

/// Turns `file` into an absolute path comparable with a canonical root.
///
/// The file itself need not exist: when it cannot be canonicalized, its
/// canonical parent is used, and failing that the path is normalized
/// lexically.
fn absolutize(file: &Path) -> Result<PathBuf, DepsError> {
    if let Ok(canonical) = file.canonicalize() {
        return Ok(canonical);
    }
    if let (Some(parent), Some(name)) = (file.parent(), file.file_name()) {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if let Ok(dir) = parent.canonicalize() {
            return Ok(dir.join(name));
        }
    }
    let absolute = std::path::absolute(file).map_err(|source| DepsError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    Ok(normalize_lexically(&absolute))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[(&str, &str)]) -> (TempDir, IncludeResolver) {
        let dir = TempDir::new().unwrap();
        for (rel, text) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, text).unwrap();
        }
        let resolver = IncludeResolver::new(dir.path()).unwrap();
        (dir, resolver)
    }

    #[test]
    fn scan_records_resolved_includes() {
        let (dir, r) = tree(&[
            ("Main.cpp", "#include \"core/Net.h\"\n#include <vector>\n"),
            ("core/Net.h", ""),
            ("core/Net.cpp", "#include \"Net.h\"\n"),
            ("notes.txt", "#include \"core/Net.h\"\n"),
        ]);
        let sink = DiagnosticSink::new();
        let out = scan(&r, &dir.path().join("includes.cache"), false, &sink).unwrap();

        assert_eq!(
            out.cache.keys().collect::<Vec<_>>(),
            vec!["Main.cpp", "core/Net.cpp", "core/Net.h"]
        );
        assert_eq!(out.cache.get("Main.cpp").unwrap().includes, vec!["core/Net.h"]);
        assert_eq!(out.cache.get("core/Net.cpp").unwrap().includes, vec!["core/Net.h"]);
        assert_eq!(out.changes.new_files.len(), 3);
        assert!(sink.is_empty());
    }

    #[test]
    fn unresolved_include_is_warned_and_dropped() {
        let (dir, r) = tree(&[("Main.cpp", "#include \"Missing.h\"\n")]);
        let sink = DiagnosticSink::new();
        let out = scan(&r, &dir.path().join("includes.cache"), false, &sink).unwrap();
        assert!(out.cache.get("Main.cpp").unwrap().includes.is_empty());
        assert_eq!(sink.len(), 1);
        assert!(!sink.has_errors());
    }

    #[test]
    fn second_scan_hits_cache() {
        let (dir, r) = tree(&[("Main.cpp", "#include \"A.h\"\n"), ("A.h", "")]);
        let cache_path = dir.path().join("includes.cache");
        let sink = DiagnosticSink::new();
        scan(&r, &cache_path, false, &sink).unwrap();
        let out = scan(&r, &cache_path, false, &sink).unwrap();
        assert_eq!(out.changes.unchanged_files, vec!["A.h", "Main.cpp"]);
        assert_eq!(out.changes.dirty_count(), 0);
    }

    #[test]
    fn refresh_reparses_everything() {
        let (dir, r) = tree(&[("Main.cpp", "")]);
        let cache_path = dir.path().join("includes.cache");
        let sink = DiagnosticSink::new();
        scan(&r, &cache_path, false, &sink).unwrap();
        let out = scan(&r, &cache_path, true, &sink).unwrap();
        assert_eq!(out.changes.new_files, vec!["Main.cpp"]);
    }

    #[test]
    fn stale_entry_is_reparsed() {
        let (dir, r) = tree(&[("Main.cpp", ""), ("A.h", "")]);
        let cache_path = dir.path().join("includes.cache");
        let sink = DiagnosticSink::new();
        scan(&r, &cache_path, false, &sink).unwrap();

        fs::write(dir.path().join("Main.cpp"), "#include \"A.h\"\n").unwrap();
        let out = scan(&r, &cache_path, false, &sink).unwrap();
        assert_eq!(out.changes.modified_files, vec!["Main.cpp"]);
        assert_eq!(out.cache.get("Main.cpp").unwrap().includes, vec!["A.h"]);
    }

    #[test]
    fn deleted_file_is_pruned() {
        let (dir, r) = tree(&[("Main.cpp", ""), ("Old.h", "")]);
        let cache_path = dir.path().join("includes.cache");
        let sink = DiagnosticSink::new();
        scan(&r, &cache_path, false, &sink).unwrap();

        fs::remove_file(dir.path().join("Old.h")).unwrap();
        let out = scan(&r, &cache_path, false, &sink).unwrap();
        assert_eq!(out.changes.deleted_files, vec!["Old.h"]);
        assert!(!out.cache.contains("Old.h"));
        assert!(!DependencyCache::load(&cache_path).contains("Old.h"));
    }

    #[test]
    fn ensure_existing_key_is_noop() {
        let (dir, r) = tree(&[("Main.cpp", "")]);
        let sink = DiagnosticSink::new();
        let mut out = scan(&r, &dir.path().join("includes.cache"), false, &sink).unwrap();
        let before = out.cache.clone();
        let key = ensure_file_in_cache(&r, &mut out.cache, &dir.path().join("Main.cpp"), &sink)
            .unwrap();
        assert_eq!(key, "Main.cpp");
        assert_eq!(out.cache, before);
    }

    #[test]
    fn ensure_adds_transient_entry() {
        let (dir, r) = tree(&[("tool/Gen.inl", "#include \"A.h\"\n"), ("A.h", "")]);
        let cache_path = dir.path().join("includes.cache");
        let sink = DiagnosticSink::new();
        let mut out = scan(&r, &cache_path, false, &sink).unwrap();
        let key =
            ensure_file_in_cache(&r, &mut out.cache, &dir.path().join("tool/Gen.inl"), &sink)
                .unwrap();
        assert_eq!(key, "tool/Gen.inl");
        assert_eq!(out.cache.get(&key).unwrap().includes, vec!["A.h"]);
        assert!(!DependencyCache::load(&cache_path).contains("tool/Gen.inl"));
    }

    #[test]
    fn ensure_outside_root_fails() {
        let (dir, _r) = tree(&[("inner/Main.cpp", "")]);
        let inner = IncludeResolver::new(&dir.path().join("inner")).unwrap();
        fs::write(dir.path().join("Outside.cpp"), "").unwrap();
        let sink = DiagnosticSink::new();
        let mut cache = DependencyCache::new();
        let err = ensure_file_in_cache(&inner, &mut cache, &dir.path().join("Outside.cpp"), &sink)
            .unwrap_err();
        assert!(matches!(err, DepsError::NotUnderRoot { .. }));
    }

    #[test]
    fn ensure_missing_file_fails() {
        let (dir, r) = tree(&[("Main.cpp", "")]);
        let sink = DiagnosticSink::new();
        let mut cache = DependencyCache::new();
        let err = ensure_file_in_cache(&r, &mut cache, &dir.path().join("Gone.cpp"), &sink)
            .unwrap_err();
        match err {
            DepsError::NotFound { path } => assert_eq!(path, "Gone.cpp"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn ensure_missing_file_in_missing_dir_fails() {
        let (_dir, r) = tree(&[("Main.cpp", "")]);
        let sink = DiagnosticSink::new();
        let mut cache = DependencyCache::new();
        let err = ensure_file_in_cache(&r, &mut cache, &r.root().join("no/such/Gone.cpp"), &sink)
            .unwrap_err();
        assert!(matches!(err, DepsError::NotFound { .. }));
    }

    #[test]
    fn lexical_normalization() {
        assert_eq!(
            normalize_lexically(Path::new("/a/b/./c/../d")),
            PathBuf::from("/a/b/d")
        );
    }
}
