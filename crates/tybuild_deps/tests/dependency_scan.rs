//! Integration tests for scanning on-disk trees and querying dependencies.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use tybuild_deps::{
    get_cpp_dependencies, DependencyCache, DependencyScanner, DepsError, CACHE_FILE,
};
use tybuild_diagnostics::DiagnosticSink;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn deps(root: &Path, start: &str) -> Vec<String> {
    get_cpp_dependencies(root, &root.join(start), false, &DiagnosticSink::new()).unwrap()
}

fn touch(path: &Path, offset_secs: u64) {
    let file = fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(offset_secs))
        .unwrap();
}

// ===========================================================================
// Cache persistence
// ===========================================================================

#[test]
fn repeated_scans_write_identical_cache() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "app/Main.cpp", "#include \"core/Net.h\"\n");
    write(root, "core/Net.h", "");
    write(root, "core/Net.cpp", "#include \"Net.h\"\n");

    deps(root, "app/Main.cpp");
    let first = fs::read(root.join(CACHE_FILE)).unwrap();
    deps(root, "app/Main.cpp");
    let second = fs::read(root.join(CACHE_FILE)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn mtime_only_change_marks_file_modified() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "Main.cpp", "");
    let sink = DiagnosticSink::new();
    DependencyScanner::open(root, &root.join(CACHE_FILE), false, &sink).unwrap();

    touch(&root.join("Main.cpp"), 120);
    let scanner = DependencyScanner::open(root, &root.join(CACHE_FILE), false, &sink).unwrap();
    assert_eq!(scanner.changes().modified_files, vec!["Main.cpp"]);
}

#[test]
fn deleted_file_leaves_cache() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "Main.cpp", "#include \"Old.h\"\n");
    write(root, "Old.h", "");
    deps(root, "Main.cpp");

    fs::remove_file(root.join("Old.h")).unwrap();
    write(root, "Main.cpp", "// no includes any more\n");
    deps(root, "Main.cpp");

    let cache = DependencyCache::load(&root.join(CACHE_FILE));
    assert!(!cache.contains("Old.h"));
    assert!(cache.get("Main.cpp").unwrap().includes.is_empty());
}

#[test]
fn corrupt_cache_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "A.cpp", "#include \"B.h\"\n");
    write(root, "B.h", "");
    write(root, "B.cpp", "");
    fs::write(root.join(CACHE_FILE), "{ truncated").unwrap();

    assert_eq!(deps(root, "A.cpp"), vec!["B.cpp"]);
    assert_eq!(DependencyCache::load(&root.join(CACHE_FILE)).len(), 3);
}

// ===========================================================================
// Resolution and reachability
// ===========================================================================

#[test]
fn includer_relative_resolution_takes_precedence() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "app/Main.cpp", "#include \"Config.h\"\n");
    write(root, "app/Config.h", "");
    write(root, "app/Config.cpp", "");
    write(root, "Config.h", "");
    write(root, "Config.cpp", "");

    assert_eq!(deps(root, "app/Main.cpp"), vec!["app/Config.cpp"]);
}

#[test]
fn cycle_is_tolerated() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "A.cpp", "#include \"B.cpp\"\n");
    write(root, "B.cpp", "#include \"A.cpp\"\n");

    assert_eq!(deps(root, "A.cpp"), vec!["B.cpp"]);
    assert_eq!(deps(root, "B.cpp"), vec!["A.cpp"]);
}

#[test]
fn start_excluded_even_when_reached_through_pairing() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "Foo.cpp", "#include \"Foo.h\"\n");
    write(root, "Foo.h", "");

    assert!(deps(root, "Foo.cpp").is_empty());
}

#[test]
fn implicit_pairing_pulls_in_source() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "lib/Foo.h", "");
    write(root, "lib/Foo.cpp", "");
    write(root, "Bar.cpp", "#include \"lib/Foo.h\"\n");

    assert_eq!(deps(root, "Bar.cpp"), vec!["lib/Foo.cpp"]);
}

#[test]
fn transitive_chain_through_headers_and_pairs() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "Main.cpp", "#include \"net/Socket.h\"\n");
    write(root, "net/Socket.h", "");
    write(root, "net/Socket.cpp", "#include \"../util/Log.h\"\n");
    write(root, "util/Log.h", "");
    write(root, "util/Log.cpp", "");
    write(root, "util/Unused.cpp", "");

    assert_eq!(
        deps(root, "Main.cpp"),
        vec!["net/Socket.cpp", "util/Log.cpp"]
    );
}

#[test]
fn abc_end_to_end() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "A.cpp", "#include \"B.h\"\n");
    write(root, "B.h", "");
    write(root, "B.cpp", "");
    write(root, "C.h", "");

    assert_eq!(deps(root, "A.cpp"), vec!["B.cpp"]);

    write(root, "B.cpp", "#include \"C.h\"\n");
    let sink = DiagnosticSink::new();
    let mut scanner =
        DependencyScanner::open(root, &root.join(CACHE_FILE), false, &sink).unwrap();
    assert_eq!(scanner.changes().modified_files, vec!["B.cpp"]);
    assert_eq!(scanner.cache().get("B.cpp").unwrap().includes, vec!["C.h"]);
    assert_eq!(
        scanner.cpp_dependencies(&root.join("A.cpp"), &sink).unwrap(),
        vec!["B.cpp"]
    );
    let closure = scanner
        .dependency_closure(&root.join("A.cpp"), &sink)
        .unwrap();
    assert_eq!(closure.headers, vec!["B.h", "C.h"]);
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn start_outside_root_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/Main.cpp", "");
    write(dir.path(), "Other.cpp", "");
    let err = get_cpp_dependencies(
        &dir.path().join("src"),
        &dir.path().join("Other.cpp"),
        false,
        &DiagnosticSink::new(),
    )
    .unwrap_err();
    assert!(matches!(err, DepsError::NotUnderRoot { .. }));
}

#[test]
fn missing_start_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Main.cpp", "");
    let err = get_cpp_dependencies(
        dir.path(),
        &dir.path().join("Nope.cpp"),
        false,
        &DiagnosticSink::new(),
    )
    .unwrap_err();
    assert!(matches!(err, DepsError::NotFound { .. }));
}

#[test]
fn unresolved_include_only_warns() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "Main.cpp", "#include \"Ghost.h\"\n");
    let sink = DiagnosticSink::new();
    let result = get_cpp_dependencies(root, &root.join("Main.cpp"), false, &sink).unwrap();
    assert!(result.is_empty());
    let diags = sink.take_all();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code.to_string(), "I101");
}
