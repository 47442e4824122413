//! POSIX-style relative path helpers.
//!
//! Cache keys are always `/`-separated and relative to a fixed root, regardless
//! of the host platform, so persisted caches stay portable and diffable.

use std::path::{Component, Path, PathBuf};

/// Returns `path` relative to `root` as a `/`-separated string.
///
/// Returns `None` when `path` does not lie under `root`. Both paths are compared
/// as given; callers canonicalize first when symlinks matter.
pub fn relative_posix(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for comp in rel.components() {
        match comp {
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Returns the directory part of a POSIX relative path (`""` at the root).
pub fn posix_parent(rel: &str) -> &str {
    match rel.rfind('/') {
        Some(idx) => &rel[..idx],
        None => "",
    }
}

/// Returns the file name of a POSIX relative path without its extension.
pub fn posix_stem(rel: &str) -> &str {
    let name = &rel[rel.rfind('/').map_or(0, |i| i + 1)..];
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Returns the extension of a POSIX relative path, without the dot.
pub fn posix_extension(rel: &str) -> Option<&str> {
    let name = &rel[rel.rfind('/').map_or(0, |i| i + 1)..];
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// Returns the path that leads from directory `base` to `path`, using `..`
/// components where needed.
///
/// Both paths should be absolute and normalized. When they share no prefix
/// (different drives on Windows) `path` is returned unchanged.
pub fn relative_between(path: &Path, base: &Path) -> PathBuf {
    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return path.to_path_buf();
    }
    let mut out = PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for part in &path_parts[common..] {
        out.push(part.as_os_str());
    }
    out
}
