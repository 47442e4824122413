//! Identity-based change detection.
//!
//! Compares the identities of the files currently on disk against the include
//! cache to identify which files are new, modified, deleted, or unchanged
//! since the last scan.

use std::collections::BTreeMap;

use tybuild_common::FileIdentity;

use crate::cache::DependencyCache;

/// Result of comparing current file identities against the include cache.
///
/// Every list is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Files that are not present in the cache.
    pub new_files: Vec<String>,

    /// Files whose size or modification time differs from the cache.
    pub modified_files: Vec<String>,

    /// Files present in the cache but not in the current file set.
    pub deleted_files: Vec<String>,

    /// Files whose identity matches the cache.
    pub unchanged_files: Vec<String>,
}

impl ChangeSet {
    /// Returns `true` if there are no changes (no new, modified, or deleted files).
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.modified_files.is_empty() && self.deleted_files.is_empty()
    }

    /// Returns the number of files that need reparsing (new + modified).
    pub fn dirty_count(&self) -> usize {
        self.new_files.len() + self.modified_files.len()
    }

    /// Iterates the files that need reparsing.
    pub fn dirty_files(&self) -> impl Iterator<Item = &str> {
        self.new_files
            .iter()
            .chain(&self.modified_files)
            .map(String::as_str)
    }

    /// Logs a one-line summary at info level.
    pub fn log_summary(&self) {
        tracing::info!(
            new = self.new_files.len(),
            modified = self.modified_files.len(),
            deleted = self.deleted_files.len(),
            unchanged = self.unchanged_files.len(),
            "include scan"
        );
    }
}

/// Classifies every current file and every cached key.
pub fn detect_changes(
    current: &BTreeMap<String, FileIdentity>,
    cache: &DependencyCache,
) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for (key, identity) in current {
        match cache.get(key) {
            Some(entry) if !entry.identity().is_stale(identity) => {
                changes.unchanged_files.push(key.clone());
            }
            Some(_) => changes.modified_files.push(key.clone()),
            None => changes.new_files.push(key.clone()),
        }
    }

    changes.deleted_files = cache
        .keys()
        .filter(|key| !current.contains_key(*key))
        .map(str::to_string)
        .collect();

    changes
}
