//! Persisted include cache.
//!
//! The cache is a single JSON object mapping each scanned file, as a POSIX path
//! relative to the root, to its identity and its resolved includes:
//!
//! ```json
//! {
//!   "core/Net.cpp": { "includes": ["core/Net.h"], "mtime_ns": 1700000000000000000, "size": 412 }
//! }
//! ```
//!
//! Keys and fields are emitted in sorted order, so saving an unchanged cache
//! produces a byte-identical file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tybuild_common::{write_atomic, FileIdentity};

use crate::error::DepsError;

/// Cached state for one scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Resolved include targets, sorted and deduplicated.
    pub includes: Vec<String>,
    /// Modification time in nanoseconds at the time of the scan.
    pub mtime_ns: u64,
    /// Size in bytes at the time of the scan.
    pub size: u64,
}

impl CacheEntry {
    /// Creates an entry, normalizing `includes` to a sorted set.
    pub fn new(identity: FileIdentity, mut includes: Vec<String>) -> Self {
        includes.sort();
        includes.dedup();
        Self {
            includes,
            mtime_ns: identity.mtime_ns,
            size: identity.size,
        }
    }

    /// The identity recorded for this entry.
    pub fn identity(&self) -> FileIdentity {
        FileIdentity::new(self.size, self.mtime_ns)
    }
}

/// In-memory include cache with explicit load and save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl DependencyCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the cache at `path`.
    ///
    /// Never fails: a missing file, unreadable file or malformed document yields
    /// an empty cache and the reason is logged. Entries that do not have the
    /// expected shape are skipped individually.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no include cache at {}", path.display());
                return Self::new();
            }
            Err(e) => {
                tracing::warn!("ignoring include cache {}: {e}", path.display());
                return Self::new();
            }
        };
        let value: serde_json::Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("ignoring corrupt include cache {}: {e}", path.display());
                return Self::new();
            }
        };
        let serde_json::Value::Object(map) = value else {
            tracing::warn!(
                "ignoring include cache {}: top level is not an object",
                path.display()
            );
            return Self::new();
        };

        let mut cache = Self::new();
        for (key, raw) in map {
            match serde_json::from_value::<CacheEntry>(raw) {
                Ok(entry) => {
                    cache.entries.insert(key, entry);
                }
                Err(e) => tracing::debug!("skipping cache entry '{key}': {e}"),
            }
        }
        tracing::debug!(
            "loaded {} cache entries from {}",
            cache.len(),
            path.display()
        );
        cache
    }

    /// Writes the cache to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), DepsError> {
        let mut json =
            serde_json::to_string_pretty(&self.entries).map_err(|e| DepsError::Serialization {
                reason: e.to_string(),
            })?;
        json.push('\n');
        write_atomic(path, json.as_bytes()).map_err(|source| DepsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Drops every entry whose file no longer exists under `root`.
    ///
    /// Returns the removed keys in sorted order.
    pub fn prune(&mut self, root: &Path) -> Vec<String> {
        let gone: Vec<String> = self
            .entries
            .keys()
            .filter(|key| !root.join(key.as_str()).is_file())
            .cloned()
            .collect();
        for key in &gone {
            self.entries.remove(key);
        }
        if !gone.is_empty() {
            tracing::debug!("pruned {} deleted files from the include cache", gone.len());
        }
        gone
    }

    /// Returns the entry for `key`.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Returns `true` if `key` has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts or replaces the entry for `key`.
    pub fn insert(&mut self, key: String, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(key, entry)
    }

    /// Removes the entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
