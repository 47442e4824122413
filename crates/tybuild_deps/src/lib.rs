//! Include scanning and compile-unit dependency queries for C++ source trees.
//!
//! A scan walks every `.cpp` and `.h` file under a root, extracts local
//! `#include "..."` directives, resolves them to files inside the root, and
//! records the result in a persisted cache keyed by file identity. Queries
//! build a dependency graph from the cache, add an implied edge from each
//! header to its same-stem source, and report everything reachable from a
//! start file.
//!
//! ```no_run
//! use std::path::Path;
//! use tybuild_deps::get_cpp_dependencies;
//! use tybuild_diagnostics::DiagnosticSink;
//!
//! let sink = DiagnosticSink::new();
//! let root = Path::new("src");
//! let deps = get_cpp_dependencies(root, &root.join("project/console/Hello.cpp"), false, &sink)?;
//! for dep in deps {
//!     println!("{dep}");
//! }
//! # Ok::<(), tybuild_deps::DepsError>(())
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod changes;
pub mod error;
pub mod graph;
pub mod include;
pub mod kind;
pub mod query;
pub mod resolve;
pub mod scan;

pub use cache::{CacheEntry, DependencyCache};
pub use changes::{detect_changes, ChangeSet};
pub use error::DepsError;
pub use graph::{
    build_dependency_graph, build_graph, build_implicit_pairs, transitive_reachable,
    DependencyGraph, EdgeKind,
};
pub use include::{parse_includes, read_includes};
pub use kind::{is_compiled_unit, FileKind, HEADER_EXT, SOURCE_EXT};
pub use query::{get_cpp_dependencies, DependencyClosure, DependencyScanner, CACHE_FILE};
pub use resolve::{IncludeResolver, Resolution, UnresolvedInclude, UNRESOLVED_INCLUDE};
pub use scan::{ensure_file_in_cache, scan, ScanOutcome};
