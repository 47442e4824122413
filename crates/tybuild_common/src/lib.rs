//! Shared foundational types used across the tybuild crates.
//!
//! This crate provides the file identity used for change detection, POSIX-style
//! relative path helpers for cache keys, and atomic file replacement for every
//! document tybuild persists.

#![warn(missing_docs)]

pub mod fs;
pub mod identity;
pub mod path;

pub use fs::write_atomic;
pub use identity::FileIdentity;
pub use path::{posix_extension, posix_parent, posix_stem, relative_between, relative_posix};
