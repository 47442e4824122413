//! Parsing and validation of `tybuild.toml` configuration files.
//!
//! This crate reads the optional repository configuration and produces a
//! strongly-typed [`TybuildConfig`], plus the [`ResolvedLayout`] of absolute
//! directories the scanner and generator work in.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_layout, ResolvedLayout};
pub use types::*;
