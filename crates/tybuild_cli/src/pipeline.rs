//! Shared helpers for CLI commands.
//!
//! Contains logging setup, configuration and layout resolution, diagnostic
//! rendering, and the mapping from errors to process exit codes.

use std::error::Error;
use std::path::{Path, PathBuf};

use tybuild_config::{ConfigError, ResolvedLayout, TybuildConfig};
use tybuild_deps::DepsError;
use tybuild_diagnostics::{DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer};
use tybuild_project::GenerateError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::GlobalArgs;

/// Exit code for failures caused by bad input or repository layout.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for unexpected failures.
pub const EXIT_INTERNAL: i32 = 2;

/// Installs the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the `--quiet`/`--verbose` defaults.
pub fn init_logging(global: &GlobalArgs) {
    let default = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(global.color)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

/// Determines the base directory and configuration for a run.
///
/// With `--config`, the file is loaded and its directory becomes the base.
/// Otherwise the current directory is the base and its `tybuild.toml`, if
/// any, is loaded.
pub fn load_workspace(
    global: &GlobalArgs,
) -> Result<(TybuildConfig, ResolvedLayout), Box<dyn Error>> {
    let (base, config) = match &global.config {
        Some(path) => {
            let path = PathBuf::from(path);
            let base = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let config = tybuild_config::load_config_file(&path)?;
            (base, config)
        }
        None => {
            let base = std::env::current_dir()?;
            let config = tybuild_config::load_config(&base)?;
            (base, config)
        }
    };
    let base = absolute(&base)?;
    let layout = tybuild_config::resolve_layout(&config, &base);
    Ok((config, layout))
}

/// Makes `path` absolute against the current directory.
pub fn absolute(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    Ok(std::path::absolute(path)?)
}

/// Renders every collected diagnostic to stderr.
///
/// Warnings and notes are suppressed by `--quiet`; errors never are.
pub fn render_diagnostics(sink: &DiagnosticSink, global: &GlobalArgs) {
    let renderer = TerminalRenderer::new(global.color);
    for diag in sink.take_all() {
        if global.quiet && diag.severity != Severity::Error {
            continue;
        }
        eprint!("{}", renderer.render(&diag));
    }
}

/// Maps a command failure to its exit code.
///
/// Errors caused by the caller's input exit with [`EXIT_FAILURE`];
/// everything else is unexpected and exits with [`EXIT_INTERNAL`].
pub fn exit_code_for(err: &(dyn Error + 'static)) -> i32 {
    let invalid_input = if let Some(e) = err.downcast_ref::<DepsError>() {
        e.is_invalid_input()
    } else if let Some(e) = err.downcast_ref::<GenerateError>() {
        e.is_invalid_input()
    } else {
        err.downcast_ref::<ConfigError>().is_some()
    };
    if invalid_input {
        EXIT_FAILURE
    } else {
        EXIT_INTERNAL
    }
}
