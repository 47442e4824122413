//! Project discovery and incremental Visual Studio file generation.
//!
//! Projects are discovered as `<project_dir>/<type>/<Name>.cpp`. For each one
//! the dependency closure of its entry file is computed with
//! [`tybuild_deps`], a plan entry of file identities is built, and the
//! [`plan`] module decides whether its `.vcxproj` must be rewritten. The
//! solution is rewritten only when the ordered project list changes.
//!
//! ```no_run
//! use std::path::Path;
//! use tybuild_config::{load_config, resolve_layout};
//! use tybuild_diagnostics::DiagnosticSink;
//! use tybuild_project::generate;
//!
//! let base = Path::new(".");
//! let config = load_config(base).unwrap();
//! let layout = resolve_layout(&config, base);
//! let sink = DiagnosticSink::new();
//! let report = generate(&config, &layout, false, &sink)?;
//! for outcome in report.regenerated() {
//!     println!("{}: {}", outcome.project, outcome.verdict);
//! }
//! # Ok::<(), tybuild_project::GenerateError>(())
//! ```

#![warn(missing_docs)]

pub mod cmake;
pub mod discover;
pub mod error;
pub mod generate;
pub mod guid;
pub mod plan;
pub mod solution;
pub mod vcxproj;
pub mod xml;

pub use cmake::{
    collect_cmake_projects, export_cmake, render_cmake, CmakeProject, CMAKE_FILE,
    DEPENDENCY_FALLBACK,
};
pub use discover::{discover_projects, Project};
pub use error::GenerateError;
pub use generate::{
    generate, GenerationReport, ProjectOutcome, MISSING_SPECIAL_PROJECT, SPECIAL_PROJECTS,
};
pub use guid::{new_solution_guid, project_guid, ALL_BUILD_GUID, ZERO_CHECK_GUID};
pub use plan::{plan_project, plan_solution, PlanCache, PlanEntry, RegenReason, Verdict};
pub use solution::{render_solution, SolutionProject};
pub use vcxproj::{render_filters, render_project};
