//! `tybuild cmake` — export discovered projects as CMake variables.

use std::error::Error;
use std::path::PathBuf;

use tybuild_diagnostics::DiagnosticSink;
use tybuild_project::{export_cmake, CMAKE_FILE};

use crate::pipeline::{absolute, load_workspace, render_diagnostics};
use crate::{CmakeArgs, GlobalArgs};

/// Runs the `tybuild cmake` command.
pub fn run(args: &CmakeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let (config, layout) = load_workspace(global)?;
    let output = match &args.output {
        Some(path) => absolute(&PathBuf::from(path))?,
        None => layout.build_dir.join(CMAKE_FILE),
    };

    let sink = DiagnosticSink::new();
    let result = export_cmake(&config, &layout, &output, &sink);
    render_diagnostics(&sink, global);
    let projects = result?;

    if !global.quiet {
        eprintln!(
            "    Exported {} project(s) to {}",
            projects.len(),
            output.display()
        );
    }
    Ok(0)
}
