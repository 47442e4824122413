//! `tybuild generate` — incremental Visual Studio file generation.
//!
//! 1. Load `tybuild.toml` and resolve the layout
//! 2. Plan every discovered project against the plan cache
//! 3. Rewrite changed projects and, if the project list changed, the solution
//! 4. Render diagnostics and a per-project summary

use std::error::Error;

use tybuild_diagnostics::DiagnosticSink;
use tybuild_project::GenerationReport;

use crate::pipeline::{load_workspace, render_diagnostics};
use crate::{GenerateArgs, GlobalArgs};

/// Runs the `tybuild generate` command.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let (config, layout) = load_workspace(global)?;

    if !global.quiet {
        eprintln!("  Generating {}", layout.build_dir.display());
    }

    let sink = DiagnosticSink::new();
    let result = tybuild_project::generate(&config, &layout, args.force, &sink);
    render_diagnostics(&sink, global);
    let report = result?;

    if !global.quiet {
        print_summary(&report);
    }
    Ok(0)
}

fn print_summary(report: &GenerationReport) {
    for outcome in &report.projects {
        eprintln!(
            "  {:<15} {:<20} {}",
            outcome.project.kind, outcome.project.name, outcome.verdict
        );
    }
    if report.new_solution_guid {
        eprintln!("  New solution GUID {}", report.solution_guid);
    }
    eprintln!(
        "    Solution {} ({})",
        report.solution_path.display(),
        report.solution_verdict
    );
    eprintln!(
        "    Finished {} project(s), {} regenerated",
        report.projects.len(),
        report.regenerated().count()
    );
}
