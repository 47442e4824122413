//! Export of discovered projects as CMake variables.
//!
//! The generated file sets `GENERATED_PROJECTS` to the `;`-separated project
//! names and, per project, `<Name>_TYPE` and `<Name>_SOURCES`. Sources are
//! relative to the source root, entry file first.

use std::path::Path;

use tybuild_common::{relative_posix, write_atomic};
use tybuild_config::{ResolvedLayout, TybuildConfig};
use tybuild_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tybuild_deps::DependencyScanner;

use crate::discover::{discover_projects, Project};
use crate::error::GenerateError;

/// Default file name of the export, inside the build directory.
pub const CMAKE_FILE: &str = "generated_projects.cmake";

/// Code of the warning emitted when a project's dependencies could not be
/// computed and only its entry file is exported.
pub const DEPENDENCY_FALLBACK: DiagnosticCode = DiagnosticCode::new(Category::Generate, 202);

/// One exported project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmakeProject {
    /// Project name.
    pub name: String,
    /// Project type.
    pub kind: String,
    /// Entry file followed by its reachable sources.
    pub sources: Vec<String>,
}

/// Renders the CMake variable file.
pub fn render_cmake(projects: &[CmakeProject]) -> String {
    let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
    let mut lines = vec![format!("set(GENERATED_PROJECTS \"{}\")", names.join(";")), String::new()];
    for project in projects {
        lines.push(format!("set({}_TYPE \"{}\")", project.name, project.kind));
        lines.push(format!("set({}_SOURCES", project.name));
        lines.extend(project.sources.iter().map(|s| format!("    {s}")));
        lines.push(")".to_string());
        lines.push(String::new());
    }
    lines.join("\n")
}

fn entry_key(project: &Project, source_root: &Path) -> String {
    relative_posix(&project.entry_file, source_root)
        .unwrap_or_else(|| project.entry_file.display().to_string())
}

/// Discovers projects and computes the source list of each.
///
/// Dependency failures are not fatal here: the project is exported with its
/// entry file only and a [`DEPENDENCY_FALLBACK`] warning is emitted.
pub fn collect_cmake_projects(
    config: &TybuildConfig,
    layout: &ResolvedLayout,
    sink: &DiagnosticSink,
) -> Result<Vec<CmakeProject>, GenerateError> {
    let projects = discover_projects(&layout.project_root);
    if projects.is_empty() {
        return Err(GenerateError::NoProjects {
            path: layout.project_root.clone(),
        });
    }

    let mut scanner =
        DependencyScanner::open(&layout.source_root, &layout.include_cache(config), false, sink);
    if let Err(e) = &scanner {
        tracing::warn!("dependency scan of {} failed: {e}", layout.source_root.display());
    }

    let mut exported = Vec::with_capacity(projects.len());
    for project in &projects {
        let closure = match scanner.as_mut() {
            Ok(scanner) => scanner
                .dependency_closure(&project.entry_file, sink)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        let sources = match closure {
            Ok(closure) => {
                let mut sources = vec![closure.start];
                sources.extend(closure.sources);
                sources
            }
            Err(reason) => {
                sink.emit(
                    Diagnostic::warning(
                        DEPENDENCY_FALLBACK,
                        format!("could not get dependencies for {}", project.name),
                    )
                    .with_path(project.entry_file.clone())
                    .with_note(reason)
                    .with_help("only the entry file is exported for this project"),
                );
                vec![entry_key(project, &layout.source_root)]
            }
        };
        exported.push(CmakeProject {
            name: project.name.clone(),
            kind: project.kind.clone(),
            sources,
        });
    }
    Ok(exported)
}

/// Writes the CMake export to `output` and returns the exported projects.
pub fn export_cmake(
    config: &TybuildConfig,
    layout: &ResolvedLayout,
    output: &Path,
    sink: &DiagnosticSink,
) -> Result<Vec<CmakeProject>, GenerateError> {
    let projects = collect_cmake_projects(config, layout, sink)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(GenerateError::io(parent))?;
    }
    write_atomic(output, render_cmake(&projects).as_bytes()).map_err(GenerateError::io(output))?;
    tracing::info!(
        projects = projects.len(),
        "wrote CMake export {}",
        output.display()
    );
    Ok(projects)
}
