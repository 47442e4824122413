//! The generation run: plan every project, then emit what changed.
//!
//! Nothing is written to the build directory's project files until planning
//! has succeeded for every project, so a missing template aborts the run
//! before any output is touched. The plan cache is saved last.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tybuild_common::{relative_between, write_atomic, FileIdentity};
use tybuild_config::{ResolvedLayout, TybuildConfig};
use tybuild_deps::DependencyScanner;
use tybuild_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};

use crate::discover::{discover_projects, Project};
use crate::error::GenerateError;
use crate::guid::{new_solution_guid, project_guid};
use crate::plan::{plan_project, plan_solution, PlanCache, PlanEntry, Verdict};
use crate::solution::{render_solution, SolutionProject};
use crate::vcxproj::{render_filters, render_project};

/// Code of the warning emitted when a special project file is missing from
/// the template directory.
pub const MISSING_SPECIAL_PROJECT: DiagnosticCode = DiagnosticCode::new(Category::Generate, 201);

/// Utility projects copied verbatim from the template directory.
pub const SPECIAL_PROJECTS: [&str; 2] = ["ALL_BUILD", "ZERO_CHECK"];

/// What happened to one project during a run.
#[derive(Debug, Clone)]
pub struct ProjectOutcome {
    /// The discovered project.
    pub project: Project,
    /// Its deterministic GUID.
    pub guid: String,
    /// Number of compiled sources, entry file included.
    pub source_count: usize,
    /// The planner's decision.
    pub verdict: Verdict,
}

/// Summary of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// GUID of the solution, reused from the plan cache when present.
    pub solution_guid: String,
    /// Whether the solution GUID was created by this run.
    pub new_solution_guid: bool,
    /// Decision for the solution file.
    pub solution_verdict: Verdict,
    /// Path of the solution file.
    pub solution_path: PathBuf,
    /// Path of the saved plan cache.
    pub plan_path: PathBuf,
    /// Special project files copied from the template directory.
    pub copied: Vec<String>,
    /// Per-project outcomes, in discovery order.
    pub projects: Vec<ProjectOutcome>,
}

impl GenerationReport {
    /// Projects whose files were rewritten.
    pub fn regenerated(&self) -> impl Iterator<Item = &ProjectOutcome> {
        self.projects.iter().filter(|p| p.verdict.needs_regeneration())
    }
}

struct PlannedProject {
    outcome: ProjectOutcome,
    template_name: String,
    sources: Vec<String>,
}

/// Runs a full generation for the repository at `layout`.
///
/// With `force`, the plan cache is ignored and every output is rewritten.
pub fn generate(
    config: &TybuildConfig,
    layout: &ResolvedLayout,
    force: bool,
    sink: &DiagnosticSink,
) -> Result<GenerationReport, GenerateError> {
    require_dir("source", &layout.source_root)?;
    require_dir("template", &layout.template_dir)?;
    fs::create_dir_all(&layout.build_dir).map_err(GenerateError::io(&layout.build_dir))?;
    let build_dir = layout
        .build_dir
        .canonicalize()
        .map_err(GenerateError::io(&layout.build_dir))?;

    let copied = copy_special_projects(&layout.template_dir, &build_dir, sink)?;

    let projects = discover_projects(&layout.project_root);
    if projects.is_empty() {
        return Err(GenerateError::NoProjects {
            path: layout.project_root.clone(),
        });
    }
    tracing::info!(count = projects.len(), "discovered projects");

    let plan_path = layout.plan_cache(config);
    let cached = if force {
        PlanCache::default()
    } else {
        PlanCache::load(&plan_path)
    };
    let (solution_guid, new_guid) = match &cached.solution_guid {
        Some(guid) => (guid.clone(), false),
        None => (new_solution_guid(), true),
    };

    let current_set: Vec<(&str, &str)> = projects
        .iter()
        .map(|p| (p.name.as_str(), p.kind.as_str()))
        .collect();
    let solution_verdict = plan_solution(&cached, &current_set, force);
    tracing::info!("solution: {solution_verdict}");

    let mut scanner = DependencyScanner::open(
        &layout.source_root,
        &layout.include_cache(config),
        false,
        sink,
    )?;

    let mut planned = Vec::with_capacity(projects.len());
    let mut entries = Vec::with_capacity(projects.len());
    for project in &projects {
        let (plan, entry) = plan_one(config, layout, &cached, &mut scanner, project, force, sink)?;
        planned.push(plan);
        entries.push(entry);
    }

    for plan in &planned {
        if plan.outcome.verdict.needs_regeneration() {
            emit_project(layout, &build_dir, scanner.root(), plan)?;
        }
    }

    let solution_path = build_dir.join(format!("{}.sln", config.generate.solution_name));
    if solution_verdict.needs_regeneration() {
        let listed: Vec<SolutionProject> = planned
            .iter()
            .map(|p| SolutionProject {
                name: p.outcome.project.name.clone(),
                guid: p.outcome.guid.clone(),
            })
            .collect();
        let text = render_solution(&solution_guid, &listed);
        write_atomic(&solution_path, text.as_bytes()).map_err(GenerateError::io(&solution_path))?;
        tracing::info!("wrote {}", solution_path.display());
    }

    let plan = PlanCache {
        projects: entries,
        solution_guid: Some(solution_guid.clone()),
    };
    plan.save(&plan_path)?;

    Ok(GenerationReport {
        solution_guid,
        new_solution_guid: new_guid,
        solution_verdict,
        solution_path,
        plan_path,
        copied,
        projects: planned.into_iter().map(|p| p.outcome).collect(),
    })
}

fn require_dir(what: &'static str, path: &Path) -> Result<(), GenerateError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(GenerateError::MissingDirectory {
            what,
            path: path.to_path_buf(),
        })
    }
}

/// Copies the special project files that exist; each missing one is
/// reported as a warning.
fn copy_special_projects(
    template_dir: &Path,
    build_dir: &Path,
    sink: &DiagnosticSink,
) -> Result<Vec<String>, GenerateError> {
    let mut copied = Vec::new();
    for name in SPECIAL_PROJECTS {
        for file in [format!("{name}.vcxproj"), format!("{name}.vcxproj.filters")] {
            let src = template_dir.join(&file);
            if !src.is_file() {
                sink.emit(
                    Diagnostic::warning(
                        MISSING_SPECIAL_PROJECT,
                        format!("template file not found: {file}"),
                    )
                    .with_path(src),
                );
                continue;
            }
            let dst = build_dir.join(&file);
            fs::copy(&src, &dst).map_err(GenerateError::io(&dst))?;
            tracing::debug!("copied {file}");
            copied.push(file);
        }
    }
    Ok(copied)
}

/// Identity recorded by the scan, or read from disk for transient entries.
fn identity_of(scanner: &DependencyScanner, key: &str) -> Result<FileIdentity, GenerateError> {
    if let Some(entry) = scanner.cache().get(key) {
        return Ok(entry.identity());
    }
    let path = scanner.path_of(key);
    FileIdentity::of(&path).map_err(GenerateError::io(path))
}

fn snapshot(
    scanner: &DependencyScanner,
    keys: &[String],
) -> Result<BTreeMap<String, FileIdentity>, GenerateError> {
    keys.iter()
        .map(|key| Ok((key.clone(), identity_of(scanner, key)?)))
        .collect()
}

fn plan_one(
    config: &TybuildConfig,
    layout: &ResolvedLayout,
    cached: &PlanCache,
    scanner: &mut DependencyScanner,
    project: &Project,
    force: bool,
    sink: &DiagnosticSink,
) -> Result<(PlannedProject, PlanEntry), GenerateError> {
    let guid = project_guid(&config.generate.guid_salt, &project.kind, &project.name);
    let closure = scanner.dependency_closure(&project.entry_file, sink)?;

    let mut sources = vec![closure.start.clone()];
    sources.extend(closure.sources.iter().cloned());

    let template_name = format!("{}{}", config.generate.template_prefix, project.kind);
    let template_path = layout.template_dir.join(format!("{template_name}.vcxproj"));
    if !template_path.is_file() {
        return Err(GenerateError::TemplateNotFound {
            project_type: project.kind.clone(),
            path: template_path,
        });
    }
    let template_identity =
        FileIdentity::of(&template_path).map_err(GenerateError::io(&template_path))?;

    let entry = PlanEntry {
        headers: snapshot(scanner, &closure.headers)?,
        name: project.name.clone(),
        sources: snapshot(scanner, &sources)?,
        template_identity,
        kind: project.kind.clone(),
    };
    let verdict = plan_project(
        cached.project(&project.name),
        &entry,
        config.generate.granularity,
        force,
    );
    tracing::info!(project = %project, sources = sources.len(), "{verdict}");

    let outcome = ProjectOutcome {
        project: project.clone(),
        guid,
        source_count: sources.len(),
        verdict,
    };
    Ok((
        PlannedProject {
            outcome,
            template_name,
            sources,
        },
        entry,
    ))
}

fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_template(path: &Path) -> Result<String, GenerateError> {
    let bytes = fs::read(path).map_err(GenerateError::io(path))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn emit_project(
    layout: &ResolvedLayout,
    build_dir: &Path,
    source_root: &Path,
    plan: &PlannedProject,
) -> Result<(), GenerateError> {
    let project = &plan.outcome.project;
    let sources: Vec<String> = plan
        .sources
        .iter()
        .map(|key| to_posix(&relative_between(&source_root.join(key), build_dir)))
        .collect();

    let template_path = layout
        .template_dir
        .join(format!("{}.vcxproj", plan.template_name));
    let template = read_template(&template_path)?;
    let text = render_project(
        &template,
        &plan.template_name,
        &project.name,
        &plan.outcome.guid,
        &sources,
    )
    .map_err(|e| GenerateError::Xml {
        path: template_path.clone(),
        reason: e.to_string(),
    })?;
    let out_path = build_dir.join(format!("{}.vcxproj", project.name));
    write_atomic(&out_path, text.as_bytes()).map_err(GenerateError::io(&out_path))?;

    let filters_path = layout
        .template_dir
        .join(format!("{}.vcxproj.filters", plan.template_name));
    if filters_path.is_file() {
        let template = read_template(&filters_path)?;
        let text = render_filters(
            &template,
            &plan.template_name,
            &project.name,
            &sources,
            new_solution_guid,
        )
        .map_err(|e| GenerateError::Xml {
            path: filters_path.clone(),
            reason: e.to_string(),
        })?;
        let out_path = build_dir.join(format!("{}.vcxproj.filters", project.name));
        write_atomic(&out_path, text.as_bytes()).map_err(GenerateError::io(&out_path))?;
    }
    tracing::info!("wrote {}", out_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tybuild_config::resolve_layout;

    #[test]
    fn to_posix_joins_with_slashes() {
        assert_eq!(to_posix(Path::new("../src/net/Socket.cpp")), "../src/net/Socket.cpp");
    }

    #[test]
    fn missing_source_dir_is_reported_first() {
        let dir = tempfile::tempdir().unwrap();
        let config = TybuildConfig::default();
        let layout = resolve_layout(&config, dir.path());
        let err = generate(&config, &layout, false, &DiagnosticSink::new()).unwrap_err();
        match err {
            GenerateError::MissingDirectory { what, .. } => assert_eq!(what, "source"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!layout.build_dir.exists());
    }

    #[test]
    fn missing_special_files_warn() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DiagnosticSink::new();
        let copied = copy_special_projects(dir.path(), dir.path(), &sink).unwrap();
        assert!(copied.is_empty());
        assert_eq!(sink.len(), 4);
        assert!(sink
            .diagnostics()
            .iter()
            .all(|d| d.code == MISSING_SPECIAL_PROJECT));
    }
}
