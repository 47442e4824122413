//! Regeneration planning and the persisted plan cache.
//!
//! The plan cache (`build/.tybuild` by default) records, for every project of
//! the last run, the identities of its template and of every file it was
//! generated from. The planner compares a fresh snapshot against it and
//! decides, per project and for the solution, whether output must be
//! rewritten.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tybuild_common::{write_atomic, FileIdentity};
use tybuild_config::Granularity;

use crate::error::GenerateError;

/// Identity snapshot of one project.
///
/// Fields are declared in alphabetical order so the serialized document is
/// stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Reachable headers and their identities.
    #[serde(default)]
    pub headers: BTreeMap<String, FileIdentity>,
    /// Project name.
    pub name: String,
    /// Entry file plus reachable sources, with identities.
    #[serde(default)]
    pub sources: BTreeMap<String, FileIdentity>,
    /// Identity of the project template.
    pub template_identity: FileIdentity,
    /// Project type.
    #[serde(rename = "type")]
    pub kind: String,
}

/// The persisted result of the last generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCache {
    /// Projects in discovery order.
    #[serde(default)]
    pub projects: Vec<PlanEntry>,
    /// GUID of the generated solution.
    #[serde(default)]
    pub solution_guid: Option<String>,
}

impl PlanCache {
    /// Loads the plan cache at `path`.
    ///
    /// A missing or unreadable document yields an empty cache and the reason
    /// is logged; every project then counts as new.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!("ignoring plan cache {}: {e}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!("ignoring corrupt plan cache {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Writes the plan cache to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), GenerateError> {
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| GenerateError::Serialization {
                reason: e.to_string(),
            })?;
        json.push('\n');
        write_atomic(path, json.as_bytes()).map_err(GenerateError::io(path))
    }

    /// The cached entry for project `name`.
    pub fn project(&self, name: &str) -> Option<&PlanEntry> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// The cached `(name, type)` list, in order.
    pub fn project_set(&self) -> Vec<(&str, &str)> {
        self.projects
            .iter()
            .map(|p| (p.name.as_str(), p.kind.as_str()))
            .collect()
    }
}

/// Why a project or the solution is regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenReason {
    /// Regeneration was requested unconditionally.
    Forced,
    /// The project has no entry in the plan cache.
    NewProject,
    /// The template's identity changed.
    TemplateChanged,
    /// The source set, or a source identity, changed.
    SourcesChanged,
    /// A reachable header was added, removed or changed.
    HeadersChanged,
    /// The ordered list of projects changed.
    ProjectSetChanged,
}

impl fmt::Display for RegenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RegenReason::Forced => "--force flag",
            RegenReason::NewProject => "new project",
            RegenReason::TemplateChanged => "template changed",
            RegenReason::SourcesChanged => "source files changed",
            RegenReason::HeadersChanged => "header files changed",
            RegenReason::ProjectSetChanged => "project set changed",
        };
        f.write_str(text)
    }
}

/// The planner's decision for one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Inputs are unchanged; leave the output alone.
    UpToDate,
    /// The output must be rewritten.
    Regenerate(RegenReason),
}

impl Verdict {
    /// Returns `true` for [`Verdict::Regenerate`].
    pub fn needs_regeneration(&self) -> bool {
        matches!(self, Verdict::Regenerate(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::UpToDate => f.write_str("up to date"),
            Verdict::Regenerate(reason) => write!(f, "regenerate ({reason})"),
        }
    }
}

/// Decides whether one project must be regenerated.
///
/// Checks run in order and the first trigger wins: force, new project,
/// template, sources, headers. With [`Granularity::SourceSet`] only the set of
/// source paths is compared and headers are ignored; with
/// [`Granularity::FileIdentity`] every source and header identity counts.
pub fn plan_project(
    cached: Option<&PlanEntry>,
    current: &PlanEntry,
    granularity: Granularity,
    force: bool,
) -> Verdict {
    if force {
        return Verdict::Regenerate(RegenReason::Forced);
    }
    let Some(cached) = cached else {
        return Verdict::Regenerate(RegenReason::NewProject);
    };
    if cached.template_identity.is_stale(&current.template_identity) {
        return Verdict::Regenerate(RegenReason::TemplateChanged);
    }
    let sources_differ = match granularity {
        Granularity::SourceSet => !cached.sources.keys().eq(current.sources.keys()),
        Granularity::FileIdentity => cached.sources != current.sources,
    };
    if sources_differ {
        return Verdict::Regenerate(RegenReason::SourcesChanged);
    }
    if granularity == Granularity::FileIdentity && cached.headers != current.headers {
        return Verdict::Regenerate(RegenReason::HeadersChanged);
    }
    Verdict::UpToDate
}

/// Decides whether the solution must be regenerated.
///
/// The comparison is order-sensitive: reordering projects counts as a change.
pub fn plan_solution(cached: &PlanCache, current: &[(&str, &str)], force: bool) -> Verdict {
    if force {
        Verdict::Regenerate(RegenReason::Forced)
    } else if cached.project_set() != current {
        Verdict::Regenerate(RegenReason::ProjectSetChanged)
    } else {
        Verdict::UpToDate
    }
}
