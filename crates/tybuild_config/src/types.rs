//! Configuration types deserialized from `tybuild.toml`.

use serde::Deserialize;

/// The top-level configuration parsed from `tybuild.toml`.
///
/// Every section is optional. A repository without a `tybuild.toml` behaves
/// exactly like one containing an empty file.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TybuildConfig {
    /// Directory layout of the repository.
    pub layout: LayoutConfig,
    /// Include scanning settings.
    pub scan: ScanConfig,
    /// Project and solution generation settings.
    pub generate: GenerateConfig,
}

/// Directory layout, relative to the base directory.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Root of the C++ tree scanned for includes; project sources are
    /// expressed relative to it.
    pub source_dir: String,
    /// Directory whose subdirectories are project types and whose `.cpp`
    /// children are projects.
    pub project_dir: String,
    /// Directory holding `<prefix><type>.vcxproj` templates.
    pub template_dir: String,
    /// Output directory for generated project and solution files.
    pub build_dir: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            source_dir: "src".to_string(),
            project_dir: "src/project".to_string(),
            template_dir: "build_template".to_string(),
            build_dir: "build".to_string(),
        }
    }
}

/// Include scanning settings.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// File name of the persisted include cache, placed in the scanned root.
    pub cache_file: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            cache_file: "includes.cache".to_string(),
        }
    }
}

/// Project and solution generation settings.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    /// How precisely per-project inputs are tracked between runs.
    pub granularity: Granularity,
    /// Prefix of template file names; the template for type `console` is
    /// `<prefix>console.vcxproj`.
    pub template_prefix: String,
    /// Base name of the generated solution file.
    pub solution_name: String,
    /// Salt mixed into deterministic project GUIDs.
    pub guid_salt: String,
    /// File name of the regeneration plan cache inside the build directory.
    pub plan_file: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::default(),
            template_prefix: "ZZZZZZZZ_".to_string(),
            solution_name: "Solution".to_string(),
            guid_salt: "tybuild".to_string(),
            plan_file: ".tybuild".to_string(),
        }
    }
}

/// How the regeneration planner decides that a project's inputs changed.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    /// Only the set of source paths is compared; editing a file in place
    /// does not regenerate its project.
    SourceSet,
    /// The identity of every source and reachable header is compared
    /// (default). A superset of `source-set`.
    #[default]
    FileIdentity,
}
