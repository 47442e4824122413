//! Layout resolution: turning configured relative directories into absolute paths.

use crate::types::TybuildConfig;
use std::path::{Path, PathBuf};

/// The repository layout with every directory joined onto the base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    /// The base (repository) directory.
    pub base: PathBuf,
    /// Root of the scanned C++ tree.
    pub source_root: PathBuf,
    /// Root of two-level project discovery.
    pub project_root: PathBuf,
    /// Directory holding project templates.
    pub template_dir: PathBuf,
    /// Output directory for generated files.
    pub build_dir: PathBuf,
}

impl ResolvedLayout {
    /// Path of the include cache inside the source root.
    pub fn include_cache(&self, config: &TybuildConfig) -> PathBuf {
        self.source_root.join(&config.scan.cache_file)
    }

    /// Path of the regeneration plan cache inside the build directory.
    pub fn plan_cache(&self, config: &TybuildConfig) -> PathBuf {
        self.build_dir.join(&config.generate.plan_file)
    }
}

/// Resolves the configured layout against `base`.
pub fn resolve_layout(config: &TybuildConfig, base: &Path) -> ResolvedLayout {
    let join = |rel: &str| base.join(rel.trim_end_matches('/'));
    ResolvedLayout {
        base: base.to_path_buf(),
        source_root: join(&config.layout.source_dir),
        project_root: join(&config.layout.project_dir),
        template_dir: join(&config.layout.template_dir),
        build_dir: join(&config.layout.build_dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn default_layout() {
        let config = TybuildConfig::default();
        let layout = resolve_layout(&config, Path::new("/repo"));
        assert_eq!(layout.source_root, PathBuf::from("/repo/src"));
        assert_eq!(layout.project_root, PathBuf::from("/repo/src/project"));
        assert_eq!(layout.template_dir, PathBuf::from("/repo/build_template"));
        assert_eq!(layout.build_dir, PathBuf::from("/repo/build"));
        assert_eq!(
            layout.include_cache(&config),
            PathBuf::from("/repo/src/includes.cache")
        );
        assert_eq!(layout.plan_cache(&config), PathBuf::from("/repo/build/.tybuild"));
    }

    #[test]
    fn custom_layout_trailing_slash() {
        let config = load_config_from_str("[layout]\nbuild_dir = \"out/vs/\"\n").unwrap();
        let layout = resolve_layout(&config, Path::new("/repo"));
        assert_eq!(layout.build_dir, PathBuf::from("/repo/out/vs"));
    }
}
