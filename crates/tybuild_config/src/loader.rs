//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::TybuildConfig;
use std::path::Path;

/// Name of the configuration file looked up in the base directory.
pub const CONFIG_FILE: &str = "tybuild.toml";

/// Loads `<base_dir>/tybuild.toml`, falling back to defaults when it is absent.
pub fn load_config(base_dir: &Path) -> Result<TybuildConfig, ConfigError> {
    let path = base_dir.join(CONFIG_FILE);
    if !path.is_file() {
        tracing::debug!("no {CONFIG_FILE} in {}, using defaults", base_dir.display());
        return Ok(TybuildConfig::default());
    }
    load_config_file(&path)
}

/// Loads an explicitly named configuration file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<TybuildConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a `tybuild.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<TybuildConfig, ConfigError> {
    let config: TybuildConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that names are present and file names are plain names.
fn validate_config(config: &TybuildConfig) -> Result<(), ConfigError> {
    let required = [
        ("layout.source_dir", &config.layout.source_dir),
        ("layout.project_dir", &config.layout.project_dir),
        ("layout.template_dir", &config.layout.template_dir),
        ("layout.build_dir", &config.layout.build_dir),
        ("scan.cache_file", &config.scan.cache_file),
        ("generate.solution_name", &config.generate.solution_name),
        ("generate.plan_file", &config.generate.plan_file),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(field.to_string()));
        }
    }

    for (field, value) in [
        ("scan.cache_file", &config.scan.cache_file),
        ("generate.plan_file", &config.generate.plan_file),
        ("generate.solution_name", &config.generate.solution_name),
    ] {
        if value.contains('/') || value.contains('\\') {
            return Err(ConfigError::ValidationError(format!(
                "{field} must be a file name, not a path: '{value}'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Granularity;

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, TybuildConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[layout]
source_dir = "code"
project_dir = "code/apps"
template_dir = "templates"
build_dir = "out"

[scan]
cache_file = "deps.json"

[generate]
granularity = "source-set"
template_prefix = "TPL_"
solution_name = "Game"
guid_salt = "studio"
plan_file = ".plan"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.layout.source_dir, "code");
        assert_eq!(config.layout.project_dir, "code/apps");
        assert_eq!(config.scan.cache_file, "deps.json");
        assert_eq!(config.generate.granularity, Granularity::SourceSet);
        assert_eq!(config.generate.template_prefix, "TPL_");
        assert_eq!(config.generate.solution_name, "Game");
        assert_eq!(config.generate.plan_file, ".plan");
    }

    #[test]
    fn empty_solution_name_errors() {
        let err = load_config_from_str("[generate]\nsolution_name = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "generate.solution_name"));
    }

    #[test]
    fn cache_file_with_separator_errors() {
        let err = load_config_from_str("[scan]\ncache_file = \"a/b.cache\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_key_errors() {
        let err = load_config_from_str("[layout]\nsrc = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, TybuildConfig::default());
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[layout]\nbuild_dir = \"vs\"\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.layout.build_dir, "vs");
    }

    #[test]
    fn explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
