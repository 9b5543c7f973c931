//! `.sugar.yaml` loading and profile selection.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::{Result, SugarError};

pub const DEFAULT_CONFIG_FILE: &str = ".sugar.yaml";
pub const DEFAULT_PROFILE: &str = "profile-defaults";

/// Top-level tool configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SugarConfig {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Defaults {
    #[serde(default)]
    pub profile: Option<String>,
}

/// A named configuration group selecting which compose files and settings
/// apply to a command invocation.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub config_path: ConfigPath,
    #[serde(default)]
    pub env_file: Option<String>,
}

/// `config-path` accepts either a single file or a list of files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConfigPath {
    Single(String),
    Many(Vec<String>),
}

impl Default for ConfigPath {
    fn default() -> Self {
        ConfigPath::Many(Vec::new())
    }
}

impl ConfigPath {
    /// Compose file paths in declaration order, blanks dropped.
    pub fn files(&self) -> Vec<String> {
        match self {
            ConfigPath::Single(path) => {
                if path.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![path.clone()]
                }
            }
            ConfigPath::Many(paths) => paths
                .iter()
                .filter(|p| !p.trim().is_empty())
                .cloned()
                .collect(),
        }
    }
}

impl SugarConfig {
    /// Load configuration from the given path. A missing file yields an empty
    /// configuration; a present but unparseable file is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(SugarConfig::default());
        }
        let text = fs::read_to_string(path).map_err(|e| {
            SugarError::invalid_configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_yaml::from_str(&text).map_err(|e| {
            SugarError::invalid_configuration(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Pick the active profile: explicit flag first, then the `defaults`
    /// section, then the conventional fallback name.
    pub fn select_profile(&self, requested: Option<&str>) -> (String, Profile) {
        let name = requested
            .map(str::to_string)
            .or_else(|| self.defaults.profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        let profile = self.profiles.get(&name).cloned().unwrap_or_default();
        (name, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profile_with_file_list() {
        let yaml = r#"
defaults:
  profile: dev
profiles:
  dev:
    project-name: demo
    config-path:
      - containers/compose.yaml
      - containers/compose.override.yaml
    env-file: .env
"#;
        let config: SugarConfig = serde_yaml::from_str(yaml).unwrap();
        let (name, profile) = config.select_profile(None);
        assert_eq!(name, "dev");
        assert_eq!(profile.project_name.as_deref(), Some("demo"));
        assert_eq!(
            profile.config_path.files(),
            vec!["containers/compose.yaml", "containers/compose.override.yaml"]
        );
        assert_eq!(profile.env_file.as_deref(), Some(".env"));
    }

    #[test]
    fn parses_profile_with_single_file() {
        let yaml = r#"
profiles:
  prod:
    config-path: compose.yaml
"#;
        let config: SugarConfig = serde_yaml::from_str(yaml).unwrap();
        let (_, profile) = config.select_profile(Some("prod"));
        assert_eq!(profile.config_path.files(), vec!["compose.yaml"]);
    }

    #[test]
    fn unknown_profile_falls_back_to_empty() {
        let config = SugarConfig::default();
        let (name, profile) = config.select_profile(Some("missing"));
        assert_eq!(name, "missing");
        assert!(profile.config_path.files().is_empty());
    }

    #[test]
    fn default_profile_name_when_nothing_selected() {
        let config = SugarConfig::default();
        let (name, _) = config.select_profile(None);
        assert_eq!(name, DEFAULT_PROFILE);
    }

    #[test]
    fn missing_file_loads_empty_config() {
        let config = SugarConfig::load(Path::new("/nonexistent/.sugar.yaml")).unwrap();
        assert!(config.profiles.is_empty());
    }
}
