//! User settings
//!
//! Settings are read from `$XDG_CONFIG_HOME/rind/config.yaml` (or the file
//! named by `RIND_CONFIG`). Every field is optional; a missing file yields
//! the defaults.

use crate::error::{Result, RindError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default path of the container CLI
pub const DEFAULT_RUNTIME_BINARY: &str = "/usr/local/bin/container";

/// Environment variable overriding the runtime binary
pub const RUNTIME_ENV: &str = "RIND_RUNTIME";

/// Environment variable pointing at an alternate settings file
pub const CONFIG_ENV: &str = "RIND_CONFIG";

/// Environment variable holding a log filter directive
pub const LOG_ENV: &str = "RIND_LOG";

/// Rind settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Container CLI invoked for every translated command
    pub runtime_binary: String,
    /// Service keys accepted silently in addition to the modeled ones
    pub extra_service_keys: Vec<String>,
    /// Registry prepended to unqualified image references
    pub default_registry: String,
    /// Namespace for single-segment image references
    pub default_namespace: String,
    /// Tag appended when a reference has none
    pub default_tag: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runtime_binary: DEFAULT_RUNTIME_BINARY.to_string(),
            extra_service_keys: Vec::new(),
            default_registry: "docker.io".to_string(),
            default_namespace: "library".to_string(),
            default_tag: "latest".to_string(),
        }
    }
}

impl Settings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rind").join("config.yaml"))
    }

    /// Load settings from the environment-selected or default location,
    /// then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);

        let mut settings = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        if let Ok(binary) = std::env::var(RUNTIME_ENV) {
            if !binary.is_empty() {
                settings.runtime_binary = binary;
            }
        }

        Ok(settings)
    }

    /// Parse a settings file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
            .map_err(|e| RindError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse settings from YAML text; an empty document yields the defaults
    pub fn parse_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Replace the runtime binary (command-line override)
    pub fn with_runtime(mut self, binary: Option<String>) -> Self {
        if let Some(binary) = binary {
            self.runtime_binary = binary;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_for_empty_document() {
        let settings = Settings::parse_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.runtime_binary, DEFAULT_RUNTIME_BINARY);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let settings = Settings::parse_str(
            r#"
runtime_binary: /opt/bin/container
extra_service_keys:
  - restart
"#,
        )
        .unwrap();

        assert_eq!(settings.runtime_binary, "/opt/bin/container");
        assert_eq!(settings.extra_service_keys, vec!["restart"]);
        assert_eq!(settings.default_registry, "docker.io");
        assert_eq!(settings.default_tag, "latest");
    }

    #[test]
    fn test_from_file_reports_path_on_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "runtime_binary: [unterminated").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, RindError::Config(_)));
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn test_runtime_override() {
        let settings = Settings::default().with_runtime(Some("/tmp/fake".to_string()));
        assert_eq!(settings.runtime_binary, "/tmp/fake");

        let settings = Settings::default().with_runtime(None);
        assert_eq!(settings.runtime_binary, DEFAULT_RUNTIME_BINARY);
    }
}
