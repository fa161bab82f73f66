//! Compose file discovery and parsing

use super::config::{Descriptor, MODELED_SERVICE_KEYS};
use super::interpolate::interpolate;
use crate::error::{Result, RindError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default compose file names, in priority order
pub const DEFAULT_COMPOSE_FILES: &[&str] = &[
    "compose.yml",
    "compose.yaml",
    "docker-compose.yml",
    "docker-compose.yaml",
];

/// Per-invocation project identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Scoping prefix for container and network names
    pub name: String,
    /// Compose file the descriptor was read from
    pub compose_file: PathBuf,
}

/// Compose file parser
#[derive(Debug, Clone, Default)]
pub struct ComposeParser {
    /// Non-modeled service keys accepted without a warning
    accepted_keys: Vec<String>,
    /// Variables used for interpolation; the process environment when unset
    env: Option<HashMap<String, String>>,
}

impl ComposeParser {
    /// Create a parser that reports every non-modeled key
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept additional service keys silently
    pub fn accept_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Interpolate with a fixed set of variables instead of the process environment
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Keys that are translated or explicitly accepted
    pub fn known_keys(&self) -> Vec<String> {
        MODELED_SERVICE_KEYS
            .iter()
            .map(|k| k.to_string())
            .chain(self.accepted_keys.iter().cloned())
            .collect()
    }

    /// Find compose file in directory
    pub fn find_compose_file(dir: &Path) -> Option<PathBuf> {
        DEFAULT_COMPOSE_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Load from an explicit path, or discover a file in `dir`
    pub fn load(&self, dir: &Path, explicit: Option<&Path>) -> Result<(PathBuf, Descriptor)> {
        let path = match explicit {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => dir.join(path),
            None => Self::find_compose_file(dir).ok_or_else(|| RindError::DescriptorNotFound {
                searched: dir.to_path_buf(),
            })?,
        };

        let descriptor = self.parse_file(&path)?;
        Ok((path, descriptor))
    }

    /// Parse compose file from path
    pub fn parse_file(&self, path: &Path) -> Result<Descriptor> {
        // Unreadable or non-UTF-8 files are reported like missing ones
        let content =
            std::fs::read_to_string(path).map_err(|_| RindError::DescriptorNotFound {
                searched: path.to_path_buf(),
            })?;

        self.parse_str(&content, path)
    }

    /// Interpolate and decode compose text; `path` is only used for errors
    pub fn parse_str(&self, content: &str, path: &Path) -> Result<Descriptor> {
        let interpolated = match &self.env {
            Some(env) => interpolate(content, env),
            None => super::interpolate::interpolate_process_env(content),
        };

        let mut descriptor: Descriptor = if interpolated.trim().is_empty() {
            Descriptor::default()
        } else {
            serde_yaml::from_str(&interpolated).map_err(|source| RindError::DescriptorParse {
                path: path.to_path_buf(),
                source,
            })?
        };

        for service in descriptor.services.values_mut() {
            service.classify_keys(&self.accepted_keys);
        }

        Ok(descriptor)
    }
}

/// Derive a project name from a directory path: its last component,
/// lowercased, keeping only `[a-z0-9_-]`
pub fn derive_project_name(directory: &Path) -> String {
    let base = directory
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    base.chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// Resolve the project for a command invocation
pub fn resolve_project(dir: &Path, override_name: Option<&str>, compose_file: PathBuf) -> Project {
    let name = match override_name {
        Some(name) => name.to_string(),
        None => derive_project_name(dir),
    };
    Project { name, compose_file }
}
