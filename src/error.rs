//! Error types for Rind

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Rind operations
pub type Result<T> = std::result::Result<T, RindError>;

/// Rind error types
#[derive(Error, Debug)]
pub enum RindError {
    #[error("compose file not found in {}\nTried: {}", .searched.display(), crate::compose::parser::DEFAULT_COMPOSE_FILES.join(", "))]
    DescriptorNotFound { searched: PathBuf },

    #[error("failed to parse {}: {source}", .path.display())]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("service '{0}' has no 'image' field (build: directive is not yet supported)")]
    MissingImage(String),

    #[error("`{command}` exited with status {code}")]
    RuntimeInvocation { command: String, code: i32 },

    #[error("failed to execute {binary}: {source}\nIs the container CLI installed? Run 'rind doctor' to check.")]
    RuntimeSpawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to {operation}: {}", .failed.join(", "))]
    PartialFailure {
        operation: &'static str,
        failed: Vec<String>,
    },

    #[error("no such service: {0}")]
    ServiceNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Link(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
