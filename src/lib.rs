//! Rind - A Docker-compatible front end for the container CLI
//!
//! Rind translates Docker-style commands into invocations of a target
//! container CLI. It provides:
//!
//! - Single-container commands (`run`, `ps`, `logs`, `exec`, ...)
//! - Docker Compose compatibility (`compose up/down/ps/logs/pull/config`)
//! - Environment checks (`doctor`) and `docker` symlink management (`link`)

pub mod commands;
pub mod compose;
pub mod config;
pub mod doctor;
pub mod error;
pub mod image;
pub mod link;
pub mod runtime;
pub mod translate;

pub use error::{Result, RindError};
