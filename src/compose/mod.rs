//! Docker Compose compatible orchestration
//!
//! A compose file is loaded and interpolated ([`ComposeParser`]), ordered by
//! its `depends_on` edges, given a network plan, translated service by
//! service into container CLI arguments, and driven by
//! [`ComposeOrchestrator`].

pub mod config;
pub mod interpolate;
pub mod logs;
pub mod network;
pub mod orchestrator;
pub mod order;
pub mod parser;
pub mod translator;

pub use config::{CommandSpec, Descriptor, EnvironmentSpec, PortSpec, Service};
pub use network::{collect_networks, network_for_service};
pub use orchestrator::{
    ComposeOrchestrator, ConfigFormat, LogsOptions, ProjectPlan, ProjectState, PsFormat,
    PsOptions,
};
pub use order::{start_order, stop_order};
pub use parser::{derive_project_name, resolve_project, ComposeParser, Project};
pub use translator::{container_name, translate};
