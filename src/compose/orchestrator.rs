//! Compose project supervisor
//!
//! Drives a project through
//! `Idle -> NetworksCreated -> ServicesStarting -> AllStarted | PartialFailure
//! -> LogsAttached -> TearingDown -> Idle`. Every runtime call goes through a
//! [`RuntimeInvoker`]; in dry-run mode the equivalent command line is written
//! to the output instead.

use super::config::Descriptor;
use super::logs::{multiplex, prefix_width, write_prefixed, LogSource};
use super::network::{collect_networks, network_from_plan};
use super::order::{start_order, stop_order};
use super::parser::Project;
use super::translator::{container_name, translate};
use crate::error::{Result, RindError};
use crate::image::ImageResolver;
use crate::runtime::{render_command, RuntimeInvoker};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Compose project state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectState {
    /// Nothing in progress
    Idle,
    /// Planned networks have been requested
    NetworksCreated,
    /// Services are being started in dependency order
    ServicesStarting,
    /// Every service started
    AllStarted,
    /// At least one service failed to start
    PartialFailure,
    /// Following the logs of started containers
    LogsAttached,
    /// Stopping and removing containers and networks
    TearingDown,
}

/// Output format of `compose ps`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PsFormat {
    /// Runtime listing filtered to the project's containers
    #[default]
    Table,
    /// `inspect` output per container
    Json,
}

/// Options for `compose ps`
#[derive(Debug, Clone, Default)]
pub struct PsOptions {
    /// Output format
    pub format: PsFormat,
    /// Case-insensitive status filter
    pub status: Option<String>,
    /// Print container names only
    pub quiet: bool,
}

/// Options for `compose logs`
#[derive(Debug, Clone, Default)]
pub struct LogsOptions {
    /// Keep streaming until interrupted
    pub follow: bool,
    /// Number of lines from the end of each log
    pub tail: Option<usize>,
    /// Services to show; all when empty
    pub services: Vec<String>,
}

/// Output format of `compose config`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    /// YAML document
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

/// Resolved plan for one service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServicePlan {
    /// Service name
    pub name: String,
    /// Runtime container name
    pub container_name: String,
    /// Network the container joins
    pub network: Option<String>,
    /// Runtime arguments that start the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Why the service cannot be started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Keys that are present but not translated
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unsupported_keys: Vec<String>,
}

/// Resolved plan for a whole project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectPlan {
    /// Project name
    pub project: String,
    /// Compose file the plan was derived from
    pub compose_file: PathBuf,
    /// Service start order
    pub order: Vec<String>,
    /// Networks created before any service starts
    pub networks: Vec<String>,
    /// Per-service plans in start order
    pub services: Vec<ServicePlan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Inherit stdio
    Foreground,
    /// Discard output
    Silent,
}

/// Compose orchestrator
pub struct ComposeOrchestrator<R, W> {
    /// Project identity
    project: Project,
    /// Parsed compose file
    descriptor: Descriptor,
    /// Runs the container CLI
    invoker: R,
    /// Primary output
    out: W,
    /// Qualifies image references
    resolver: ImageResolver,
    /// Render commands instead of running them
    dry_run: bool,
    /// Current state
    state: ProjectState,
    /// Ends attached log following
    token: CancellationToken,
    /// Cancel `token` on Ctrl+C while attached
    watch_interrupts: bool,
}

impl<R: RuntimeInvoker, W: Write> ComposeOrchestrator<R, W> {
    /// Create a new orchestrator
    pub fn new(project: Project, descriptor: Descriptor, invoker: R, out: W) -> Self {
        Self {
            project,
            descriptor,
            invoker,
            out,
            resolver: ImageResolver::default(),
            dry_run: false,
            state: ProjectState::Idle,
            token: CancellationToken::new(),
            watch_interrupts: true,
        }
    }

    /// Use a specific image resolver
    pub fn resolver(mut self, resolver: ImageResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Render runtime commands instead of executing them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// End attached phases through `token` instead of Ctrl+C
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self.watch_interrupts = false;
        self
    }

    /// Current state
    pub fn state(&self) -> ProjectState {
        self.state
    }

    /// Project identity
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Runtime invoker
    pub fn invoker(&self) -> &R {
        &self.invoker
    }

    /// Consume the orchestrator and return its output
    pub fn into_output(self) -> W {
        self.out
    }

    fn transition(&mut self, next: ProjectState) {
        tracing::debug!("project {}: {:?} -> {:?}", self.project.name, self.state, next);
        self.state = next;
    }

    async fn invoke(&mut self, args: &[String], mode: Mode) -> Result<i32> {
        if self.dry_run {
            writeln!(self.out, "{}", render_command(self.invoker.binary(), args))?;
            return Ok(0);
        }

        match mode {
            Mode::Foreground => self.invoker.run(args).await,
            Mode::Silent => self.invoker.run_silent(args).await,
        }
    }

    /// Run a command and report whether it succeeded, warning otherwise
    async fn invoke_checked(&mut self, args: &[String], mode: Mode, what: &str) -> bool {
        match self.invoke(args, mode).await {
            Ok(0) => true,
            Ok(code) => {
                tracing::warn!("failed to {} (exit status {})", what, code);
                false
            }
            Err(e) => {
                tracing::warn!("failed to {}: {}", what, e);
                false
            }
        }
    }

    fn warn_unsupported(&self, order: &[String]) {
        for name in order {
            if let Some(service) = self.descriptor.service(name) {
                for key in &service.unsupported_keys {
                    tracing::warn!("service '{}' uses unsupported option '{}' (ignored)", name, key);
                }
            }
        }
    }

    /// Container names of the given services, in the given order
    fn containers(&self, services: &[String]) -> Vec<(String, String)> {
        services
            .iter()
            .filter_map(|name| {
                let service = self.descriptor.service(name)?;
                Some((container_name(service, name, &self.project.name), name.clone()))
            })
            .collect()
    }

    /// Resolve the plan without running anything
    pub fn plan(&self) -> ProjectPlan {
        let order = start_order(&self.descriptor.services);
        let networks = collect_networks(&self.descriptor, &self.project.name);

        let services = order
            .iter()
            .filter_map(|name| {
                let service = self.descriptor.service(name)?;
                let network = network_from_plan(service, &networks, &self.project.name);
                let translated = translate(
                    service,
                    name,
                    &self.project.name,
                    network.as_deref(),
                    &self.resolver,
                );

                Some(ServicePlan {
                    name: name.clone(),
                    container_name: container_name(service, name, &self.project.name),
                    network,
                    error: translated.as_ref().err().map(ToString::to_string),
                    args: translated.ok(),
                    unsupported_keys: service.unsupported_keys.clone(),
                })
            })
            .collect();

        ProjectPlan {
            project: self.project.name.clone(),
            compose_file: self.project.compose_file.clone(),
            order,
            networks,
            services,
        }
    }

    /// Create networks and start every service, then follow logs unless
    /// `detach` is set
    ///
    /// A service that fails to start does not stop the others; the call
    /// fails once every service has been attempted.
    pub async fn up(&mut self, detach: bool) -> Result<()> {
        tracing::info!("Starting compose project: {}", self.project.name);

        let plan = self.plan();
        self.warn_unsupported(&plan.order);

        for network in &plan.networks {
            if !self.dry_run {
                tracing::info!("creating network {}", network);
            }
            let args = vec!["network".to_string(), "create".to_string(), network.clone()];
            // An existing network is not distinguished from a failed create
            let code = self.invoke(&args, Mode::Silent).await?;
            if code != 0 {
                tracing::debug!("network create {} exited with status {}", network, code);
            }
        }
        self.transition(ProjectState::NetworksCreated);
        self.transition(ProjectState::ServicesStarting);

        let mut started = Vec::new();
        let mut failed = Vec::new();

        for service in plan.services {
            let args = match service.args {
                Some(args) => args,
                None => {
                    tracing::warn!("{}", service.error.unwrap_or_default());
                    failed.push(service.name);
                    continue;
                }
            };

            if !self.dry_run {
                tracing::info!("starting {}", service.container_name);
            }
            let what = format!("start service '{}'", service.name);
            if self.invoke_checked(&args, Mode::Foreground, &what).await {
                started.push((service.container_name, service.name));
            } else {
                failed.push(service.name);
            }
        }

        if !failed.is_empty() {
            self.transition(ProjectState::PartialFailure);
            return Err(RindError::PartialFailure {
                operation: "start",
                failed,
            });
        }
        self.transition(ProjectState::AllStarted);

        if detach || self.dry_run || started.is_empty() {
            self.transition(ProjectState::Idle);
            return Ok(());
        }

        // Kept through teardown; streams may all end before the first Ctrl+C
        let _watcher = self.watch_interrupts();
        let followed = self.follow(&started, &["logs", "--follow"]).await;

        // Teardown runs even when writing logs failed
        self.token.cancelled().await;
        tracing::info!("gracefully stopping...");
        self.transition(ProjectState::TearingDown);

        self.stop_containers().await;
        self.delete_networks(&plan.networks).await;
        self.transition(ProjectState::Idle);

        followed
    }

    fn watch_interrupts(&self) -> Option<InterruptWatcher> {
        self.watch_interrupts
            .then(|| InterruptWatcher::spawn(self.token.clone()))
    }

    /// Attach to the logs of `containers` until interrupted or every
    /// stream ends
    async fn follow(&mut self, containers: &[(String, String)], base: &[&str]) -> Result<()> {
        self.transition(ProjectState::LogsAttached);
        tracing::info!("attaching to logs (press Ctrl+C to stop)...");

        let mut sources = Vec::new();
        for (container, service) in containers {
            let mut args: Vec<String> = base.iter().map(|s| s.to_string()).collect();
            args.push(container.clone());

            match self.invoker.stream(&args) {
                Ok(stream) => sources.push(LogSource::new(service.clone(), stream)),
                Err(e) => tracing::warn!("could not attach to logs for '{}': {}", service, e),
            }
        }

        multiplex(sources, &mut self.out, &self.token).await
    }

    /// Stop then remove each service's container, dependents first; returns
    /// the services that could not be stopped or removed
    async fn stop_containers(&mut self) -> Vec<String> {
        let order = stop_order(&self.descriptor.services);
        let mut failed = Vec::new();

        for (container, service) in self.containers(&order) {
            if !self.dry_run {
                tracing::info!("stopping {}", container);
            }
            let stop = vec!["stop".to_string(), container.clone()];
            let stopped = self
                .invoke_checked(&stop, Mode::Silent, &format!("stop '{}'", container))
                .await;

            if !self.dry_run {
                tracing::info!("removing {}", container);
            }
            let delete = vec!["delete".to_string(), container.clone()];
            let removed = self
                .invoke_checked(&delete, Mode::Silent, &format!("remove '{}'", container))
                .await;

            if !(stopped && removed) {
                failed.push(service);
            }
        }

        failed
    }

    /// Delete planned networks, warning on failure
    async fn delete_networks(&mut self, networks: &[String]) {
        for network in networks {
            if !self.dry_run {
                tracing::info!("removing network {}", network);
            }
            let args = vec!["network".to_string(), "delete".to_string(), network.clone()];
            self.invoke_checked(&args, Mode::Silent, &format!("remove network '{}'", network))
                .await;
        }
    }

    /// Stop and remove every container, then delete networks
    ///
    /// With `remove_volumes`, named volumes declared in the compose file are
    /// deleted as well, except external ones.
    pub async fn down(&mut self, remove_volumes: bool) -> Result<()> {
        tracing::info!("Stopping compose project: {}", self.project.name);

        let networks = collect_networks(&self.descriptor, &self.project.name);

        self.transition(ProjectState::TearingDown);
        let failed = self.stop_containers().await;
        self.delete_networks(&networks).await;

        if remove_volumes {
            let volumes: Vec<String> = self
                .descriptor
                .volumes
                .iter()
                .filter(|(_, spec)| !spec.is_external())
                .map(|(name, _)| format!("{}_{}", self.project.name, name))
                .collect();

            for volume in volumes {
                if !self.dry_run {
                    tracing::info!("removing volume {}", volume);
                }
                let args = vec!["volume".to_string(), "delete".to_string(), volume.clone()];
                self.invoke_checked(&args, Mode::Silent, &format!("remove volume '{}'", volume))
                    .await;
            }
        }
        self.transition(ProjectState::Idle);

        if failed.is_empty() {
            Ok(())
        } else {
            Err(RindError::PartialFailure {
                operation: "stop or remove",
                failed,
            })
        }
    }

    /// List the project's containers
    pub async fn ps(&mut self, options: &PsOptions) -> Result<()> {
        let containers: Vec<String> = self
            .containers(&self.descriptor.service_names())
            .into_iter()
            .map(|(container, _)| container)
            .collect();

        let list = vec!["ls".to_string(), "--all".to_string()];
        let (code, listing) = self.invoker.capture(&list).await?;
        if code != 0 {
            return Err(RindError::RuntimeInvocation {
                command: render_command(self.invoker.binary(), &list),
                code,
            });
        }

        if options.format == PsFormat::Json {
            for container in &containers {
                let inspect = vec!["inspect".to_string(), container.clone()];
                let (code, text) = self.invoker.capture(&inspect).await?;
                if code == 0 {
                    writeln!(self.out, "{}", text.trim())?;
                }
            }
            return Ok(());
        }

        let status = options.status.as_deref().map(str::to_lowercase);
        let status_matches =
            |line: &str| status.as_ref().map_or(true, |s| line.to_lowercase().contains(s));

        let mut lines = listing.lines();

        if options.quiet {
            let rows: Vec<&str> = lines.skip(1).collect();
            for container in &containers {
                let row = rows.iter().find(|row| row.contains(container.as_str()));
                if row.is_some_and(|row| status_matches(row)) {
                    writeln!(self.out, "{}", container)?;
                }
            }
            return Ok(());
        }

        if let Some(header) = lines.next().filter(|h| !h.is_empty()) {
            writeln!(self.out, "{}", header)?;
        }
        for line in lines.filter(|line| !line.is_empty()) {
            let ours = containers.iter().any(|c| line.contains(c.as_str()));
            if ours && status_matches(line) {
                writeln!(self.out, "{}", line)?;
            }
        }

        Ok(())
    }

    /// Print service logs with a service-name prefix
    pub async fn logs(&mut self, options: &LogsOptions) -> Result<()> {
        let targets = if options.services.is_empty() {
            self.descriptor.service_names()
        } else {
            options.services.clone()
        };

        for name in targets.iter().filter(|n| self.descriptor.service(n).is_none()) {
            tracing::warn!("no such service '{}'", name);
        }
        let containers = self.containers(&targets);

        let mut base = vec!["logs".to_string()];
        if options.follow {
            base.push("--follow".to_string());
        }
        if let Some(tail) = options.tail {
            base.push("-n".to_string());
            base.push(tail.to_string());
        }

        if options.follow {
            if containers.is_empty() {
                return Ok(());
            }
            let base: Vec<&str> = base.iter().map(String::as_str).collect();
            let _watcher = self.watch_interrupts();
            let result = self.follow(&containers, &base).await;
            self.transition(ProjectState::Idle);
            return result;
        }

        let width = prefix_width(containers.iter().map(|(_, service)| service.as_str()));
        for (container, service) in &containers {
            let mut args = base.clone();
            args.push(container.clone());

            let (code, text) = self.invoker.capture(&args).await?;
            if code == 0 {
                write_prefixed(&mut self.out, service, width, &text)?;
            } else {
                tracing::warn!("could not read logs for '{}' (exit status {})", service, code);
            }
        }

        Ok(())
    }

    /// Pull the image of each named service, or of every service
    pub async fn pull(&mut self, services: &[String]) -> Result<()> {
        if let Some(unknown) = services.iter().find(|n| self.descriptor.service(n).is_none()) {
            return Err(RindError::ServiceNotFound(unknown.clone()));
        }
        let targets = if services.is_empty() {
            self.descriptor.service_names()
        } else {
            services.to_vec()
        };

        let mut failed = Vec::new();
        for name in targets {
            let image = self
                .descriptor
                .service(&name)
                .and_then(|service| service.image.clone());

            let Some(image) = image else {
                tracing::warn!("skipping '{}' (no image specified)", name);
                continue;
            };

            let resolved = self.resolver.resolve(&image);
            if !self.dry_run {
                tracing::info!("pulling {} for service '{}'", resolved, name);
            }
            let args = vec!["image".to_string(), "pull".to_string(), resolved];
            let what = format!("pull image for service '{}'", name);
            if !self.invoke_checked(&args, Mode::Foreground, &what).await {
                failed.push(name);
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(RindError::PartialFailure {
                operation: "pull",
                failed,
            })
        }
    }

    /// Write the resolved plan
    pub fn config(&mut self, format: ConfigFormat) -> Result<()> {
        let plan = self.plan();
        let text = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(&plan)?,
            ConfigFormat::Yaml => serde_yaml::to_string(&plan)?,
        };
        writeln!(self.out, "{}", text.trim_end())?;
        Ok(())
    }
}

/// Cancels a token on the first Ctrl+C
///
/// After the first interrupt a second one ends the process with status 130,
/// as the default handler would. The listener stops when the watcher is
/// dropped.
struct InterruptWatcher {
    handle: JoinHandle<()>,
}

impl InterruptWatcher {
    fn spawn(token: CancellationToken) -> Self {
        let handle = tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("unable to listen for interrupts: {}", e);
                return;
            }
            token.cancel();

            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        });
        Self { handle }
    }
}

impl Drop for InterruptWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
