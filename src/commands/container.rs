//! Single-container commands

use super::{to_args, Context};
use crate::error::Result;
use crate::image::ImageResolver;
use crate::translate::{runtime_command, translate_run_volume};
use clap::Args;
use std::path::Path;

/// Arguments for `run`
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Show the translated command without executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Run container in background
    #[arg(short, long)]
    pub detach: bool,

    /// Keep STDIN open even if not attached
    #[arg(short)]
    pub interactive: bool,

    /// Allocate a pseudo-TTY
    #[arg(short)]
    pub tty: bool,

    /// Automatically remove the container when it exits
    #[arg(long)]
    pub rm: bool,

    /// Assign a name to the container
    #[arg(long)]
    pub name: Option<String>,

    /// Publish a container's port(s) to the host
    #[arg(short, long)]
    pub publish: Vec<String>,

    /// Bind mount a volume
    #[arg(short, long)]
    pub volume: Vec<String>,

    /// Set environment variables
    #[arg(short, long)]
    pub env: Vec<String>,

    /// Connect a container to a network
    #[arg(long)]
    pub network: Option<String>,

    /// Number of CPUs
    #[arg(long)]
    pub cpus: Option<String>,

    /// Memory limit
    #[arg(short, long)]
    pub memory: Option<String>,

    /// Image to run
    pub image: String,

    /// Command to run
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl RunArgs {
    /// Whether the session needs the terminal directly
    pub fn is_interactive(&self) -> bool {
        (self.interactive || self.tty) && !self.detach
    }

    /// Runtime arguments; relative bind sources resolve against `cwd`
    pub fn runtime_args(&self, resolver: &ImageResolver, cwd: &Path) -> Vec<String> {
        let mut args = to_args(&["run"]);

        if self.detach {
            args.push("--detach".to_string());
        }
        if self.interactive {
            args.push("-i".to_string());
        }
        if self.tty {
            args.push("-t".to_string());
        }
        if self.rm {
            args.push("--rm".to_string());
        }
        if let Some(name) = &self.name {
            args.extend(["--name".to_string(), name.clone()]);
        }
        for port in &self.publish {
            args.extend(["--publish".to_string(), port.clone()]);
        }
        for volume in &self.volume {
            args.extend(translate_run_volume(volume, cwd));
        }
        for env in &self.env {
            args.extend(["--env".to_string(), env.clone()]);
        }
        if let Some(network) = &self.network {
            args.extend(["--network".to_string(), network.clone()]);
        }
        if let Some(cpus) = &self.cpus {
            args.extend(["--cpus".to_string(), cpus.clone()]);
        }
        if let Some(memory) = &self.memory {
            args.extend(["--memory".to_string(), memory.clone()]);
        }

        args.push(resolver.resolve(&self.image));
        args.extend(self.command.iter().cloned());
        args
    }
}

/// Execute `run`
pub async fn run(ctx: &Context, args: RunArgs) -> Result<i32> {
    let runtime_args = args.runtime_args(&ctx.resolver, &ctx.cwd);

    if args.is_interactive() && !args.dry_run {
        return Err(ctx.runtime.exec_replace(&runtime_args));
    }
    ctx.passthrough(runtime_args, args.dry_run).await
}

/// Arguments for `ps`
#[derive(Args, Debug, Default)]
pub struct PsArgs {
    /// Show the translated command without executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Show all containers (default shows just running)
    #[arg(short, long)]
    pub all: bool,

    /// Only display container IDs
    #[arg(short, long)]
    pub quiet: bool,
}

impl PsArgs {
    /// Runtime arguments
    pub fn runtime_args(&self) -> Vec<String> {
        let mut args = runtime_command("ps");
        if self.all {
            args.push("--all".to_string());
        }
        if self.quiet {
            args.push("--quiet".to_string());
        }
        args
    }
}

/// Arguments for `stop`
#[derive(Args, Debug, Default)]
pub struct StopArgs {
    /// Containers to stop
    #[arg(required = true)]
    pub containers: Vec<String>,
}

impl StopArgs {
    /// Runtime arguments
    pub fn runtime_args(&self) -> Vec<String> {
        let mut args = runtime_command("stop");
        args.extend(self.containers.iter().cloned());
        args
    }
}

/// Arguments for `rm`
#[derive(Args, Debug, Default)]
pub struct RmArgs {
    /// Show the translated command without executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Force the removal of a running container
    #[arg(short, long)]
    pub force: bool,

    /// Containers to remove
    #[arg(required = true)]
    pub containers: Vec<String>,
}

impl RmArgs {
    /// Runtime arguments
    pub fn runtime_args(&self) -> Vec<String> {
        let mut args = runtime_command("rm");
        if self.force {
            args.push("--force".to_string());
        }
        args.extend(self.containers.iter().cloned());
        args
    }
}

/// Arguments for `logs`
#[derive(Args, Debug, Default)]
pub struct LogsArgs {
    /// Show the translated command without executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Follow log output
    #[arg(short, long)]
    pub follow: bool,

    /// Number of lines to show from the end of the logs
    #[arg(short = 'n', long)]
    pub tail: Option<usize>,

    /// Container ID or name
    pub container: String,
}

impl LogsArgs {
    /// Runtime arguments
    pub fn runtime_args(&self) -> Vec<String> {
        let mut args = runtime_command("logs");
        if self.follow {
            args.push("--follow".to_string());
        }
        if let Some(tail) = self.tail {
            args.extend(["--tail".to_string(), tail.to_string()]);
        }
        args.push(self.container.clone());
        args
    }
}

/// Arguments for `exec`
#[derive(Args, Debug, Default)]
pub struct ExecArgs {
    /// Detached mode: run command in the background
    #[arg(short, long)]
    pub detach: bool,

    /// Keep STDIN open even if not attached
    #[arg(short)]
    pub interactive: bool,

    /// Allocate a pseudo-TTY
    #[arg(short)]
    pub tty: bool,

    /// Set environment variables
    #[arg(short, long)]
    pub env: Vec<String>,

    /// Container ID or name
    pub container: String,

    /// Command to execute
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl ExecArgs {
    /// Runtime arguments
    pub fn runtime_args(&self) -> Vec<String> {
        let mut args = runtime_command("exec");
        if self.detach {
            args.push("--detach".to_string());
        }
        if self.interactive {
            args.push("-i".to_string());
        }
        if self.tty {
            args.push("-t".to_string());
        }
        for env in &self.env {
            args.extend(["--env".to_string(), env.clone()]);
        }
        args.push(self.container.clone());
        args.extend(self.command.iter().cloned());
        args
    }
}

/// Execute `exec`
pub async fn exec(ctx: &Context, args: ExecArgs) -> Result<i32> {
    let runtime_args = args.runtime_args();
    if (args.interactive || args.tty) && !args.detach {
        return Err(ctx.runtime.exec_replace(&runtime_args));
    }
    ctx.passthrough(runtime_args, false).await
}

/// Arguments for `inspect`
#[derive(Args, Debug, Default)]
pub struct InspectArgs {
    /// Containers to inspect
    #[arg(required = true)]
    pub containers: Vec<String>,
}

impl InspectArgs {
    /// Runtime arguments
    pub fn runtime_args(&self) -> Vec<String> {
        let mut args = runtime_command("inspect");
        args.extend(self.containers.iter().cloned());
        args
    }
}
