//! CLI command definitions and dispatch

pub mod compose;
pub mod container;
pub mod image;
pub mod link;
pub mod resource;

use crate::config::Settings;
use crate::error::Result;
use crate::image::ImageResolver;
use crate::runtime::{render_command, ContainerCli, RuntimeInvoker};
use crate::translate::hint_for;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rind - Docker-compatible front end for the container CLI
#[derive(Parser, Debug)]
#[command(name = "rind")]
#[command(author = "Evoker Industries")]
#[command(version)]
#[command(about = "Docker-compatible commands translated to the container CLI", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Container CLI to invoke
    #[arg(long, global = true, value_name = "PATH")]
    pub runtime: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create and run a new container
    Run(container::RunArgs),
    /// List containers
    Ps(container::PsArgs),
    /// Stop one or more containers
    Stop(container::StopArgs),
    /// Remove one or more containers
    Rm(container::RmArgs),
    /// Fetch the logs of a container
    Logs(container::LogsArgs),
    /// Execute a command in a running container
    Exec(container::ExecArgs),
    /// Display detailed information on containers
    Inspect(container::InspectArgs),
    /// List images
    Images(image::ImagesArgs),
    /// Pull an image
    Pull(image::PullArgs),
    /// Build an image from a Dockerfile
    Build(image::BuildArgs),
    /// Manage networks
    Network {
        #[command(subcommand)]
        command: resource::ResourceCommand,
    },
    /// Manage volumes
    Volume {
        #[command(subcommand)]
        command: resource::ResourceCommand,
    },
    /// Docker Compose commands
    Compose(compose::ComposeArgs),
    /// Check that the container CLI can be used
    Doctor,
    /// Manage the `docker` symlink
    Link(link::LinkArgs),
}

/// Shared state for one invocation
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective settings
    pub settings: Settings,
    /// Container CLI
    pub runtime: ContainerCli,
    /// Image reference resolver
    pub resolver: ImageResolver,
    /// Working directory
    pub cwd: PathBuf,
}

impl Context {
    /// Build the context from settings and the current directory
    pub fn new(settings: Settings) -> Result<Self> {
        Ok(Self {
            runtime: ContainerCli::new(settings.runtime_binary.clone()),
            resolver: ImageResolver::from_settings(&settings),
            cwd: std::env::current_dir()?,
            settings,
        })
    }

    /// Run a translated command with inherited stdio, or print it
    ///
    /// A failing command is followed by a hint on stderr when one is known.
    pub async fn passthrough(&self, args: Vec<String>, dry_run: bool) -> Result<i32> {
        if dry_run {
            println!("{}", render_command(self.runtime.binary(), &args));
            return Ok(0);
        }

        let code = self.runtime.run(&args).await?;
        if code != 0 {
            if let Some(hint) = hint_for(&args) {
                tracing::info!("hint: {}", hint);
            }
        }
        Ok(code)
    }
}

/// Dispatch a parsed command line; returns the process exit status
pub async fn execute(cli: Cli) -> anyhow::Result<i32> {
    let settings = Settings::load()?.with_runtime(cli.runtime);
    let ctx = Context::new(settings)?;

    let code = match cli.command {
        Commands::Run(args) => container::run(&ctx, args).await?,
        Commands::Ps(args) => ctx.passthrough(args.runtime_args(), args.dry_run).await?,
        Commands::Stop(args) => ctx.passthrough(args.runtime_args(), false).await?,
        Commands::Rm(args) => ctx.passthrough(args.runtime_args(), args.dry_run).await?,
        Commands::Logs(args) => ctx.passthrough(args.runtime_args(), args.dry_run).await?,
        Commands::Exec(args) => container::exec(&ctx, args).await?,
        Commands::Inspect(args) => ctx.passthrough(args.runtime_args(), false).await?,
        Commands::Images(args) => ctx.passthrough(args.runtime_args(), args.dry_run).await?,
        Commands::Pull(args) => {
            ctx.passthrough(args.runtime_args(&ctx.resolver), false)
                .await?
        }
        Commands::Build(args) => ctx.passthrough(args.runtime_args(), false).await?,
        Commands::Network { command } => {
            ctx.passthrough(command.runtime_args("network"), command.dry_run())
                .await?
        }
        Commands::Volume { command } => {
            ctx.passthrough(command.runtime_args("volume"), command.dry_run())
                .await?
        }
        Commands::Compose(args) => compose::execute(&ctx, args).await?,
        Commands::Doctor => {
            let mut stdout = std::io::stdout();
            crate::doctor::execute(&ctx.runtime, &mut stdout).await?
        }
        Commands::Link(args) => link::execute(args)?,
    };

    Ok(code)
}

/// Collect string slices into owned arguments
pub(crate) fn to_args(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}
