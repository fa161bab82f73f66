//! `compose` subcommands

use super::Context;
use crate::compose::{
    resolve_project, ComposeOrchestrator, ComposeParser, ConfigFormat, LogsOptions, PsFormat,
    PsOptions,
};
use crate::error::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Arguments for `compose`
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Compose file
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Project name
    #[arg(short = 'p', long = "project-name")]
    pub project_name: Option<String>,

    #[command(subcommand)]
    pub command: ComposeCommand,
}

/// Compose subcommands
#[derive(Subcommand, Debug)]
pub enum ComposeCommand {
    /// Create and start services
    Up {
        /// Run in detached mode
        #[arg(short, long)]
        detach: bool,
        /// Show the runtime commands without executing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Stop and remove services
    Down {
        /// Show the runtime commands without executing them
        #[arg(long)]
        dry_run: bool,
        /// Remove named volumes declared in the compose file
        #[arg(short, long)]
        volumes: bool,
    },
    /// List services
    Ps {
        /// Output format
        #[arg(long, value_enum, default_value_t = PsFormat::Table)]
        format: PsFormat,
        /// Filter by container status
        #[arg(long)]
        status: Option<String>,
        /// Only display container names
        #[arg(short, long)]
        quiet: bool,
    },
    /// View service logs
    Logs {
        /// Follow log output
        #[arg(short, long)]
        follow: bool,
        /// Number of lines to show from the end of the logs
        #[arg(short = 'n', long)]
        tail: Option<usize>,
        /// Services to show
        services: Vec<String>,
    },
    /// Pull service images
    Pull {
        /// Show the runtime commands without executing them
        #[arg(long)]
        dry_run: bool,
        /// Services to pull; all when omitted
        services: Vec<String>,
    },
    /// Validate and print the resolved compose file
    Config {
        /// Output format
        #[arg(long, value_enum, default_value_t = ConfigFormat::Yaml)]
        format: ConfigFormat,
    },
}

impl ComposeCommand {
    fn dry_run(&self) -> bool {
        match self {
            Self::Up { dry_run, .. } | Self::Down { dry_run, .. } | Self::Pull { dry_run, .. } => {
                *dry_run
            }
            _ => false,
        }
    }
}

/// Execute a compose subcommand
pub async fn execute(ctx: &Context, args: ComposeArgs) -> Result<i32> {
    let parser = ComposeParser::new().accept_keys(ctx.settings.extra_service_keys.iter().cloned());
    let (path, descriptor) = parser.load(&ctx.cwd, args.file.as_deref())?;
    tracing::debug!("loaded compose file {}", path.display());

    let project = resolve_project(&ctx.cwd, args.project_name.as_deref(), path);
    let mut orchestrator =
        ComposeOrchestrator::new(project, descriptor, ctx.runtime.clone(), std::io::stdout())
            .resolver(ctx.resolver.clone())
            .dry_run(args.command.dry_run());

    match args.command {
        ComposeCommand::Up { detach, .. } => orchestrator.up(detach).await?,
        ComposeCommand::Down { volumes, .. } => orchestrator.down(volumes).await?,
        ComposeCommand::Ps {
            format,
            status,
            quiet,
        } => {
            orchestrator
                .ps(&PsOptions {
                    format,
                    status,
                    quiet,
                })
                .await?
        }
        ComposeCommand::Logs {
            follow,
            tail,
            services,
        } => {
            orchestrator
                .logs(&LogsOptions {
                    follow,
                    tail,
                    services,
                })
                .await?
        }
        ComposeCommand::Pull { services, .. } => orchestrator.pull(&services).await?,
        ComposeCommand::Config { format } => orchestrator.config(format)?,
    }

    Ok(0)
}
