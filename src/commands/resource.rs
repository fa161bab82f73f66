//! `network` and `volume` management

use crate::translate::resource_verb;
use clap::Subcommand;

/// Resource subcommands shared by `network` and `volume`
#[derive(Subcommand, Debug)]
pub enum ResourceCommand {
    /// List resources
    #[command(name = "ls")]
    Ls {
        /// Show the translated command without executing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Create a resource
    #[command(name = "create")]
    Create {
        /// Resource name
        name: String,
        /// Show the translated command without executing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove one or more resources
    #[command(name = "rm")]
    Rm {
        /// Resource names
        #[arg(required = true)]
        names: Vec<String>,
        /// Show the translated command without executing it
        #[arg(long)]
        dry_run: bool,
    },
}

impl ResourceCommand {
    /// Runtime arguments for the given resource kind
    pub fn runtime_args(&self, kind: &str) -> Vec<String> {
        let mut args = vec![kind.to_string()];
        match self {
            Self::Ls { .. } => args.push(resource_verb("ls").to_string()),
            Self::Create { name, .. } => {
                args.push(resource_verb("create").to_string());
                args.push(name.clone());
            }
            Self::Rm { names, .. } => {
                args.push(resource_verb("rm").to_string());
                args.extend(names.iter().cloned());
            }
        }
        args
    }

    /// Whether only the translated command is wanted
    pub fn dry_run(&self) -> bool {
        match self {
            Self::Ls { dry_run } | Self::Create { dry_run, .. } | Self::Rm { dry_run, .. } => {
                *dry_run
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_network_verbs() {
        let cli = Cli::try_parse_from(["rind", "network", "ls"]).unwrap();
        let Commands::Network { command } = cli.command else {
            panic!("expected network");
        };
        assert_eq!(command.runtime_args("network"), vec!["network", "list"]);
        assert!(!command.dry_run());

        let cli = Cli::try_parse_from(["rind", "network", "create", "front", "--dry-run"]).unwrap();
        let Commands::Network { command } = cli.command else {
            panic!("expected network");
        };
        assert_eq!(command.runtime_args("network"), vec!["network", "create", "front"]);
        assert!(command.dry_run());
    }

    #[test]
    fn test_volume_rm() {
        let cli = Cli::try_parse_from(["rind", "volume", "rm", "a", "b"]).unwrap();
        let Commands::Volume { command } = cli.command else {
            panic!("expected volume");
        };
        assert_eq!(command.runtime_args("volume"), vec!["volume", "delete", "a", "b"]);
    }
}
