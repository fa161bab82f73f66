//! `link` command

use crate::link::{LinkOutcome, Linker};
use anyhow::Context as _;
use clap::{Args, Subcommand};

/// Arguments for `link`
#[derive(Args, Debug)]
pub struct LinkArgs {
    #[command(subcommand)]
    pub action: Option<LinkAction>,

    /// Overwrite an existing docker binary or symlink
    #[arg(long)]
    pub force: bool,
}

/// Link actions; `create` is the default
#[derive(Subcommand, Debug)]
pub enum LinkAction {
    /// Create the docker symlink
    Create {
        /// Overwrite an existing docker binary or symlink
        #[arg(long)]
        force: bool,
    },
    /// Remove the docker symlink
    Remove,
}

/// Execute `link`
pub fn execute(args: LinkArgs) -> anyhow::Result<i32> {
    let linker = Linker::current().context("failed to locate the rind binary")?;

    match args.action {
        None => create(&linker, args.force),
        Some(LinkAction::Create { force }) => create(&linker, force || args.force),
        Some(LinkAction::Remove) => {
            linker
                .remove()
                .with_context(|| format!("failed to remove {}", linker.link_path().display()))?;
            println!("Removed symlink: {}", linker.link_path().display());
            Ok(0)
        }
    }
}

fn create(linker: &Linker, force: bool) -> anyhow::Result<i32> {
    let outcome = linker
        .create(force)
        .with_context(|| format!("failed to create {}", linker.link_path().display()))?;

    let verb = match outcome {
        LinkOutcome::Created => "Created symlink",
        LinkOutcome::AlreadyLinked => "Already linked",
    };
    println!(
        "{}: {} -> {}",
        verb,
        linker.link_path().display(),
        linker.binary().display()
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    fn parse(line: &[&str]) -> LinkArgs {
        match Cli::try_parse_from(line).unwrap().command {
            Commands::Link(args) => args,
            other => panic!("expected link, got {:?}", other),
        }
    }

    #[test]
    fn test_default_action_is_create() {
        let args = parse(&["rind", "link", "--force"]);
        assert!(args.action.is_none());
        assert!(args.force);

        let args = parse(&["rind", "link", "create", "--force"]);
        assert!(matches!(args.action, Some(LinkAction::Create { force: true })));

        let args = parse(&["rind", "link", "remove"]);
        assert!(matches!(args.action, Some(LinkAction::Remove)));
    }
}
