//! Docker to runtime CLI translation tables

pub mod hints;
pub mod volume;

pub use hints::hint_for;
pub use volume::{translate_run_volume, translate_volume};

/// Docker commands whose runtime counterpart has a different name
pub const COMMAND_MAP: &[(&str, &[&str])] = &[
    ("ps", &["ls"]),
    ("images", &["image", "list"]),
    ("pull", &["image", "pull"]),
    ("push", &["image", "push"]),
    ("rmi", &["image", "delete"]),
    ("rm", &["delete"]),
    ("login", &["registry", "login"]),
    ("logout", &["registry", "logout"]),
    ("info", &["system", "status"]),
];

/// Docker resource verbs mapped to runtime verbs (`network`, `volume`)
pub const RESOURCE_VERB_MAP: &[(&str, &str)] = &[("ls", "list"), ("create", "create"), ("rm", "delete")];

/// Runtime words for a Docker command; unmapped commands keep their name
pub fn runtime_command(docker: &str) -> Vec<String> {
    COMMAND_MAP
        .iter()
        .find(|(name, _)| *name == docker)
        .map(|(_, words)| words.iter().map(|w| w.to_string()).collect())
        .unwrap_or_else(|| vec![docker.to_string()])
}

/// Runtime verb for a Docker `network`/`volume` verb
pub fn resource_verb(docker: &str) -> &str {
    RESOURCE_VERB_MAP
        .iter()
        .find(|(name, _)| *name == docker)
        .map_or(docker, |(_, verb)| *verb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_command() {
        assert_eq!(runtime_command("ps"), vec!["ls"]);
        assert_eq!(runtime_command("images"), vec!["image", "list"]);
        assert_eq!(runtime_command("rm"), vec!["delete"]);
        assert_eq!(runtime_command("stop"), vec!["stop"]);
        assert_eq!(runtime_command("inspect"), vec!["inspect"]);
    }

    #[test]
    fn test_resource_verb() {
        assert_eq!(resource_verb("ls"), "list");
        assert_eq!(resource_verb("rm"), "delete");
        assert_eq!(resource_verb("create"), "create");
        assert_eq!(resource_verb("prune"), "prune");
    }
}
