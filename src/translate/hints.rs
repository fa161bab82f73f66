//! Docker-familiar hints printed after a runtime command fails

/// Hint for a failed runtime invocation, keyed by its subcommand
pub fn hint_for<S: AsRef<str>>(args: &[S]) -> Option<&'static str> {
    let command = args.first()?.as_ref();
    let sub = args.get(1).map(AsRef::as_ref);

    match (command, sub) {
        ("run", _) => Some(
            "use 'rind ps -a' to check for name conflicts, or 'rind pull IMAGE' to ensure the image exists",
        ),
        ("image", Some("pull")) => Some(
            "ensure the image reference is correct (e.g. 'nginx' or 'docker.io/library/nginx:latest')",
        ),
        ("image", Some("delete")) => Some(
            "use 'rind images' to list available images; the image may be in use by a container",
        ),
        ("stop", _) => Some("use 'rind ps' to list running containers"),
        ("delete", _) => {
            Some("use 'rind ps -a' to list all containers, or 'rind rm -f' to force removal")
        }
        ("exec", _) => Some("use 'rind ps' to check the container is running"),
        ("build", _) => Some("ensure you are in the correct directory and a Dockerfile exists"),
        ("network", _) => Some("use 'rind network ls' to list existing networks"),
        ("volume", _) => Some("use 'rind volume ls' to list existing volumes"),
        _ => None,
    }
}
