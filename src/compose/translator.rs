//! Service to runtime argument translation

use super::config::Service;
use crate::error::{Result, RindError};
use crate::image::ImageResolver;
use crate::translate::translate_volume;

/// Runtime-visible container name for a service
pub fn container_name(service: &Service, service_name: &str, project: &str) -> String {
    match &service.container_name {
        Some(name) => name.clone(),
        None => format!("{}-{}-1", project, service_name),
    }
}

/// Arguments that create and start one service as a detached container
///
/// Flag pairs come first (name, ports, volumes, environment, network), then
/// the resolved image, then the command tokens.
pub fn translate(
    service: &Service,
    service_name: &str,
    project: &str,
    network: Option<&str>,
    resolver: &ImageResolver,
) -> Result<Vec<String>> {
    let image = service
        .image
        .as_deref()
        .ok_or_else(|| RindError::MissingImage(service_name.to_string()))?;

    let mut args = vec![
        "run".to_string(),
        "--detach".to_string(),
        "--name".to_string(),
        container_name(service, service_name, project),
    ];

    for port in &service.ports {
        args.push("--publish".to_string());
        args.push(port.publish_string());
    }

    for volume in &service.volumes {
        args.extend(translate_volume(volume));
    }

    if let Some(environment) = &service.environment {
        for entry in environment.entries() {
            args.push("--env".to_string());
            args.push(entry);
        }
    }

    if let Some(network) = network {
        args.push("--network".to_string());
        args.push(network.to_string());
    }

    args.push(resolver.resolve(image));

    if let Some(command) = &service.command {
        args.extend(command.arguments());
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::config::{CommandSpec, EnvironmentSpec, PortSpec};
    use std::collections::BTreeMap;

    #[test]
    fn test_minimal_service() {
        let service = Service::new("nginx").port(PortSpec::Text("8080:80".to_string()));
        let args = translate(&service, "web", "myproject", None, &ImageResolver::default()).unwrap();

        assert_eq!(
            args,
            vec![
                "run",
                "--detach",
                "--name",
                "myproject-web-1",
                "--publish",
                "8080:80",
                "docker.io/library/nginx:latest"
            ]
        );
    }

    #[test]
    fn test_full_argument_order() {
        let mut env = BTreeMap::new();
        env.insert("B".to_string(), serde_yaml::Value::from("2"));
        env.insert("A".to_string(), serde_yaml::Value::from("1"));

        let service = Service::new("myuser/api:v3")
            .container_name("api")
            .port(PortSpec::Number(3000))
            .port(PortSpec::Text("9229:9229".to_string()))
            .volume("./src:/app/src:ro")
            .volume("data:/data")
            .environment(EnvironmentSpec::Map(env))
            .command(CommandSpec::Shell("node server.js".to_string()));

        let args = translate(
            &service,
            "api",
            "shop",
            Some("shop_default"),
            &ImageResolver::default(),
        )
        .unwrap();

        assert_eq!(
            args,
            vec![
                "run",
                "--detach",
                "--name",
                "api",
                "--publish",
                "3000:3000",
                "--publish",
                "9229:9229",
                "--mount",
                "source=./src,target=/app/src,readonly",
                "--volume",
                "data:/data",
                "--env",
                "A=1",
                "--env",
                "B=2",
                "--network",
                "shop_default",
                "docker.io/myuser/api:v3",
                "node",
                "server.js"
            ]
        );
    }

    #[test]
    fn test_image_precedes_command() {
        let service = Service::new("busybox")
            .command(CommandSpec::List(vec!["sh".into(), "-c".into(), "echo hi".into()]));
        let args = translate(&service, "job", "p", None, &ImageResolver::default()).unwrap();

        let image_pos = args
            .iter()
            .position(|a| a == "docker.io/library/busybox:latest")
            .unwrap();
        assert_eq!(&args[image_pos + 1..], ["sh", "-c", "echo hi"]);
    }

    #[test]
    fn test_volume_sources_kept_verbatim() {
        let service = Service::new("postgres")
            .volume("./init:/docker-entrypoint-initdb.d")
            .volume("../shared:/shared");
        let args = translate(&service, "db", "p", None, &ImageResolver::default()).unwrap();

        assert_eq!(
            &args[4..8],
            [
                "--mount",
                "source=./init,target=/docker-entrypoint-initdb.d",
                "--volume",
                "../shared:/shared"
            ]
        );
    }

    #[test]
    fn test_missing_image() {
        let service = Service::default();
        let err = translate(&service, "builder", "p", None, &ImageResolver::default()).unwrap_err();
        assert!(matches!(err, RindError::MissingImage(name) if name == "builder"));
    }

    #[test]
    fn test_container_name() {
        assert_eq!(container_name(&Service::new("x"), "web", "proj"), "proj-web-1");
        assert_eq!(
            container_name(&Service::new("x").container_name("custom"), "web", "proj"),
            "custom"
        );
    }
}
