//! Compose descriptor types
//!
//! Only the keys listed in [`MODELED_SERVICE_KEYS`] are interpreted. Every
//! other service key is kept aside so the loader can report it as
//! unsupported.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Service keys this crate translates into runtime arguments
pub const MODELED_SERVICE_KEYS: &[&str] = &[
    "image",
    "command",
    "container_name",
    "ports",
    "volumes",
    "environment",
    "depends_on",
    "networks",
];

/// Parsed compose file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Descriptor {
    /// Services keyed by name
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: BTreeMap<String, Service>,
    /// Top-level network declarations, absent when the key is missing
    #[serde(default, deserialize_with = "optional_entries")]
    pub networks: Option<BTreeMap<String, NetworkSpec>>,
    /// Top-level named volume declarations
    #[serde(default, deserialize_with = "null_as_default_entries")]
    pub volumes: BTreeMap<String, VolumeSpec>,
}

impl Descriptor {
    /// Look up a service by name
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// Service names in lexicographic order
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// Whether any top-level network is declared
    pub fn declares_networks(&self) -> bool {
        self.networks.as_ref().is_some_and(|n| !n.is_empty())
    }
}

/// One service entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Service {
    /// Image reference
    #[serde(default)]
    pub image: Option<String>,
    /// Command override
    #[serde(default)]
    pub command: Option<CommandSpec>,
    /// Explicit container name
    #[serde(default)]
    pub container_name: Option<String>,
    /// Published ports in file order
    #[serde(default, deserialize_with = "null_as_default")]
    pub ports: Vec<PortSpec>,
    /// Raw volume specifications in file order
    #[serde(default, deserialize_with = "null_as_default")]
    pub volumes: Vec<String>,
    /// Environment variables
    #[serde(default)]
    pub environment: Option<EnvironmentSpec>,
    /// Names of services this one starts after
    #[serde(default, deserialize_with = "depends_on_names")]
    pub depends_on: Vec<String>,
    /// Logical networks this service attaches to, in file order
    #[serde(default, deserialize_with = "service_network_names")]
    pub networks: Vec<String>,
    /// Keys present in the file that are not translated, sorted
    #[serde(skip)]
    pub unsupported_keys: Vec<String>,
    /// Every non-modeled key, kept until the loader classifies it
    #[serde(flatten)]
    pub(crate) other_keys: BTreeMap<String, serde_yaml::Value>,
}

impl Service {
    /// Create a service running the given image
    pub fn new(image: &str) -> Self {
        Self {
            image: Some(image.to_string()),
            ..Default::default()
        }
    }

    /// Set the command
    pub fn command(mut self, command: CommandSpec) -> Self {
        self.command = Some(command);
        self
    }

    /// Set an explicit container name
    pub fn container_name(mut self, name: &str) -> Self {
        self.container_name = Some(name.to_string());
        self
    }

    /// Add a port mapping
    pub fn port(mut self, port: PortSpec) -> Self {
        self.ports.push(port);
        self
    }

    /// Add a volume specification
    pub fn volume(mut self, spec: &str) -> Self {
        self.volumes.push(spec.to_string());
        self
    }

    /// Set the environment
    pub fn environment(mut self, environment: EnvironmentSpec) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Add a dependency
    pub fn depends_on(mut self, service: &str) -> Self {
        self.depends_on.push(service.to_string());
        self
    }

    /// Attach to a logical network
    pub fn network(mut self, network: &str) -> Self {
        self.networks.push(network.to_string());
        self
    }

    /// Record the non-modeled keys that are not in `accepted` as unsupported
    pub(crate) fn classify_keys(&mut self, accepted: &[String]) {
        self.unsupported_keys = self
            .other_keys
            .keys()
            .filter(|key| !accepted.iter().any(|a| a == *key))
            .cloned()
            .collect();
    }
}

/// Command given as a shell-style string or an explicit argument list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    /// Exec form array
    List(Vec<String>),
    /// String split on whitespace
    Shell(String),
}

impl CommandSpec {
    /// The command as an argument list
    pub fn arguments(&self) -> Vec<String> {
        match self {
            CommandSpec::Shell(s) => s.split_whitespace().map(str::to_string).collect(),
            CommandSpec::List(args) => args.clone(),
        }
    }
}

/// Port mapping given as "host:container" text or a bare port number
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortSpec {
    /// Bare port, published on the same host port
    Number(u16),
    /// Kept verbatim
    Text(String),
}

impl PortSpec {
    /// Argument for the publish flag
    pub fn publish_string(&self) -> String {
        match self {
            PortSpec::Number(port) => format!("{}:{}", port, port),
            PortSpec::Text(text) => text.clone(),
        }
    }
}

/// Environment given as a mapping or a list of KEY=VALUE strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnvironmentSpec {
    /// Array of KEY=value strings
    List(Vec<String>),
    /// Map of key to scalar value, null meaning empty
    Map(BTreeMap<String, serde_yaml::Value>),
}

impl EnvironmentSpec {
    /// Entries as KEY=VALUE strings; the map form is sorted by key
    pub fn entries(&self) -> Vec<String> {
        match self {
            EnvironmentSpec::List(items) => items.clone(),
            EnvironmentSpec::Map(map) => map
                .iter()
                .map(|(key, value)| format!("{}={}", key, scalar_text(value)))
                .collect(),
        }
    }
}

/// Top-level network declaration; only its name matters
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NetworkSpec {
    /// Driver, accepted and ignored
    #[serde(default)]
    pub driver: Option<String>,
}

/// Top-level named volume declaration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VolumeSpec {
    /// Driver, accepted and ignored
    #[serde(default)]
    pub driver: Option<String>,
    /// External volumes are never removed by this tool
    #[serde(default)]
    pub external: Option<serde_yaml::Value>,
}

impl VolumeSpec {
    /// Whether the volume is managed outside the project
    pub fn is_external(&self) -> bool {
        match &self.external {
            Some(serde_yaml::Value::Bool(b)) => *b,
            Some(serde_yaml::Value::Mapping(_)) => true,
            _ => false,
        }
    }
}

fn scalar_text(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default_entries<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(optional_entries(deserializer)?.unwrap_or_default())
}

/// `name:` with no body declares an entry with default settings
fn optional_entries<'de, D, T>(deserializer: D) -> Result<Option<BTreeMap<String, T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let raw = Option::<BTreeMap<String, Option<T>>>::deserialize(deserializer)?;
    Ok(raw.map(|entries| {
        entries
            .into_iter()
            .map(|(name, spec)| (name, spec.unwrap_or_default()))
            .collect()
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DependsOnField {
    List(Vec<String>),
    Map(BTreeMap<String, serde_yaml::Value>),
    Other(serde_yaml::Value),
}

fn depends_on_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<DependsOnField>::deserialize(deserializer)? {
        Some(DependsOnField::List(names)) => names,
        // BTreeMap keys are already sorted
        Some(DependsOnField::Map(conditions)) => conditions.into_keys().collect(),
        Some(DependsOnField::Other(_)) | None => Vec::new(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NetworksField {
    List(Vec<String>),
    Map(serde_yaml::Mapping),
}

fn service_network_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NetworksField>::deserialize(deserializer)? {
        Some(NetworksField::List(names)) => names,
        Some(NetworksField::Map(map)) => map
            .keys()
            .filter_map(|key| key.as_str().map(str::to_string))
            .collect(),
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(yaml: &str) -> Service {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_command_forms_agree() {
        let shell = service("command: \"python  app.py --debug\"");
        let list = service("command: [python, app.py, --debug]");

        assert_eq!(
            shell.command,
            Some(CommandSpec::Shell("python  app.py --debug".to_string()))
        );
        assert_eq!(
            shell.command.unwrap().arguments(),
            list.command.unwrap().arguments()
        );
    }

    #[test]
    fn test_port_number_renders_like_pair() {
        let svc = service("ports: [80, \"80:80\", \"8080:80/udp\"]");
        let rendered: Vec<String> = svc.ports.iter().map(PortSpec::publish_string).collect();

        assert_eq!(svc.ports[0], PortSpec::Number(80));
        assert_eq!(rendered, vec!["80:80", "80:80", "8080:80/udp"]);
    }

    #[test]
    fn test_environment_map_sorted_with_empty_values() {
        let svc = service(
            r#"
environment:
  ZED: last
  ALPHA: 1
  EMPTY:
  BLANK: ""
  FLAG: true
"#,
        );

        assert_eq!(
            svc.environment.unwrap().entries(),
            vec!["ALPHA=1", "BLANK=", "EMPTY=", "FLAG=true", "ZED=last"]
        );
    }

    #[test]
    fn test_environment_list_kept_verbatim() {
        let svc = service("environment: [ZED=1, ALPHA=2, \"RAW\"]");
        assert_eq!(
            svc.environment.unwrap().entries(),
            vec!["ZED=1", "ALPHA=2", "RAW"]
        );
    }

    #[test]
    fn test_depends_on_forms() {
        let list = service("depends_on: [db, cache]");
        assert_eq!(list.depends_on, vec!["db", "cache"]);

        let map = service(
            r#"
depends_on:
  redis:
    condition: service_started
  db:
    condition: service_healthy
"#,
        );
        assert_eq!(map.depends_on, vec!["db", "redis"]);
    }

    #[test]
    fn test_service_networks_keep_file_order() {
        let list = service("networks: [front, back]");
        assert_eq!(list.networks, vec!["front", "back"]);

        let map = service(
            r#"
networks:
  zeta:
  alpha:
    aliases: [a]
"#,
        );
        assert_eq!(map.networks, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_other_keys_collected() {
        let mut svc = service(
            r#"
image: nginx
restart: always
healthcheck:
  test: ["CMD", "true"]
"#,
        );
        svc.classify_keys(&[]);
        assert_eq!(svc.unsupported_keys, vec!["healthcheck", "restart"]);

        svc.classify_keys(&["restart".to_string()]);
        assert_eq!(svc.unsupported_keys, vec!["healthcheck"]);
    }

    #[test]
    fn test_descriptor_network_presence() {
        let without: Descriptor = serde_yaml::from_str("services: {}").unwrap();
        assert!(without.networks.is_none());
        assert!(!without.declares_networks());

        let with: Descriptor = serde_yaml::from_str(
            r#"
services: {}
networks:
  backend:
  frontend:
    driver: bridge
"#,
        )
        .unwrap();
        let networks = with.networks.as_ref().unwrap();
        assert!(with.declares_networks());
        assert_eq!(networks.len(), 2);
        assert_eq!(networks["frontend"].driver.as_deref(), Some("bridge"));
    }

    #[test]
    fn test_external_volume() {
        let descriptor: Descriptor = serde_yaml::from_str(
            r#"
volumes:
  data:
  shared:
    external: true
"#,
        )
        .unwrap();
        assert!(!descriptor.volumes["data"].is_external());
        assert!(descriptor.volumes["shared"].is_external());
    }
}
