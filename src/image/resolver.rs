//! Short image reference resolution

use crate::config::Settings;

/// Resolves Docker-style short references to fully qualified ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    /// Registry for references without a host
    registry: String,
    /// Namespace for single-segment references
    namespace: String,
    /// Tag for references without one
    tag: String,
}

impl Default for ImageResolver {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ImageResolver {
    /// Create a resolver with explicit defaults
    pub fn new(registry: &str, namespace: &str, tag: &str) -> Self {
        Self {
            registry: registry.to_string(),
            namespace: namespace.to_string(),
            tag: tag.to_string(),
        }
    }

    /// Create a resolver from user settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.default_registry,
            &settings.default_namespace,
            &settings.default_tag,
        )
    }

    /// Resolve a reference
    ///
    /// - `nginx` -> `docker.io/library/nginx:latest`
    /// - `myuser/app:v1` -> `docker.io/myuser/app:v1`
    /// - `ghcr.io/org/app` -> `ghcr.io/org/app:latest`
    pub fn resolve(&self, reference: &str) -> String {
        let qualified = match reference.split_once('/') {
            Some((first, _)) if is_registry_host(first) => reference.to_string(),
            Some(_) => format!("{}/{}", self.registry, reference),
            None => format!("{}/{}/{}", self.registry, self.namespace, reference),
        };
        self.ensure_tag(qualified)
    }

    fn ensure_tag(&self, reference: String) -> String {
        let last = reference.rsplit('/').next().unwrap_or(&reference);
        // A digest pins the image; a colon in the last segment is a tag
        if last.contains('@') || last.contains(':') {
            reference
        } else {
            format!("{}:{}", reference, self.tag)
        }
    }
}

/// Whether the first path segment names a registry rather than a namespace
fn is_registry_host(segment: &str) -> bool {
    let host = segment.split(':').next().unwrap_or(segment);
    host.contains('.') || segment.contains(':') || host == "localhost"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_names() {
        let resolver = ImageResolver::default();
        assert_eq!(resolver.resolve("nginx"), "docker.io/library/nginx:latest");
        assert_eq!(resolver.resolve("nginx:alpine"), "docker.io/library/nginx:alpine");
        assert_eq!(
            resolver.resolve("postgres:16.2"),
            "docker.io/library/postgres:16.2"
        );
    }

    #[test]
    fn test_namespaced_names() {
        let resolver = ImageResolver::default();
        assert_eq!(resolver.resolve("myuser/myapp"), "docker.io/myuser/myapp:latest");
        assert_eq!(resolver.resolve("myuser/myapp:v1"), "docker.io/myuser/myapp:v1");
    }

    #[test]
    fn test_qualified_names() {
        let resolver = ImageResolver::default();
        assert_eq!(resolver.resolve("ghcr.io/org/app"), "ghcr.io/org/app:latest");
        assert_eq!(resolver.resolve("ghcr.io/org/app:v2"), "ghcr.io/org/app:v2");
        assert_eq!(
            resolver.resolve("localhost:5000/app"),
            "localhost:5000/app:latest"
        );
        assert_eq!(
            resolver.resolve("registry.example.com:443/team/app:1.0"),
            "registry.example.com:443/team/app:1.0"
        );
    }

    #[test]
    fn test_digest_left_untouched() {
        let resolver = ImageResolver::default();
        assert_eq!(
            resolver.resolve("nginx@sha256:abcdef"),
            "docker.io/library/nginx@sha256:abcdef"
        );
    }

    #[test]
    fn test_idempotent() {
        let resolver = ImageResolver::default();
        let once = resolver.resolve("redis");
        assert_eq!(resolver.resolve(&once), once);
    }

    #[test]
    fn test_custom_defaults() {
        let settings = Settings {
            default_registry: "mirror.internal".to_string(),
            default_namespace: "base".to_string(),
            default_tag: "stable".to_string(),
            ..Settings::default()
        };
        let resolver = ImageResolver::from_settings(&settings);
        assert_eq!(resolver.resolve("alpine"), "mirror.internal/base/alpine:stable");
    }
}
