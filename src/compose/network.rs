//! Project network planning
//!
//! Declared top-level networks become `{project}_{name}`. Without
//! declarations, a single `{project}_default` network is planned as soon as
//! any service lists a network; otherwise no network is created.

use super::config::{Descriptor, Service};

/// Name of the implicit network
pub const DEFAULT_NETWORK: &str = "default";

/// Scope a logical network name to a project
pub fn scoped_network_name(project: &str, network: &str) -> String {
    format!("{}_{}", project, network)
}

/// Scoped networks to create for the project, in creation order
pub fn collect_networks(descriptor: &Descriptor, project: &str) -> Vec<String> {
    if let Some(declared) = descriptor.networks.as_ref().filter(|n| !n.is_empty()) {
        // BTreeMap iteration is already lexicographic
        return declared
            .keys()
            .map(|name| scoped_network_name(project, name))
            .collect();
    }

    let referenced = descriptor
        .services
        .values()
        .any(|service| !service.networks.is_empty());

    if referenced {
        vec![scoped_network_name(project, DEFAULT_NETWORK)]
    } else {
        Vec::new()
    }
}

/// Network a service's container is attached to, if the project has any
pub fn network_for_service(
    service: &Service,
    descriptor: &Descriptor,
    project: &str,
) -> Option<String> {
    let planned = collect_networks(descriptor, project);
    network_from_plan(service, &planned, project)
}

/// Same as [`network_for_service`] against an already computed plan
pub fn network_from_plan(service: &Service, planned: &[String], project: &str) -> Option<String> {
    if planned.is_empty() {
        return None;
    }

    match service.networks.first() {
        Some(first) => Some(scoped_network_name(project, first)),
        None => planned.first().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::config::NetworkSpec;
    use std::collections::BTreeMap;

    fn descriptor(services: &[(&str, Service)]) -> Descriptor {
        Descriptor {
            services: services
                .iter()
                .map(|(name, svc)| (name.to_string(), svc.clone()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_networks_anywhere() {
        let d = descriptor(&[("web", Service::new("nginx")), ("db", Service::new("postgres"))]);
        assert!(collect_networks(&d, "proj").is_empty());
        assert_eq!(network_for_service(&d.services["web"], &d, "proj"), None);
    }

    #[test]
    fn test_service_reference_creates_implicit_default() {
        let d = descriptor(&[
            ("web", Service::new("nginx").network("front")),
            ("db", Service::new("postgres")),
        ]);

        assert_eq!(collect_networks(&d, "proj"), vec!["proj_default"]);
        assert_eq!(
            network_for_service(&d.services["web"], &d, "proj").as_deref(),
            Some("proj_front")
        );
        assert_eq!(
            network_for_service(&d.services["db"], &d, "proj").as_deref(),
            Some("proj_default")
        );
    }

    #[test]
    fn test_declared_networks_sorted_and_scoped() {
        let mut d = descriptor(&[
            ("api", Service::new("api").network("backend").network("frontend")),
            ("worker", Service::new("worker")),
        ]);
        let mut declared = BTreeMap::new();
        declared.insert("frontend".to_string(), NetworkSpec::default());
        declared.insert("backend".to_string(), NetworkSpec::default());
        d.networks = Some(declared);

        assert_eq!(collect_networks(&d, "shop"), vec!["shop_backend", "shop_frontend"]);
        assert_eq!(
            network_for_service(&d.services["api"], &d, "shop").as_deref(),
            Some("shop_backend")
        );
        // Unconfigured services join the first planned network
        assert_eq!(
            network_for_service(&d.services["worker"], &d, "shop").as_deref(),
            Some("shop_backend")
        );
    }

    #[test]
    fn test_empty_declaration_behaves_like_none() {
        let mut d = descriptor(&[("web", Service::new("nginx"))]);
        d.networks = Some(BTreeMap::new());
        assert!(collect_networks(&d, "proj").is_empty());

        d.services.insert("api".to_string(), Service::new("api").network("x"));
        assert_eq!(collect_networks(&d, "proj"), vec!["proj_default"]);
    }
}
