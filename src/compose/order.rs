//! Service start order
//!
//! Kahn's algorithm over `depends_on` edges with a lexicographically sorted
//! ready set, so the result depends only on the service map. Dependencies
//! on services that are not defined contribute no edge. A cycle falls back
//! to plain lexicographic order.

use super::config::Service;
use std::collections::{BTreeMap, BTreeSet};

/// Dependency-first start order covering every service exactly once
pub fn start_order(services: &BTreeMap<String, Service>) -> Vec<String> {
    let mut in_degree: BTreeMap<&str, usize> =
        services.keys().map(|name| (name.as_str(), 0)).collect();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (name, service) in services {
        // A repeated entry still counts as one edge
        let deps: BTreeSet<&str> = service.depends_on.iter().map(String::as_str).collect();
        for dep in deps {
            if services.contains_key(dep) {
                *in_degree.entry(name.as_str()).or_default() += 1;
                dependents.entry(dep).or_default().push(name.as_str());
            }
        }
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut order = Vec::with_capacity(services.len());

    while let Some(current) = ready.pop_first() {
        order.push(current.to_string());

        for dependent in dependents.get(current).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if order.len() != services.len() {
        tracing::warn!(
            "circular dependency detected in depends_on, falling back to alphabetical order"
        );
        return services.keys().cloned().collect();
    }

    order
}

/// Reverse of [`start_order`], used for teardown
pub fn stop_order(services: &BTreeMap<String, Service>) -> Vec<String> {
    let mut order = start_order(services);
    order.reverse();
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services(edges: &[(&str, &[&str])]) -> BTreeMap<String, Service> {
        edges
            .iter()
            .map(|(name, deps)| {
                let service = deps
                    .iter()
                    .fold(Service::new("busybox"), |svc, dep| svc.depends_on(dep));
                (name.to_string(), service)
            })
            .collect()
    }

    #[test]
    fn test_linear_chain() {
        let order = start_order(&services(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]));
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_diamond() {
        let order = start_order(&services(&[
            ("a", &["b", "c"]),
            ("b", &["d"]),
            ("c", &["d"]),
            ("d", &[]),
        ]));

        let pos = |name: &str| order.iter().position(|s| s == name).unwrap();
        assert_eq!(order.len(), 4);
        assert!(pos("d") < pos("b"));
        assert!(pos("d") < pos("c"));
        assert!(pos("b") < pos("a"));
        assert!(pos("c") < pos("a"));
    }

    #[test]
    fn test_two_cycle_falls_back_to_alphabetical() {
        let order = start_order(&services(&[("b", &["a"]), ("a", &["b"])]));
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_cycle_with_independent_service() {
        let order = start_order(&services(&[("x", &["y"]), ("y", &["x"]), ("a", &[])]));
        assert_eq!(order, vec!["a", "x", "y"]);
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let order = start_order(&services(&[("z", &["z"]), ("m", &[])]));
        assert_eq!(order, vec!["m", "z"]);
    }

    #[test]
    fn test_no_dependencies_sorted() {
        let order = start_order(&services(&[("z", &[]), ("a", &[]), ("m", &[])]));
        assert_eq!(order, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_dangling_dependency_ignored() {
        let order = start_order(&services(&[("web", &["ghost", "db"]), ("db", &[])]));
        assert_eq!(order, vec!["db", "web"]);
    }

    #[test]
    fn test_newly_ready_services_stay_sorted() {
        let order = start_order(&services(&[("a", &[]), ("b", &["a"]), ("c", &[])]));
        assert_eq!(order, vec!["a", "b", "c"]);

        let order = start_order(&services(&[("d", &[]), ("b", &["d"]), ("c", &[])]));
        assert_eq!(order, vec!["c", "d", "b"]);
    }

    #[test]
    fn test_duplicate_dependency_counts_once() {
        let order = start_order(&services(&[("web", &["db", "db"]), ("db", &[])]));
        assert_eq!(order, vec!["db", "web"]);
    }

    #[test]
    fn test_deterministic() {
        let input = services(&[("api", &["db"]), ("web", &["api"]), ("db", &[]), ("cache", &[])]);
        let first = start_order(&input);
        for _ in 0..10 {
            assert_eq!(start_order(&input), first);
        }
        assert_eq!(first, vec!["cache", "db", "api", "web"]);
        assert_eq!(stop_order(&input), vec!["web", "api", "db", "cache"]);
    }
}
