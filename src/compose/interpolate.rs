//! Shell-style variable interpolation for compose files
//!
//! Supported forms:
//! - `$VAR` and `${VAR}`: value of `VAR`, or empty when unset
//! - `${VAR:-default}`: value of `VAR` unless unset or empty
//! - `${VAR-default}`: value of `VAR` unless unset
//!
//! Substitution is a single left-to-right pass; substituted values are not
//! scanned again.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Braced alternative first; a bare name can never start with '{'.
        Regex::new(
            r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?:(:-|-)([^}]*))?\}|\$([A-Za-z_][A-Za-z0-9_]*)",
        )
        .expect("interpolation pattern is valid")
    })
}

/// Expand variable references in `text` using `env`
pub fn interpolate(text: &str, env: &HashMap<String, String>) -> String {
    pattern()
        .replace_all(text, |caps: &Captures| expand(caps, env))
        .into_owned()
}

/// Interpolate against the current process environment
pub fn interpolate_process_env(text: &str) -> String {
    let env: HashMap<String, String> = std::env::vars().collect();
    interpolate(text, &env)
}

fn expand(caps: &Captures, env: &HashMap<String, String>) -> String {
    if let Some(name) = caps.get(4) {
        return env.get(name.as_str()).cloned().unwrap_or_default();
    }

    let value = caps.get(1).and_then(|name| env.get(name.as_str()));
    let default = caps.get(3).map_or("", |m| m.as_str());

    match caps.get(2).map(|op| op.as_str()) {
        Some(":-") => match value {
            Some(v) if !v.is_empty() => v.clone(),
            _ => default.to_string(),
        },
        Some(_) => value.cloned().unwrap_or_else(|| default.to_string()),
        None => value.cloned().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_when_unset() {
        assert_eq!(interpolate("myapp:${TAG:-latest}", &env(&[])), "myapp:latest");
        assert_eq!(
            interpolate("myapp:${TAG:-latest}", &env(&[("TAG", "v2")])),
            "myapp:v2"
        );
    }

    #[test]
    fn test_colon_dash_treats_empty_as_unset() {
        assert_eq!(
            interpolate("port: ${PORT:-3000}", &env(&[("PORT", "")])),
            "port: 3000"
        );
    }

    #[test]
    fn test_dash_keeps_empty_value() {
        assert_eq!(interpolate("port: ${PORT-3000}", &env(&[("PORT", "")])), "port: ");
        assert_eq!(interpolate("port: ${PORT-3000}", &env(&[])), "port: 3000");
    }

    #[test]
    fn test_plain_references() {
        let vars = env(&[("IMAGE", "nginx")]);
        assert_eq!(interpolate("image: ${IMAGE}", &vars), "image: nginx");
        assert_eq!(interpolate("image: $IMAGE", &vars), "image: nginx");
        assert_eq!(interpolate("image: ${IMAGE}", &env(&[])), "image: ");
        assert_eq!(interpolate("image: $IMAGE", &env(&[])), "image: ");
    }

    #[test]
    fn test_multiple_references_on_one_line() {
        assert_eq!(
            interpolate("${HOST:-localhost}:${PORT:-8080}", &env(&[])),
            "localhost:8080"
        );
    }

    #[test]
    fn test_default_may_contain_colons() {
        assert_eq!(
            interpolate("${URL:-http://db:5432/app}", &env(&[])),
            "http://db:5432/app"
        );
    }

    #[test]
    fn test_not_recursive() {
        let vars = env(&[("A", "$B"), ("B", "oops"), ("C", "${B}")]);
        assert_eq!(interpolate("$A ${C}", &vars), "$B ${B}");
    }

    #[test]
    fn test_text_without_references_unchanged() {
        let text = "image: nginx:latest\nprice: $5 and ${ not closed";
        assert_eq!(interpolate(text, &env(&[])), text);
    }
}
