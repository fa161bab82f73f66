//! Volume flag translation
//!
//! Docker accepts `-v source:target[:options]` for both host paths and named
//! volumes. The target runtime wants `--mount source=..,target=..` for host
//! paths and `--volume name:target` for named volumes.

use std::path::{Path, PathBuf};

/// Whether a volume source names a host path
pub fn is_bind_source(source: &str) -> bool {
    source.starts_with('/') || source.starts_with("./") || source.starts_with('~')
}

/// Translate one `-v` specification into runtime arguments
///
/// Specifications with fewer than two parts are passed through unchanged
/// and left for the runtime to reject.
pub fn translate_volume(spec: &str) -> Vec<String> {
    let parts: Vec<&str> = spec.splitn(3, ':').collect();
    if parts.len() < 2 {
        return vec!["--volume".to_string(), spec.to_string()];
    }

    let (source, target, options) = (parts[0], parts[1], parts.get(2).copied());

    if is_bind_source(source) {
        mount_args(source, target, options)
    } else {
        let mut volume = format!("{}:{}", source, target);
        if let Some(options) = options {
            volume.push(':');
            volume.push_str(options);
        }
        vec!["--volume".to_string(), volume]
    }
}

/// Translation used by the single-container `run` command
///
/// The runtime only mounts directories: a bind source that is an existing
/// regular file is dropped with a warning, and `./` or `../` sources are
/// resolved against `cwd`.
pub fn translate_run_volume(spec: &str, cwd: &Path) -> Vec<String> {
    let parts: Vec<&str> = spec.splitn(3, ':').collect();
    if parts.len() < 2 || !(is_bind_source(parts[0]) || parts[0].starts_with("../")) {
        return translate_volume(spec);
    }

    let (source, target, options) = (parts[0], parts[1], parts.get(2).copied());

    if expand_home(source).is_file() {
        tracing::warn!(
            "skipping file mount '{}:{}', only directory mounts are supported",
            source,
            target
        );
        return Vec::new();
    }

    if source.starts_with("./") || source.starts_with("../") {
        let resolved = cwd.join(source);
        return mount_args(&resolved.to_string_lossy(), target, options);
    }

    mount_args(source, target, options)
}

fn mount_args(source: &str, target: &str, options: Option<&str>) -> Vec<String> {
    let mut mount = format!("source={},target={}", source, target);
    if options.is_some_and(|o| o.contains("ro")) {
        mount.push_str(",readonly");
    }
    vec!["--mount".to_string(), mount]
}

fn expand_home(source: &str) -> PathBuf {
    match source.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(source),
        },
        None => PathBuf::from(source),
    }
}
