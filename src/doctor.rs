//! Host environment checks

use crate::error::Result;
use crate::runtime::RuntimeInvoker;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Architecture the container CLI runs on
pub const REQUIRED_ARCH: &str = "aarch64";

/// Operating system the container CLI runs on
pub const REQUIRED_OS: &str = "macos";

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// Short description
    pub name: &'static str,
    /// Whether the check passed
    pub passed: bool,
    /// Detail line shown under the name
    pub detail: String,
}

impl Check {
    fn new(name: &'static str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed,
            detail: detail.into(),
        }
    }
}

/// Locate the runtime binary: absolute paths must exist, bare names are
/// looked up on `PATH`
pub fn locate_binary(binary: &str) -> Option<PathBuf> {
    let path = Path::new(binary);
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }
    which::which(binary).ok()
}

/// Run every check against `invoker`
pub async fn run_checks<R: RuntimeInvoker>(invoker: &R) -> Vec<Check> {
    let binary = invoker.binary();
    let mut checks = Vec::new();

    let located = locate_binary(binary);
    checks.push(match &located {
        Some(path) => Check::new("Container CLI installed", true, path.display().to_string()),
        None => Check::new("Container CLI installed", false, format!("Not found: {}", binary)),
    });

    // Without a binary the status call can only fail to spawn
    let status = match located {
        Some(_) => invoker
            .run_silent(&["system".to_string(), "status".to_string()])
            .await
            .unwrap_or(-1),
        None => -1,
    };
    checks.push(if status == 0 {
        Check::new("Container system running", true, "System is ready")
    } else {
        Check::new(
            "Container system running",
            false,
            format!("Run '{} system start' to start", binary),
        )
    });

    let arch = std::env::consts::ARCH;
    checks.push(Check::new(
        "Apple Silicon detected",
        arch == REQUIRED_ARCH,
        format!("Architecture: {}", arch),
    ));

    let os = std::env::consts::OS;
    checks.push(Check::new(
        "macOS host",
        os == REQUIRED_OS,
        format!("Operating system: {}", os),
    ));

    checks
}

/// Write the checklist; returns whether every check passed
pub fn write_report<W: Write>(checks: &[Check], out: &mut W) -> Result<bool> {
    writeln!(out, "Rind Doctor")?;
    writeln!(out, "===========")?;
    writeln!(out)?;

    for check in checks {
        let icon = if check.passed { "OK" } else { "FAIL" };
        writeln!(out, "  [{}] {}", icon, check.name)?;
        writeln!(out, "       {}", check.detail)?;
    }

    let all_passed = checks.iter().all(|c| c.passed);
    writeln!(out)?;
    if all_passed {
        writeln!(out, "All checks passed. Rind is ready to use!")?;
    } else {
        writeln!(out, "Some checks failed. Please resolve the issues above.")?;
    }
    Ok(all_passed)
}

/// Execute `doctor`; exit status 1 when a check fails
pub async fn execute<R: RuntimeInvoker, W: Write>(invoker: &R, out: &mut W) -> Result<i32> {
    let checks = run_checks(invoker).await;
    for check in checks.iter().filter(|c| !c.passed) {
        tracing::debug!("doctor check failed: {} ({})", check.name, check.detail);
    }
    let passed = write_report(&checks, out)?;
    Ok(if passed { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::mock::RecordingInvoker;

    #[test]
    fn test_locate_binary() {
        assert!(locate_binary("/definitely/not/here/container").is_none());

        let temp = tempfile::tempdir().unwrap();
        let binary = temp.path().join("container");
        std::fs::write(&binary, b"").unwrap();
        assert_eq!(
            locate_binary(&binary.to_string_lossy()),
            Some(binary.clone())
        );
    }

    #[test]
    fn test_report_format() {
        let checks = vec![
            Check::new("First", true, "fine"),
            Check::new("Second", false, "broken"),
        ];
        let mut out = Vec::new();
        let passed = write_report(&checks, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(!passed);
        assert!(text.starts_with("Rind Doctor\n"));
        assert!(text.contains("  [OK] First\n       fine\n"));
        assert!(text.contains("  [FAIL] Second\n       broken\n"));
        assert!(text.ends_with("Some checks failed. Please resolve the issues above.\n"));
    }

    #[tokio::test]
    async fn test_execute_reports_failures() {
        let invoker = RecordingInvoker::new().with_exit_code(&["system", "status"], 1);
        let mut out = Vec::new();

        let code = execute(&invoker, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(code, 1);
        assert!(text.contains("[FAIL] Container system running"));
        assert!(text.contains(&format!("Architecture: {}", std::env::consts::ARCH)));
    }
}
