//! Process-backed runtime invoker

use super::{LogStream, RuntimeInvoker};
use crate::config::DEFAULT_RUNTIME_BINARY;
use crate::error::{Result, RindError};
use std::io;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// The target container CLI, spawned through `tokio::process`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerCli {
    binary: String,
}

impl Default for ContainerCli {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME_BINARY)
    }
}

impl ContainerCli {
    /// Create an invoker for the given binary path
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        cmd
    }

    fn spawn_error(&self, source: io::Error) -> RindError {
        RindError::RuntimeSpawn {
            binary: self.binary.clone(),
            source,
        }
    }

    /// Replace the current process with the runtime command
    ///
    /// Used for interactive sessions that need the terminal directly. Only
    /// returns when the exec itself failed.
    #[cfg(unix)]
    pub fn exec_replace(&self, args: &[String]) -> RindError {
        use std::os::unix::process::CommandExt;

        tracing::debug!("exec {} {:?}", self.binary, args);
        let source = std::process::Command::new(&self.binary).args(args).exec();
        self.spawn_error(source)
    }

    /// Run the runtime command in the foreground and exit with its status
    #[cfg(not(unix))]
    pub fn exec_replace(&self, args: &[String]) -> RindError {
        match std::process::Command::new(&self.binary).args(args).status() {
            Ok(status) => std::process::exit(exit_code(status)),
            Err(source) => self.spawn_error(source),
        }
    }
}

impl RuntimeInvoker for ContainerCli {
    fn binary(&self) -> &str {
        &self.binary
    }

    async fn run(&self, args: &[String]) -> Result<i32> {
        tracing::debug!("run {} {:?}", self.binary, args);

        let mut child = self
            .command(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // The terminal delivers Ctrl+C to the child as well; keep waiting so
        // its exit status is what we report.
        let status = loop {
            tokio::select! {
                status = child.wait() => break status?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::debug!("interrupt received while waiting for {}", self.binary);
                }
            }
        };

        Ok(exit_code(status))
    }

    async fn run_silent(&self, args: &[String]) -> Result<i32> {
        tracing::debug!("run (silent) {} {:?}", self.binary, args);

        let status = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        Ok(exit_code(status))
    }

    async fn capture(&self, args: &[String]) -> Result<(i32, String)> {
        tracing::debug!("capture {} {:?}", self.binary, args);

        let output = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        Ok((
            exit_code(output.status),
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ))
    }

    fn stream(&self, args: &[String]) -> Result<LogStream> {
        tracing::debug!("stream {} {:?}", self.binary, args);

        let mut child = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not captured"))?;

        Ok(LogStream::with_child(Box::new(stdout), child))
    }
}

/// Exit code of a finished process; death by signal maps to `128 + signal`
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_silent_reports_exit_code() {
        let sh = ContainerCli::new("sh");
        assert_eq!(sh.run_silent(&args(&["-c", "exit 0"])).await.unwrap(), 0);
        assert_eq!(sh.run_silent(&args(&["-c", "echo noise; exit 3"])).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_capture_stdout() {
        let sh = ContainerCli::new("sh");
        let (code, out) = sh
            .capture(&args(&["-c", "echo one; echo two; echo err >&2"]))
            .await
            .unwrap();
        assert_eq!(code, 0);
        assert_eq!(out, "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_stream_reads_output() {
        let sh = ContainerCli::new("sh");
        let stream = sh.stream(&args(&["-c", "printf 'a\\nb\\n'"])).unwrap();
        let (mut reader, child) = stream.into_parts();
        assert!(child.is_some());

        let mut text = String::new();
        reader.read_to_string(&mut text).await.unwrap();
        assert_eq!(text, "a\nb\n");
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let cli = ContainerCli::new("/nonexistent/rind-test-binary");
        let err = cli.run_silent(&args(&["ls"])).await.unwrap_err();
        assert!(matches!(err, RindError::RuntimeSpawn { .. }));
    }
}
