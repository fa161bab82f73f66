//! Recording runtime invoker
//!
//! Available to unit tests and to the integration tests under `tests/`. No
//! process is ever spawned; every call is recorded and answered from a
//! table of canned responses.

use super::{LogStream, RuntimeInvoker};
use crate::error::Result;
use std::io::Cursor;
use std::sync::Mutex;

/// Which invoker method a call went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// [`RuntimeInvoker::run`]
    Run,
    /// [`RuntimeInvoker::run_silent`]
    RunSilent,
    /// [`RuntimeInvoker::capture`]
    Capture,
    /// [`RuntimeInvoker::stream`]
    Stream,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Method used
    pub kind: CallKind,
    /// Arguments after the binary
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
struct Response {
    prefix: Vec<String>,
    code: i32,
    output: String,
}

/// Invoker that records calls instead of running them
#[derive(Debug)]
pub struct RecordingInvoker {
    binary: String,
    responses: Vec<Response>,
    calls: Mutex<Vec<Invocation>>,
}

impl Default for RecordingInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingInvoker {
    /// Invoker where every command succeeds with empty output
    pub fn new() -> Self {
        Self {
            binary: "container".to_string(),
            responses: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer calls whose arguments start with `prefix` with an exit code
    pub fn with_exit_code(self, prefix: &[&str], code: i32) -> Self {
        self.respond(prefix, code, "")
    }

    /// Answer calls whose arguments start with `prefix` with output
    pub fn with_output(self, prefix: &[&str], output: &str) -> Self {
        self.respond(prefix, 0, output)
    }

    /// Answer calls whose arguments start with `prefix`
    ///
    /// The first matching response wins.
    pub fn respond(mut self, prefix: &[&str], code: i32, output: &str) -> Self {
        self.responses.push(Response {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            code,
            output: output.to_string(),
        });
        self
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .expect("RecordingInvoker calls mutex poisoned")
            .clone()
    }

    /// Argument vectors of every call so far, in order
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|call| call.args).collect()
    }

    /// Position of the first call whose arguments equal `args`
    pub fn position(&self, args: &[&str]) -> Option<usize> {
        self.commands()
            .iter()
            .position(|recorded| recorded.iter().map(String::as_str).eq(args.iter().copied()))
    }

    fn record(&self, kind: CallKind, args: &[String]) -> (i32, String) {
        self.calls
            .lock()
            .expect("RecordingInvoker calls mutex poisoned")
            .push(Invocation {
                kind,
                args: args.to_vec(),
            });

        self.responses
            .iter()
            .find(|response| args.starts_with(&response.prefix))
            .map(|response| (response.code, response.output.clone()))
            .unwrap_or_default()
    }
}

impl RuntimeInvoker for RecordingInvoker {
    fn binary(&self) -> &str {
        &self.binary
    }

    async fn run(&self, args: &[String]) -> Result<i32> {
        Ok(self.record(CallKind::Run, args).0)
    }

    async fn run_silent(&self, args: &[String]) -> Result<i32> {
        Ok(self.record(CallKind::RunSilent, args).0)
    }

    async fn capture(&self, args: &[String]) -> Result<(i32, String)> {
        Ok(self.record(CallKind::Capture, args))
    }

    fn stream(&self, args: &[String]) -> Result<LogStream> {
        let (_, output) = self.record(CallKind::Stream, args);
        Ok(LogStream::new(Box::new(Cursor::new(output.into_bytes()))))
    }
}
