//! Container runtime invocation
//!
//! Every translated command ends up as an invocation of the target container
//! CLI. [`RuntimeInvoker`] is the seam between the translation logic and the
//! process that actually runs; [`ContainerCli`] spawns the real binary and
//! [`mock::RecordingInvoker`] records calls for tests.

pub mod cli;
pub mod mock;

pub use cli::ContainerCli;

use crate::error::Result;
use std::borrow::Cow;
use tokio::io::AsyncRead;
use tokio::process::Child;

/// Incrementally readable output of a running command
pub struct LogStream {
    /// Standard output of the command
    reader: Box<dyn AsyncRead + Send + Unpin>,
    /// Process to terminate when the stream is no longer wanted
    child: Option<Child>,
}

impl LogStream {
    /// Stream that is not backed by a process
    pub fn new(reader: Box<dyn AsyncRead + Send + Unpin>) -> Self {
        Self {
            reader,
            child: None,
        }
    }

    /// Stream backed by a running child process
    pub fn with_child(reader: Box<dyn AsyncRead + Send + Unpin>, child: Child) -> Self {
        Self {
            reader,
            child: Some(child),
        }
    }

    /// Split into the reader and the owning process
    pub fn into_parts(self) -> (Box<dyn AsyncRead + Send + Unpin>, Option<Child>) {
        (self.reader, self.child)
    }
}

impl std::fmt::Debug for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStream")
            .field("child", &self.child.as_ref().and_then(Child::id))
            .finish_non_exhaustive()
    }
}

/// Runs commands of the target container CLI
///
/// All methods take the arguments that follow the binary name. A runtime
/// command that exits non-zero is not an error at this level; its exit code
/// is returned and the caller decides. Errors mean the command could not be
/// run at all.
#[allow(async_fn_in_trait)]
pub trait RuntimeInvoker {
    /// Binary name used when rendering commands
    fn binary(&self) -> &str;

    /// Run to completion with inherited stdio
    async fn run(&self, args: &[String]) -> Result<i32>;

    /// Run to completion with all output discarded
    async fn run_silent(&self, args: &[String]) -> Result<i32>;

    /// Run to completion and capture standard output as text
    async fn capture(&self, args: &[String]) -> Result<(i32, String)>;

    /// Start a command and return its standard output for incremental reading
    fn stream(&self, args: &[String]) -> Result<LogStream>;
}

/// Render a command line as it would be typed into a shell
pub fn render_command<S: AsRef<str>>(binary: &str, args: &[S]) -> String {
    std::iter::once(shell_quote(binary))
        .chain(args.iter().map(|arg| shell_quote(arg.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> Cow<'_, str> {
    const SPECIAL: &[char] = &[
        '\'', '"', '\\', '$', '`', ';', '&', '|', '<', '>', '(', ')', '*', '?', '!', '#', '{',
        '}', '[', ']',
    ];

    let needs_quotes =
        arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || SPECIAL.contains(&c));

    if needs_quotes {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    } else {
        Cow::Borrowed(arg)
    }
}
