//! Log multiplexing
//!
//! One reader task per container turns its output into prefixed lines and
//! sends them over a channel. A single writer owns the output and is the
//! only place lines are written. Order within one container is preserved;
//! lines from different containers interleave as they arrive.

use crate::error::Result;
use crate::runtime::LogStream;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Lines buffered between readers and the writer
const LINE_BUFFER: usize = 1024;

/// Output of one service's container
#[derive(Debug)]
pub struct LogSource {
    /// Service name used as the line prefix
    pub service: String,
    /// Container output
    pub stream: LogStream,
}

impl LogSource {
    /// Pair a service name with its log stream
    pub fn new(service: impl Into<String>, stream: LogStream) -> Self {
        Self {
            service: service.into(),
            stream,
        }
    }
}

/// Width of the prefix column for a set of service names
pub fn prefix_width<'a>(services: impl IntoIterator<Item = &'a str>) -> usize {
    services
        .into_iter()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0)
}

/// `service` padded to `width`, followed by the column separator and `line`
pub fn format_line(service: &str, width: usize, line: &str) -> String {
    format!("{:<width$}  | {}", service, line, width = width)
}

/// Write every line of `text` with the service prefix, skipping empty lines
pub fn write_prefixed<W: Write>(out: &mut W, service: &str, width: usize, text: &str) -> Result<()> {
    for line in text.lines().filter(|line| !line.is_empty()) {
        writeln!(out, "{}", format_line(service, width, line))?;
    }
    Ok(())
}

/// Copy prefixed lines from every source to `out`
///
/// Returns once every stream has ended or `token` is cancelled. The
/// processes behind the streams are killed before returning.
pub async fn multiplex<W: Write>(
    sources: Vec<LogSource>,
    out: &mut W,
    token: &CancellationToken,
) -> Result<()> {
    let width = prefix_width(sources.iter().map(|s| s.service.as_str()));
    let (tx, mut rx) = mpsc::channel::<String>(LINE_BUFFER);

    let mut children = Vec::new();
    let mut readers = Vec::new();

    for source in sources {
        let (reader, child) = source.stream.into_parts();
        children.extend(child);

        let tx = tx.clone();
        let token = token.clone();
        let service = source.service;

        readers.push(tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    next = lines.next_line() => match next {
                        Ok(Some(line)) if line.is_empty() => {}
                        Ok(Some(line)) => {
                            if tx.send(format_line(&service, width, &line)).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            tracing::warn!("log stream for '{}' failed: {}", service, e);
                            break;
                        }
                    },
                }
            }
        }));
    }
    drop(tx);

    let written = write_lines(&mut rx, out, token).await;

    drop(rx);
    for reader in readers {
        if let Err(e) = reader.await {
            tracing::debug!("log reader task ended abnormally: {}", e);
        }
    }
    for mut child in children {
        if let Err(e) = child.kill().await {
            tracing::debug!("failed to stop log process: {}", e);
        }
    }

    written
}

async fn write_lines<W: Write>(
    rx: &mut mpsc::Receiver<String>,
    out: &mut W,
    token: &CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            biased;
            next = rx.recv() => match next {
                Some(line) => {
                    writeln!(out, "{}", line)?;
                    out.flush()?;
                }
                None => return Ok(()),
            },
            _ = token.cancelled() => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(service: &str, text: &str) -> LogSource {
        LogSource::new(
            service,
            LogStream::new(Box::new(Cursor::new(text.as_bytes().to_vec()))),
        )
    }

    #[test]
    fn test_format_line_pads_to_width() {
        assert_eq!(format_line("db", 5, "ready"), "db     | ready");
        assert_eq!(format_line("redis", 5, "ok"), "redis  | ok");
    }

    #[test]
    fn test_prefix_width() {
        assert_eq!(prefix_width(["web", "postgres", "db"]), 8);
        assert_eq!(prefix_width(Vec::<&str>::new()), 0);
    }

    #[test]
    fn test_write_prefixed_skips_empty_lines() {
        let mut out = Vec::new();
        write_prefixed(&mut out, "web", 4, "one\n\ntwo\n").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "web   | one\nweb   | two\n");
    }

    #[tokio::test]
    async fn test_multiplex_prefixes_every_line() {
        let token = CancellationToken::new();
        let mut out = Vec::new();

        multiplex(
            vec![
                source("web", "GET /\nGET /health\n"),
                source("postgres", "ready to accept connections\n\n"),
            ],
            &mut out,
            &token,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.contains(&"postgres  | ready to accept connections"));

        // Per-stream order is preserved
        let first = lines.iter().position(|l| *l == "web       | GET /").unwrap();
        let second = lines.iter().position(|l| *l == "web       | GET /health").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_multiplex_without_sources() {
        let token = CancellationToken::new();
        let mut out = Vec::new();
        multiplex(Vec::new(), &mut out, &token).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_multiplex_stops_on_cancel() {
        let token = CancellationToken::new();
        let (_writer, reader) = tokio::io::duplex(64);
        let pending = LogSource::new("web", LogStream::new(Box::new(reader)));

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let mut out = Vec::new();
        multiplex(vec![pending], &mut out, &token).await.unwrap();
        assert!(token.is_cancelled());
    }
}
