//! Log output redaction for vault identifiers and API secrets.

use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::Arc;

use regex::Regex;
use tracing_subscriber::fmt::MakeWriter;
use warden_core::{AppError, AppResult};

/// Replacement written in place of every match.
pub const REDACTED: &str = "<REDACTED>";

/// Patterns applied to every log line.
pub const DEFAULT_REDACTION_PATTERNS: [&str; 2] = [r"organization.[\w-]{36}", r"\b\w{30}\b"];

/// Compiled set of redaction patterns.
#[derive(Debug, Clone)]
pub struct LogRedactor {
    patterns: Vec<Regex>,
}

impl LogRedactor {
    /// Compiles the default patterns plus `extra_patterns`.
    ///
    /// Empty patterns are rejected because they would redact every line.
    pub fn new(extra_patterns: &[String]) -> AppResult<Self> {
        let patterns = DEFAULT_REDACTION_PATTERNS
            .iter()
            .copied()
            .chain(extra_patterns.iter().map(String::as_str))
            .map(|pattern| {
                if pattern.is_empty() {
                    return Err(AppError::Validation(
                        "empty log redaction pattern would redact every line".to_owned(),
                    ));
                }
                Regex::new(pattern).map_err(|error| {
                    AppError::Validation(format!("invalid log redaction pattern '{pattern}': {error}"))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Returns `text` with every pattern match replaced.
    #[must_use]
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut redacted = Cow::Borrowed(text);
        for pattern in &self.patterns {
            let replaced = match pattern.replace_all(&redacted, REDACTED) {
                Cow::Borrowed(_) => None,
                Cow::Owned(replaced) => Some(replaced),
            };
            if let Some(replaced) = replaced {
                redacted = Cow::Owned(replaced);
            }
        }
        redacted
    }
}

/// Writer that redacts complete lines before passing them on.
pub struct RedactingWriter<W: Write> {
    inner: W,
    redactor: Arc<LogRedactor>,
    buffer: Vec<u8>,
}

impl<W: Write> RedactingWriter<W> {
    fn write_redacted(&mut self, end: usize) -> io::Result<()> {
        {
            let line = String::from_utf8_lossy(&self.buffer[..end]);
            let redacted = self.redactor.redact(&line);
            self.inner.write_all(redacted.as_bytes())?;
        }
        self.buffer.drain(..end);
        Ok(())
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        while let Some(newline) = self.buffer.iter().position(|&byte| byte == b'\n') {
            self.write_redacted(newline + 1)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            self.write_redacted(self.buffer.len())?;
        }
        self.inner.flush()
    }
}

impl<W: Write> Drop for RedactingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// [`MakeWriter`] wrapping another one with redaction.
pub struct RedactingMakeWriter<M> {
    inner: M,
    redactor: Arc<LogRedactor>,
}

impl<M> RedactingMakeWriter<M> {
    /// Wraps `inner` so every line passes through `redactor`.
    #[must_use]
    pub fn new(inner: M, redactor: LogRedactor) -> Self {
        Self {
            inner,
            redactor: Arc::new(redactor),
        }
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
            redactor: Arc::clone(&self.redactor),
            buffer: Vec::new(),
        }
    }
}
