//! Best-effort source formatting.
//!
//! Formatting is never load-bearing: [`format_or_identity`] returns the
//! input unchanged whenever a formatter fails or panics.

use std::panic::{AssertUnwindSafe, catch_unwind};

use super::FileKind;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("failed to run formatter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("formatter exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("formatter produced invalid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("formatter is not available on this platform")]
    Unsupported,
}

/// A `(source, kind) -> source` filter.
pub trait Formatter {
    fn format(&self, source: &str, kind: FileKind) -> Result<String, FormatError>;
}

impl<F: Formatter + ?Sized> Formatter for std::sync::Arc<F> {
    fn format(&self, source: &str, kind: FileKind) -> Result<String, FormatError> {
        (**self).format(source, kind)
    }
}

/// Strips trailing whitespace, collapses blank-line runs and ends the file
/// with exactly one newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceFormatter;

impl Formatter for WhitespaceFormatter {
    fn format(&self, source: &str, _kind: FileKind) -> Result<String, FormatError> {
        let mut out = String::with_capacity(source.len());
        let mut blank_run = 0;
        for line in source.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                blank_run += 1;
                if blank_run > 1 || out.is_empty() {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            out.push_str(line);
            out.push('\n');
        }
        while out.ends_with("\n\n") {
            out.pop();
        }
        Ok(out)
    }
}

/// Pipes sources through an external program such as prettier.
///
/// `{ext}` in an argument is replaced by the file kind's extension.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `prettier --stdin-filepath component.<ext>`
    pub fn prettier() -> Self {
        Self::new(
            "prettier",
            vec!["--stdin-filepath".to_string(), "component.{ext}".to_string()],
        )
    }
}

impl Formatter for CommandFormatter {
    #[cfg(not(target_arch = "wasm32"))]
    fn format(&self, source: &str, kind: FileKind) -> Result<String, FormatError> {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let spawn_error = |source| FormatError::Spawn {
            program: self.program.clone(),
            source,
        };
        let args = self.args.iter().map(|a| a.replace("{ext}", kind.extension()));
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes()).map_err(spawn_error)?;
        }
        let output = child.wait_with_output().map_err(spawn_error)?;
        if !output.status.success() {
            return Err(FormatError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8(output.stdout)?)
    }

    #[cfg(target_arch = "wasm32")]
    fn format(&self, _source: &str, _kind: FileKind) -> Result<String, FormatError> {
        Err(FormatError::Unsupported)
    }
}

/// Format `source`, falling back to the input on any failure.
pub fn format_or_identity(formatter: &dyn Formatter, source: &str, kind: FileKind) -> String {
    match catch_unwind(AssertUnwindSafe(|| formatter.format(source, kind))) {
        Ok(Ok(formatted)) => formatted,
        Ok(Err(err)) => {
            tracing::debug!(%err, "formatter failed, keeping unformatted source");
            source.to_string()
        }
        Err(_) => {
            tracing::warn!("formatter panicked, keeping unformatted source");
            source.to_string()
        }
    }
}
