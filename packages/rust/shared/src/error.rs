//! Error types for copymark.
//!
//! Library crates use [`CopymarkError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! The annotation stages themselves never fail: unresolvable positions,
//! missing buckets and exhausted queues are skipped, not reported. Only the
//! adapters around them (rendering, configuration, file I/O) produce errors.

use std::path::PathBuf;

/// Top-level error type for all copymark operations.
#[derive(Debug, thiserror::Error)]
pub enum CopymarkError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Markdown-to-HTML rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// Data validation error (unknown target type, malformed identifier, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CopymarkError>;

impl CopymarkError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = CopymarkError::config("missing [targets] table");
        assert_eq!(err.to_string(), "config error: missing [targets] table");

        let err = CopymarkError::validation("unknown copy target type 'chart'");
        assert!(err.to_string().contains("'chart'"));

        let err = CopymarkError::Render("stream closed".into());
        assert_eq!(err.to_string(), "render error: stream closed");
    }

    #[test]
    fn io_error_keeps_path() {
        let err = CopymarkError::io(
            "/tmp/missing.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("missing.md"));
        assert!(msg.contains("gone"));
    }
}
