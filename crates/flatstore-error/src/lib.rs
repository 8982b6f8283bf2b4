//! Error taxonomy for flatstore.
//!
//! Load-path failures (`Io`, `Parse`) abort a cache load but never poison the
//! store: the next access retries. User-facing failures (`Validation`,
//! `NotFound`, `InvalidArgument`) are returned before any file or cache
//! state is touched.

use std::path::{Path, PathBuf};

/// Primary error type for flatstore operations.
#[derive(Debug, thiserror::Error)]
pub enum FlatError {
    /// The backing file could not be opened, read, or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is structurally malformed and nothing can be decoded.
    #[error("malformed data in {}: {detail}", path.display())]
    Parse { path: PathBuf, detail: String },

    /// A record failed field-level constraints before being persisted.
    #[error("invalid {kind} record: {field} {detail}")]
    Validation {
        kind: &'static str,
        field: &'static str,
        detail: String,
    },

    /// The delete target does not exist.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Malformed query input (limit, page, filter value).
    #[error("invalid {what}: {value}")]
    InvalidArgument { what: String, value: String },

    /// Configuration could not be resolved.
    #[error("configuration error: {detail}")]
    Config { detail: String },

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FlatError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse(path: impl AsRef<Path>, detail: impl Into<String>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            detail: detail.into(),
        }
    }

    pub fn validation(kind: &'static str, field: &'static str, detail: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            field,
            detail: detail.into(),
        }
    }

    pub fn invalid_argument(what: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidArgument {
            what: what.into(),
            value: value.to_string(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller, not the data or the environment, caused the error.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::NotFound { .. } | Self::InvalidArgument { .. }
        )
    }

    /// Whether the error came from loading the backing file.
    #[must_use]
    pub const fn is_load_error(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parse { .. })
    }
}

/// Result type alias using [`FlatError`].
pub type Result<T> = std::result::Result<T, FlatError>;
