use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while decoding or constructing metadata records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A text line does not satisfy its record grammar.
    ///
    /// Readers treat this as a tolerable outcome: the line is logged and
    /// skipped.
    #[error("{record} line does not match its grammar ({reason}): {line:?}")]
    LineMismatch {
        record: &'static str,
        line: String,
        reason: String,
    },

    /// A captured field could not be converted into its typed value.
    #[error("invalid {field} value {value:?}: {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A reference-pointer path cannot identify a `refs.ptr` file.
    #[error("invalid ref pointer path {}: {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },
}

impl TypeError {
    pub(crate) fn invalid_field(
        field: &'static str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the types crate.
pub type Result<T> = std::result::Result<T, TypeError>;
