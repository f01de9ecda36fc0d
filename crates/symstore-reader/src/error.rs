use std::io;
use std::path::{Path, PathBuf};

use symstore_types::TypeError;

/// Fatal errors produced while reading store metadata.
///
/// Malformed lines are not errors at this level; they are reported through
/// [`Loaded::skipped`](crate::Loaded::skipped).
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// The file or directory to read does not exist.
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A reference-pointer path cannot identify a `refs.ptr` file.
    #[error("invalid path {}: {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// I/O failure other than a missing file.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cancellation token fired before the load finished.
    #[error("load cancelled")]
    Cancelled,

    /// A background discovery task panicked or was aborted.
    #[error("background task failed: {0}")]
    Task(String),

    /// Reader configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl ReaderError {
    /// Classify an I/O error for `path`, keeping missing files distinct.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Lift a rejected reference-pointer path from the types crate.
    pub(crate) fn invalid_path(path: &Path, err: TypeError) -> Self {
        match err {
            TypeError::InvalidPath { path, reason } => Self::InvalidPath { path, reason },
            other => Self::InvalidPath {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        }
    }
}

/// Convenience alias used throughout the reader crate.
pub type Result<T> = std::result::Result<T, ReaderError>;
