use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, Result};

/// Default cap on files loaded at the same time during a fan-out.
pub const DEFAULT_MAX_CONCURRENT_FILES: usize = 16;

/// Configuration for metadata loads.
///
/// Can be written as TOML:
///
/// ```toml
/// max_concurrent_files = 32
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Upper bound on detail or `refs.ptr` files open at once.
    pub max_concurrent_files: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: DEFAULT_MAX_CONCURRENT_FILES,
        }
    }
}

impl ReaderConfig {
    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ReaderError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ReaderError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Override the concurrency cap.
    pub fn with_max_concurrent_files(mut self, limit: usize) -> Self {
        self.max_concurrent_files = limit;
        self
    }

    /// Effective concurrency cap; never below one.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_files.max(1)
    }
}
