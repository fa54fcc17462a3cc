use std::path::PathBuf;
use thiserror::Error;

use crate::core::ParseError;

/// Errors that can occur while loading bindings files and event scripts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File does not exist.
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    /// File exists but its content is invalid.
    #[error("Invalid {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
