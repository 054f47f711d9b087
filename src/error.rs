//! Error types for the persistence collaborators.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from reading or writing the document file.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The file no longer exists.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Any other I/O failure.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl GatewayError {
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            GatewayError::NotFound(path.to_path_buf())
        } else {
            GatewayError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Errors from the remembered-path store.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("failed to access path memory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse path memory {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported path memory version {0}; expected 1")]
    UnsupportedVersion(u32),
}
