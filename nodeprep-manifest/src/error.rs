//! Error types for nodeprep-manifest.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while swapping or writing manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// An I/O error other than "file does not exist", with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (synthetic manifest).
    #[error("manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`ManifestError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ManifestError {
    ManifestError::Io {
        path: path.into(),
        source,
    }
}
