//! Error types for nodeprep-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading run configuration or exporting
/// payloads.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The run configuration file did not exist at the expected path.
    #[error("runner config ({path}) unavailable")]
    RunConfigNotFound { path: PathBuf },

    /// JSON parse error on load, with the file path.
    #[error("failed to parse run config at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parse error on load, with the file path.
    #[error("failed to parse run config at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON serialization error (export path).
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
