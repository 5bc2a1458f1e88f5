use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Error surface for subprocess invocation and orchestration.
///
/// A non-zero exit code is not an error here: it is reported as a value so
/// each phase can decide what it means.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unable to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest error: {0}")]
    Manifest(#[from] nodeprep_manifest::ManifestError),

    #[error("provisioning timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RuntimeError {
    RuntimeError::Io {
        path: path.into(),
        source,
    }
}
