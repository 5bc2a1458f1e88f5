//! Runner configuration loading.
//!
//! The runner configuration is a JSON document (`sauce-runner.json`) or a
//! YAML equivalent, selected by file extension. Loading is explicit: callers
//! hold the returned [`RunConfig`] and pass it down; nothing is cached.

use std::path::Path;

use crate::error::{io_err, CoreError};
use crate::types::RunConfig;

/// Serialization format of a run configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunConfigFormat {
    Json,
    Yaml,
}

impl RunConfigFormat {
    /// `.yaml` / `.yml` select YAML; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                RunConfigFormat::Yaml
            }
            _ => RunConfigFormat::Json,
        }
    }
}

/// Load the run configuration at `path`.
///
/// Returns `CoreError::RunConfigNotFound` if absent and a parse error
/// carrying the path if malformed. When the document has no `path` field it
/// is set to `path`, so rebuild detection looks next to the file itself.
pub fn load_at(path: &Path) -> Result<RunConfig, CoreError> {
    if !path.exists() {
        return Err(CoreError::RunConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    parse(&contents, path, RunConfigFormat::from_path(path))
}

/// Parse run configuration text; `origin` fills in a missing `path`.
pub fn parse(contents: &str, origin: &Path, format: RunConfigFormat) -> Result<RunConfig, CoreError> {
    let mut cfg: RunConfig = match format {
        RunConfigFormat::Json => serde_json::from_str(contents).map_err(|e| CoreError::Json {
            path: origin.to_path_buf(),
            source: e,
        })?,
        RunConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| CoreError::Yaml {
            path: origin.to_path_buf(),
            source: e,
        })?,
    };
    if cfg.path.as_os_str().is_empty() {
        cfg.path = origin.to_path_buf();
    }
    Ok(cfg)
}
