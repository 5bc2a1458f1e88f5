pub mod config;
pub mod pre_exec;
pub mod prepare;

use std::path::Path;

use anyhow::{Context, Result};

use nodeprep_core::{run_config, RunConfig};

/// Load the run configuration named on the command line.
pub(crate) fn load_run_config(path: &Path) -> Result<RunConfig> {
    run_config::load_at(path)
        .with_context(|| format!("failed to load run config {}", path.display()))
}
