//! `nodeprep pre-exec` — run a suite's pre-exec commands.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;

use nodeprep_runtime::{run_blocking, run_pre_exec};

use super::load_run_config;

/// Arguments for `nodeprep pre-exec`.
#[derive(Args, Debug)]
pub struct PreExecArgs {
    /// Runner configuration file (JSON or YAML).
    #[arg(long)]
    pub run_cfg: PathBuf,

    /// Name of the suite whose commands run.
    #[arg(long)]
    pub suite: String,

    /// Time budget for all commands together.
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,

    /// Directory the commands run in. Defaults to the run config's project
    /// directory.
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
}

impl PreExecArgs {
    pub fn run(self) -> Result<()> {
        let run_cfg = load_run_config(&self.run_cfg)?;
        let suite = run_cfg
            .find_suite(&self.suite)
            .with_context(|| format!("no suite named '{}' in {}", self.suite, self.run_cfg.display()))?;
        let work_dir = self.work_dir.clone().unwrap_or_else(|| run_cfg.project_dir());
        let limit = Duration::from_secs(self.timeout_secs);

        let passed = run_blocking(run_pre_exec(suite, limit, &work_dir))
            .context("failed to start async runtime")?;
        if !passed {
            bail!("pre-exec commands for suite '{}' failed", self.suite);
        }
        Ok(())
    }
}
