//! `nodeprep config` — show the npm configuration a run config produces.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use nodeprep_config::{translate, TranslationDefaults};
use nodeprep_core::HostEnv;

use super::load_run_config;

/// Arguments for `nodeprep config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Runner configuration file (JSON or YAML).
    #[arg(long)]
    pub run_cfg: PathBuf,

    /// Emit the full mapping as JSON, nulls included.
    #[arg(long)]
    pub json: bool,
}

impl ConfigArgs {
    pub fn run(self) -> Result<()> {
        let run_cfg = load_run_config(&self.run_cfg)?;
        let defaults = TranslationDefaults::from_host(&HostEnv::from_process());
        let flat = translate(run_cfg.npm.as_ref(), &defaults);

        if self.json {
            let rendered =
                serde_json::to_string_pretty(&flat).context("failed to encode configuration")?;
            println!("{rendered}");
            return Ok(());
        }

        // Same pairs the configure phase passes to `npm config set`.
        for pair in flat.to_config_args().iter().skip(1) {
            println!("{pair}");
        }
        Ok(())
    }
}
