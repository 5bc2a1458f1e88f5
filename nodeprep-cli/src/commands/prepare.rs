//! `nodeprep prepare` — run the full provisioning sequence.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use nodeprep_core::{export, HostEnv, NodeContext};
use nodeprep_runtime::{
    run_blocking, PackageManagerInvoker, PhaseResult, ProvisioningOrchestrator, ProvisioningOutcome,
    SwapToken,
};

use super::load_run_config;

/// Arguments for `nodeprep prepare`.
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Runner configuration file (JSON or YAML).
    #[arg(long)]
    pub run_cfg: PathBuf,

    /// Directory the install runs in. Defaults to the run config's project
    /// directory.
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Node interpreter used to run the npm CLI script.
    #[arg(long, requires = "npm_cli", conflicts_with = "globals")]
    pub node_bin: Option<PathBuf>,

    /// npm CLI entry script (`npm-cli.js`).
    #[arg(long, requires = "node_bin", conflicts_with = "globals")]
    pub npm_cli: Option<PathBuf>,

    /// Use the `npm` found on PATH.
    #[arg(long)]
    pub globals: bool,

    /// Write npm_metrics.json into this directory.
    #[arg(long)]
    pub metrics_dir: Option<PathBuf>,

    /// Give up after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Identifier used to name manifest backups. Random when omitted.
    #[arg(long)]
    pub run_id: Option<String>,
}

impl PrepareArgs {
    pub fn run(self) -> Result<()> {
        let run_cfg = load_run_config(&self.run_cfg)?;
        let node = self.node_context()?;
        let work_dir = self.work_dir.clone().unwrap_or_else(|| run_cfg.project_dir());
        let token = self
            .run_id
            .clone()
            .map_or_else(SwapToken::random, SwapToken::from_run_id);

        let invoker = PackageManagerInvoker::new(node, &work_dir);
        let orchestrator =
            ProvisioningOrchestrator::with_token(invoker, HostEnv::from_process(), &work_dir, token);

        let timeout = self.timeout_secs.map(Duration::from_secs);
        let outcome = run_blocking(async {
            match timeout {
                Some(limit) => orchestrator.provision_with_timeout(&run_cfg, limit).await,
                None => orchestrator.provision(&run_cfg).await,
            }
        })
        .context("failed to start async runtime")?
        .context("provisioning failed")?;

        print_summary(&outcome);

        if let Some(dir) = &self.metrics_dir {
            let path = dir.join(&outcome.metrics.name);
            export::export_value(&path, &outcome.metrics.data)
                .with_context(|| format!("failed to write metrics to {}", path.display()))?;
        }

        if let Some((phase, result)) = outcome.failed_phase() {
            bail!("{phase} failed ({})", describe_exit(result));
        }
        Ok(())
    }

    fn node_context(&self) -> Result<NodeContext> {
        if self.globals {
            return Ok(NodeContext::globals());
        }
        match (&self.node_bin, &self.npm_cli) {
            (Some(node), Some(npm)) => Ok(NodeContext::explicit(node, npm)),
            _ => bail!("pass --node-bin and --npm-cli, or --globals"),
        }
    }
}

fn print_summary(outcome: &ProvisioningOutcome) {
    let data = &outcome.metrics.data;
    print_phase("configure", Some(outcome.configure), Some(data.setup.duration));
    print_phase(
        "rebuild",
        outcome.rebuild,
        data.rebuild.map(|t| t.duration),
    );
    print_phase(
        "install",
        outcome.install,
        data.install.map(|t| t.duration),
    );
}

fn print_phase(name: &str, result: Option<PhaseResult>, duration_ms: Option<u64>) {
    match (result, duration_ms) {
        (Some(result), Some(ms)) if result.succeeded() => {
            println!("{} {name} ({ms} ms)", "✓".green().bold());
        }
        (Some(result), Some(ms)) => {
            println!(
                "{} {name} ({ms} ms, {})",
                "✗".red().bold(),
                describe_exit(result)
            );
        }
        _ => println!("{} {name} skipped", "-".dimmed()),
    }
}

fn describe_exit(result: PhaseResult) -> String {
    match result.exit_code {
        Some(code) => format!("exit code {code}"),
        None => "killed by signal".to_string(),
    }
}
