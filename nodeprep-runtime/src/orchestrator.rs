//! Provisioning state machine.
//!
//! `START → CONFIGURE → (REBUILD) → (INSTALL) → DONE`
//!
//! Phases run strictly one after another. CONFIGURE always runs and its exit
//! code never stops the run. REBUILD runs only when the project already has a
//! `node_modules` tree. INSTALL runs only when the run declares packages, and
//! happens inside the manifest swap so the user's manifests are untouched.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use nodeprep_config::{translate, TranslationDefaults};
use nodeprep_core::{
    HostEnv, MetricsArtifact, NpmConfig, PhaseTiming, ProvisioningMetrics, RunConfig,
};
use nodeprep_detector::{detect_dependency_tree, DependencyTree};
use nodeprep_manifest::{
    remove_synthetic_manifest, run_exclusive, write_synthetic_manifest, SwapToken,
};

use crate::command::{rebuild_args, Subcommand};
use crate::error::RuntimeError;
use crate::invoker::PackageManager;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Raw exit code of one executed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseResult {
    /// `None` when the subprocess was killed by a signal.
    pub exit_code: Option<i32>,
}

impl PhaseResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Everything a provisioning run reports back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningOutcome {
    pub metrics: MetricsArtifact,
    pub configure: PhaseResult,
    /// `None` when no rebuild was needed.
    pub rebuild: Option<PhaseResult>,
    /// `None` when no packages were declared.
    pub install: Option<PhaseResult>,
}

impl ProvisioningOutcome {
    /// True unless rebuild or install ran and did not exit 0. Configure
    /// failures are tolerated.
    pub fn succeeded(&self) -> bool {
        self.failed_phase().is_none()
    }

    /// First phase whose failure the caller has to act on.
    pub fn failed_phase(&self) -> Option<(Subcommand, PhaseResult)> {
        let phases = [
            (Subcommand::Rebuild, self.rebuild),
            (Subcommand::Install, self.install),
        ];
        phases
            .into_iter()
            .filter_map(|(phase, result)| result.map(|r| (phase, r)))
            .find(|(_, result)| !result.succeeded())
    }

    /// Exit code of a failed install, if any.
    pub fn install_failure(&self) -> Option<Option<i32>> {
        self.install
            .filter(|result| !result.succeeded())
            .map(|result| result.exit_code)
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives one provisioning run against a working directory.
///
/// All inputs are fixed at construction; nothing is cached between runs.
pub struct ProvisioningOrchestrator<P> {
    pm: P,
    host: HostEnv,
    work_dir: PathBuf,
    token: SwapToken,
}

impl<P: PackageManager> ProvisioningOrchestrator<P> {
    /// Orchestrator with a fresh random swap token.
    pub fn new(pm: P, host: HostEnv, work_dir: impl Into<PathBuf>) -> Self {
        Self::with_token(pm, host, work_dir, SwapToken::random())
    }

    pub fn with_token(
        pm: P,
        host: HostEnv,
        work_dir: impl Into<PathBuf>,
        token: SwapToken,
    ) -> Self {
        Self {
            pm,
            host,
            work_dir: work_dir.into(),
            token,
        }
    }

    pub fn package_manager(&self) -> &P {
        &self.pm
    }

    /// Run every applicable phase for `run_cfg`.
    ///
    /// Spawn failures and manifest I/O errors abort the run. Non-zero exits
    /// are reported in the outcome.
    pub async fn provision(&self, run_cfg: &RunConfig) -> Result<ProvisioningOutcome, RuntimeError> {
        let tree = detect_dependency_tree(run_cfg, &self.host);

        let (configure, setup) = timed("configure", self.configure(run_cfg)).await?;
        if !configure.succeeded() {
            tracing::warn!(
                phase = "configure",
                code = ?configure.exit_code,
                "package manager configuration failed; continuing"
            );
        }

        let mut rebuild = None;
        let mut rebuild_timing = None;
        if let DependencyTree::Present { project_dir } = &tree {
            tracing::info!(
                project_dir = %project_dir.display(),
                "existing node_modules found; rebuilding"
            );
            let (result, timing) = timed("rebuild", self.rebuild(&tree)).await?;
            rebuild = Some(result);
            rebuild_timing = Some(timing);
        }

        let mut install = None;
        let mut install_timing = None;
        if let Some(npm) = run_cfg.npm.as_ref().filter(|npm| !npm.packages.is_empty()) {
            let (result, timing) = timed("install", self.install(npm)).await?;
            install = Some(result);
            install_timing = Some(timing);
        } else {
            tracing::info!("no packages declared; skipping install");
        }

        Ok(ProvisioningOutcome {
            metrics: MetricsArtifact::new(ProvisioningMetrics {
                setup,
                rebuild: rebuild_timing,
                install: install_timing,
            }),
            configure,
            rebuild,
            install,
        })
    }

    /// [`provision`](Self::provision) raced against `limit`.
    ///
    /// On expiry the in-flight phase is dropped, which kills its subprocess
    /// and restores any swapped manifests.
    pub async fn provision_with_timeout(
        &self,
        run_cfg: &RunConfig,
        limit: Duration,
    ) -> Result<ProvisioningOutcome, RuntimeError> {
        match tokio::time::timeout(limit, self.provision(run_cfg)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(timeout = ?limit, "provisioning timed out");
                Err(RuntimeError::Timeout { after: limit })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    async fn configure(&self, run_cfg: &RunConfig) -> Result<Option<i32>, RuntimeError> {
        let defaults = TranslationDefaults::from_host(&self.host);
        let flat = translate(run_cfg.npm.as_ref(), &defaults);
        tracing::debug!(keys = flat.len(), "translated package manager configuration");
        self.pm
            .invoke(Subcommand::Config, &flat.to_config_args())
            .await
    }

    async fn rebuild(&self, tree: &DependencyTree) -> Result<Option<i32>, RuntimeError> {
        self.pm
            .invoke(Subcommand::Rebuild, &rebuild_args(tree.project_dir()))
            .await
    }

    async fn install(&self, npm: &NpmConfig) -> Result<Option<i32>, RuntimeError> {
        let tokens = npm.install_tokens();
        tracing::info!(packages = %tokens.join(" "), "installing");

        let pm = &self.pm;
        let work_dir = self.work_dir.as_path();
        let packages = &npm.packages;
        let tokens = tokens.as_slice();

        run_exclusive(work_dir, &self.token, || async move {
            write_synthetic_manifest(work_dir, packages)?;
            let invoked = pm.invoke(Subcommand::Install, tokens).await;
            let removed = remove_synthetic_manifest(work_dir);
            let code = match invoked {
                Ok(code) => code,
                Err(e) => {
                    if let Err(cleanup) = removed {
                        tracing::warn!(error = %cleanup, "could not remove synthetic manifest");
                    }
                    return Err(e);
                }
            };
            removed?;
            Ok::<_, RuntimeError>(code)
        })
        .await
    }
}

/// Await a phase, logging its duration and exit code.
async fn timed<F>(phase: &'static str, run: F) -> Result<(PhaseResult, PhaseTiming), RuntimeError>
where
    F: Future<Output = Result<Option<i32>, RuntimeError>>,
{
    let started = Instant::now();
    let result = run.await;
    let timing = PhaseTiming::from_millis(started.elapsed().as_millis());

    match result {
        Ok(code) => {
            let outcome = PhaseResult { exit_code: code };
            if outcome.succeeded() {
                tracing::info!(phase, elapsed_ms = timing.duration, "phase finished");
            } else {
                tracing::error!(
                    phase,
                    elapsed_ms = timing.duration,
                    code = ?code,
                    "phase exited unsuccessfully"
                );
            }
            Ok((outcome, timing))
        }
        Err(e) => {
            tracing::error!(phase, elapsed_ms = timing.duration, error = %e, "phase aborted");
            Err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
