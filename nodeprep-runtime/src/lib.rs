//! Provisioning runtime: package-manager subprocesses, the phase state
//! machine, pre-exec commands, and the single-threaded tokio bootstrap.

mod bootstrap;
pub mod command;
mod error;
pub mod invoker;
pub mod orchestrator;
pub mod pre_exec;

pub use bootstrap::{init_tracing, run_blocking};
pub use command::{CommandSpec, Subcommand};
pub use error::RuntimeError;
pub use invoker::{PackageManager, PackageManagerInvoker};
pub use nodeprep_manifest::SwapToken;
pub use orchestrator::{PhaseResult, ProvisioningOrchestrator, ProvisioningOutcome};
pub use pre_exec::run_pre_exec;
