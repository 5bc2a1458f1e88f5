//! nodeprep core library — run configuration types, host environment,
//! metrics, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and run-configuration structs
//! - [`env`] — [`HostEnv`] snapshot of the variables provisioning reads
//! - [`metrics`] — per-phase timing payload
//! - [`run_config`] — load a run configuration from JSON or YAML
//! - [`export`] — persist JSON payloads for the caller
//! - [`error`] — [`CoreError`]

pub mod env;
pub mod error;
pub mod export;
pub mod metrics;
pub mod run_config;
pub mod types;

pub use env::HostEnv;
pub use error::CoreError;
pub use metrics::{MetricsArtifact, PhaseTiming, ProvisioningMetrics, METRICS_FILE_NAME};
pub use types::{
    ConfigScalar, NodeContext, NpmConfig, PackageName, PackageVersion, Registry, RunConfig, Suite,
};
