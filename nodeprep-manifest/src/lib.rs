//! # nodeprep-manifest
//!
//! Temporary relocation of a project's npm manifests and the synthetic
//! manifest that drives a run's install.
//!
//! Call [`run_exclusive`] to move `package.json` / `package-lock.json` out
//! of the way, run an action, and move them back on every exit path.

pub mod error;
pub mod swap;
pub mod synthetic;

pub use error::ManifestError;
pub use swap::{backup_path, run_exclusive, ManifestSwap, SwapToken, CANONICAL_MANIFESTS};
pub use synthetic::{remove_synthetic_manifest, write_synthetic_manifest, SyntheticManifest};
