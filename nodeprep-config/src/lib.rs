//! # nodeprep-config
//!
//! Translates the `npm` section of a run configuration into the flat
//! `key=value` space understood by the package manager's `config` command.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nodeprep_config::{translate, TranslationDefaults};
//! use nodeprep_core::{HostEnv, RunConfig};
//!
//! fn print_config(run_cfg: &RunConfig) {
//!     let defaults = TranslationDefaults::from_host(&HostEnv::from_process());
//!     let flat = translate(run_cfg.npm.as_ref(), &defaults);
//!     for arg in flat.to_config_args() {
//!         println!("{arg}");
//!     }
//! }
//! ```

pub mod defaults;
pub mod flat;
pub mod translate;

pub use defaults::TranslationDefaults;
pub use flat::{FlatConfig, FlatValue};
pub use translate::{translate, uri_fragment};
