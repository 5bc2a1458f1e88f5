//! Host environment snapshot.
//!
//! Provisioning reads a handful of environment variables. They are captured
//! once into a [`HostEnv`] value and passed explicitly; nothing below this
//! module touches `std::env`.

use std::path::PathBuf;

/// Public npm registry used when nothing else is configured.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Cache-registry override.
pub const CACHE_REGISTRY_VAR: &str = "SAUCE_NPM_CACHE";
/// Set when running inside a managed virtual machine rather than a container.
pub const MANAGED_VM_VAR: &str = "SAUCE_VM";
/// CA bundle forwarded to the package manager as `cafile`.
pub const CA_FILE_VAR: &str = "CA_FILE";
pub const HOME_VAR: &str = "HOME";

/// Environment values that influence provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostEnv {
    pub home: Option<PathBuf>,
    pub in_managed_vm: bool,
    pub cache_registry: Option<String>,
    pub ca_file: Option<String>,
}

impl HostEnv {
    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        let mut env = Self::from_lookup(|key| std::env::var(key).ok());
        if env.home.is_none() {
            env.home = dirs::home_dir();
        }
        env
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            home: get(HOME_VAR).map(PathBuf::from),
            in_managed_vm: get(MANAGED_VM_VAR).is_some(),
            cache_registry: get(CACHE_REGISTRY_VAR),
            ca_file: get(CA_FILE_VAR),
        }
    }

    /// Registry used when the run configuration declares none.
    pub fn default_registry(&self) -> &str {
        self.cache_registry.as_deref().unwrap_or(DEFAULT_REGISTRY)
    }
}
