//! Contextual defaults the translation starts from.

use nodeprep_core::HostEnv;

/// Host proxied directly, bypassing any configured proxy.
pub const NO_PROXY_HOST: &str = "registry.npmjs.org";

/// Values applied before a run's own overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationDefaults {
    /// Registry used when the run declares none.
    pub registry: String,
    pub ca_file: Option<String>,
    pub strict_ssl: bool,
    pub legacy_peer_deps: bool,
    pub package_lock: bool,
}

impl TranslationDefaults {
    /// Defaults for the given host: cache registry (or the public one) and
    /// the forwarded CA bundle.
    pub fn from_host(host: &HostEnv) -> Self {
        Self {
            registry: host.default_registry().to_string(),
            ca_file: host.ca_file.clone(),
            strict_ssl: true,
            legacy_peer_deps: true,
            package_lock: false,
        }
    }
}

impl Default for TranslationDefaults {
    fn default() -> Self {
        Self::from_host(&HostEnv::default())
    }
}
