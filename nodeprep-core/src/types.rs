//! Domain types for a test run's dependency environment.
//!
//! All path fields use `PathBuf`. Field names follow the camelCase keys of
//! the runner configuration file (`npm.strictSSL`, `suites[].preExec`, ...).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed npm package name (`left-pad`, `@acme/tools`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageName(pub String);

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A package version as the package manager receives it.
///
/// The run configuration may declare versions as JSON numbers (`"pkg": 2`);
/// they are stringified at load time since the package manager only accepts
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PackageVersion(pub String);

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PackageVersion {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl<'de> Deserialize<'de> for PackageVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let version = match RawVersion::deserialize(deserializer)? {
            RawVersion::Text(s) => s,
            RawVersion::Unsigned(n) => n.to_string(),
            RawVersion::Signed(n) => n.to_string(),
            RawVersion::Float(n) => n.to_string(),
        };
        Ok(Self(version))
    }
}

// ---------------------------------------------------------------------------
// Untyped flag values
// ---------------------------------------------------------------------------

/// A scalar flag value kept exactly as the run configuration wrote it.
///
/// Flags such as `legacyPeerDeps` treat `false` and `"false"` alike but every
/// other value differently, so the raw form is preserved until translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigScalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ConfigScalar {
    /// `true` only for the boolean literal `true`.
    pub fn is_true_literal(&self) -> bool {
        matches!(self, ConfigScalar::Bool(true))
    }

    /// `true` for the boolean `false` or the exact string `"false"`.
    pub fn is_false_like(&self) -> bool {
        match self {
            ConfigScalar::Bool(b) => !b,
            ConfigScalar::Text(s) => s == "false",
            ConfigScalar::Number(_) => false,
        }
    }
}

impl fmt::Display for ConfigScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigScalar::Bool(b) => b.fmt(f),
            ConfigScalar::Number(n) => n.fmt(f),
            ConfigScalar::Text(s) => s.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

/// A value of the expected type, or anything else.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Expected(T),
    Other(serde::de::IgnoredAny),
}

/// Explicit `null` decodes as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Optional field that reads as unset when `null` or of the wrong type.
fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<Lenient<T>>::deserialize(deserializer)? {
        Some(Lenient::Expected(value)) => Some(value),
        Some(Lenient::Other(_)) | None => None,
    })
}

// ---------------------------------------------------------------------------
// Registry declarations
// ---------------------------------------------------------------------------

/// One registry declaration from `npm.registries[]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    pub url: String,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Registry {
    /// Unscoped registry pointing at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// The scope this registry serves, ignoring empty strings.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_scoped(&self) -> bool {
        self.scope().is_some()
    }
}

/// The `npm` section of a run configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NpmConfig {
    /// Package name → version to install for this run.
    #[serde(default, deserialize_with = "null_as_default")]
    pub packages: BTreeMap<PackageName, PackageVersion>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub registries: Vec<Registry>,
    /// Deprecated singular form of an unscoped registry URL.
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,
    #[serde(
        rename = "strictSSL",
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub strict_ssl: Option<ConfigScalar>,
    #[serde(
        rename = "packageLock",
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub package_lock: Option<ConfigScalar>,
    #[serde(
        rename = "legacyPeerDeps",
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub legacy_peer_deps: Option<ConfigScalar>,
}

impl NpmConfig {
    /// `name@version` tokens for the install subcommand, in name order.
    pub fn install_tokens(&self) -> Vec<String> {
        self.packages
            .iter()
            .map(|(name, version)| format!("{name}@{version}"))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// A test suite entry; only the fields provisioning cares about are modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    pub name: String,
    #[serde(rename = "preExec", default, skip_serializing_if = "Option::is_none")]
    pub pre_exec: Option<Vec<String>>,
}

/// Root of a runner configuration file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Location of the run's own manifest; defaults to the file it was
    /// loaded from.
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm: Option<NpmConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suites: Vec<Suite>,
}

impl RunConfig {
    /// Directory holding the run's manifest (`.` for a bare file name).
    pub fn project_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn find_suite(&self, name: &str) -> Option<&Suite> {
        self.suites.iter().find(|s| s.name == name)
    }
}

// ---------------------------------------------------------------------------
// Node context
// ---------------------------------------------------------------------------

/// How the package-manager binary is launched. Fixed for one provisioning
/// run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeContext {
    /// Interpreter binary (`node`).
    pub node_path: PathBuf,
    /// Package-manager entry script passed as the interpreter's first
    /// argument (`.../npm-cli.js`).
    pub npm_path: PathBuf,
    /// Ignore the two paths and run the `npm` found on `PATH`.
    pub use_globals: bool,
}

impl NodeContext {
    pub fn explicit(node_path: impl AsRef<Path>, npm_path: impl AsRef<Path>) -> Self {
        Self {
            node_path: node_path.as_ref().to_path_buf(),
            npm_path: npm_path.as_ref().to_path_buf(),
            use_globals: false,
        }
    }

    pub fn globals() -> Self {
        Self {
            node_path: PathBuf::new(),
            npm_path: PathBuf::new(),
            use_globals: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
