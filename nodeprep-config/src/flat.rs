//! Flat configuration mapping handed to the package manager.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use nodeprep_core::ConfigScalar;

/// A scalar configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlatValue {
    Str(String),
    Bool(bool),
    Null,
}

impl fmt::Display for FlatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatValue::Str(s) => s.fmt(f),
            FlatValue::Bool(b) => b.fmt(f),
            FlatValue::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for FlatValue {
    fn from(s: &str) -> Self {
        FlatValue::Str(s.to_owned())
    }
}

impl From<String> for FlatValue {
    fn from(s: String) -> Self {
        FlatValue::Str(s)
    }
}

impl From<bool> for FlatValue {
    fn from(b: bool) -> Self {
        FlatValue::Bool(b)
    }
}

impl From<Option<String>> for FlatValue {
    fn from(v: Option<String>) -> Self {
        v.map_or(FlatValue::Null, FlatValue::Str)
    }
}

impl From<&ConfigScalar> for FlatValue {
    fn from(v: &ConfigScalar) -> Self {
        match v {
            ConfigScalar::Bool(b) => FlatValue::Bool(*b),
            ConfigScalar::Text(s) => FlatValue::Str(s.clone()),
            ConfigScalar::Number(n) => FlatValue::Str(n.to_string()),
        }
    }
}

/// Ordered `key → value` mapping. Key order is lexical, so the same input
/// always produces the same argument vector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlatConfig(BTreeMap<String, FlatValue>);

impl FlatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FlatValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FlatValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlatValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Arguments for the package manager's `config` subcommand:
    /// `["set", "k=v", ...]`.
    ///
    /// `null` values are left out so the package manager keeps its own
    /// default. Keys and values are not escaped; they travel as separate
    /// argv entries, never through a shell.
    pub fn to_config_args(&self) -> Vec<String> {
        let mut args = vec!["set".to_string()];
        args.extend(
            self.0
                .iter()
                .filter(|(_, v)| **v != FlatValue::Null)
                .map(|(k, v)| format!("{k}={v}")),
        );
        args
    }
}
