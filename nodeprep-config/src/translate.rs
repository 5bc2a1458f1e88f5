//! Registry / auth translation.
//!
//! ## Precedence for the default `registry`
//!
//! 1. First `registries[]` entry without a `scope`.
//! 2. Deprecated singular `npm.registry` (ignored when empty).
//! 3. The host's cache registry, then the public registry
//!    (both folded into [`TranslationDefaults::registry`]).
//!
//! Scoped entries add `<scope>:registry` and never replace the default.
//! Translation is total: missing or empty optional fields mean "not set".

use nodeprep_core::{NpmConfig, Registry};

use crate::defaults::{TranslationDefaults, NO_PROXY_HOST};
use crate::flat::{FlatConfig, FlatValue};

/// Translate a run's `npm` section into flat package-manager configuration.
///
/// `None` (no `npm` section) yields the defaults alone.
pub fn translate(npm: Option<&NpmConfig>, defaults: &TranslationDefaults) -> FlatConfig {
    let mut flat = base_config(defaults);
    let Some(npm) = npm else {
        return flat;
    };

    flat.set("registry", resolve_registry(npm, defaults));

    // Passed through untouched; only a literal `false` disables it downstream.
    if let Some(strict_ssl) = npm.strict_ssl.as_ref() {
        flat.set("strict-ssl", FlatValue::from(strict_ssl));
    }

    let package_lock = npm
        .package_lock
        .as_ref()
        .is_some_and(|v| v.is_true_literal());
    flat.set("package-lock", package_lock);

    let legacy_peer_deps = !npm
        .legacy_peer_deps
        .as_ref()
        .is_some_and(|v| v.is_false_like());
    flat.set("legacy-peer-deps", legacy_peer_deps);

    for registry in &npm.registries {
        if let Some(scope) = registry.scope() {
            flat.set(format!("{scope}:registry"), registry.url.as_str());
        }
        apply_credentials(&mut flat, registry);
    }

    flat
}

/// URI fragment npm keys credentials by: scheme stripped, trailing `:`.
///
/// `https://corp.example/npm/` → `//corp.example/npm/:`
pub fn uri_fragment(url: &str) -> String {
    let without_scheme = match url.find("://") {
        Some(idx) => &url[idx + 1..],
        None => url,
    };
    if without_scheme.starts_with("//") {
        format!("{without_scheme}:")
    } else {
        format!("//{without_scheme}:")
    }
}

fn base_config(defaults: &TranslationDefaults) -> FlatConfig {
    let mut flat = FlatConfig::new();
    flat.set("json", false);
    flat.set("save", false);
    flat.set("audit", false);
    flat.set("rollback", false);
    flat.set("fund", false);
    flat.set("noproxy", NO_PROXY_HOST);
    flat.set("cafile", defaults.ca_file.clone());
    flat.set("package-lock", defaults.package_lock);
    flat.set("strict-ssl", defaults.strict_ssl);
    flat.set("legacy-peer-deps", defaults.legacy_peer_deps);
    flat.set("registry", defaults.registry.as_str());
    flat
}

fn resolve_registry(npm: &NpmConfig, defaults: &TranslationDefaults) -> String {
    let mut unscoped = npm
        .registries
        .iter()
        .filter(|r| !r.is_scoped() && !r.url.is_empty());

    if let Some(first) = unscoped.next() {
        for ignored in unscoped {
            tracing::warn!(
                url = %ignored.url,
                kept = %first.url,
                "ignoring additional unscoped registry"
            );
        }
        return first.url.clone();
    }

    npm.registry
        .as_deref()
        .filter(|r| !r.is_empty())
        .unwrap_or(&defaults.registry)
        .to_string()
}

fn apply_credentials(flat: &mut FlatConfig, registry: &Registry) {
    if registry.url.is_empty() {
        return;
    }
    let fragment = uri_fragment(&registry.url);
    // `username` and `email` carry no underscore; npm has always keyed them so.
    let fields = [
        ("_authToken", &registry.auth_token),
        ("_auth", &registry.auth),
        ("username", &registry.username),
        ("_password", &registry.password),
        ("email", &registry.email),
    ];
    for (suffix, value) in fields {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            flat.set(format!("{fragment}{suffix}"), value);
        }
    }
}
