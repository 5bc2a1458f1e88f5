//! Run-config loading integration tests: error messages, format selection,
//! and field mapping.

use assert_fs::prelude::*;
use nodeprep_core::{
    run_config, ConfigScalar, CoreError, PackageName, PackageVersion, Registry,
};
use predicates::prelude::*;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// 1. Load errors
// ---------------------------------------------------------------------------

#[test]
fn missing_file_returns_not_found() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("sauce-runner.json");
    let err = run_config::load_at(&path).unwrap_err();
    assert!(matches!(err, CoreError::RunConfigNotFound { .. }), "got: {err}");
    let msg = err.to_string();
    assert!(predicate::str::contains("runner config").eval(&msg), "got: {msg}");
    assert!(predicate::str::contains("sauce-runner.json").eval(&msg), "got: {msg}");
}

#[test]
fn malformed_json_reports_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("sauce-runner.json");
    file.write_str("{ \"npm\": [unclosed").expect("write");

    let err = run_config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, CoreError::Json { .. }), "got: {err}");
    assert!(predicate::str::contains("sauce-runner.json").eval(&err.to_string()));
}

#[test]
fn malformed_yaml_reports_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("runner.yml");
    file.write_str("npm: : : broken\n  - [").expect("write");

    let err = run_config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, CoreError::Yaml { .. }), "got: {err}");
    assert!(predicate::str::contains("runner.yml").eval(&err.to_string()));
}

// ---------------------------------------------------------------------------
// 2. Field mapping
// ---------------------------------------------------------------------------

#[test]
fn json_runner_config_maps_all_npm_fields() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("sauce-runner.json");
    file.write_str(
        r#"{
          "npm": {
            "packages": {"left-pad": "1.3.0", "cypress": 12},
            "registries": [
              {"url": "https://corp.example/npm/", "scope": "@acme", "authToken": "tok"}
            ],
            "registry": "https://legacy.example/",
            "strictSSL": false,
            "packageLock": "true",
            "legacyPeerDeps": "false"
          },
          "suites": [{"name": "smoke", "preExec": ["echo hi"]}]
        }"#,
    )
    .expect("write");

    let cfg = run_config::load_at(file.path()).expect("load");
    assert_eq!(cfg.path, file.path().to_path_buf());
    assert_eq!(cfg.project_dir(), dir.path().to_path_buf());

    let npm = cfg.npm.as_ref().expect("npm section");
    assert_eq!(
        npm.packages.get(&PackageName::from("cypress")),
        Some(&PackageVersion::from("12"))
    );
    assert_eq!(
        npm.registries,
        vec![Registry {
            scope: Some("@acme".into()),
            auth_token: Some("tok".into()),
            ..Registry::new("https://corp.example/npm/")
        }]
    );
    assert_eq!(npm.registry.as_deref(), Some("https://legacy.example/"));
    assert_eq!(npm.strict_ssl, Some(ConfigScalar::Bool(false)));
    assert_eq!(npm.package_lock, Some(ConfigScalar::Text("true".into())));
    assert_eq!(npm.legacy_peer_deps, Some(ConfigScalar::Text("false".into())));

    let suite = cfg.find_suite("smoke").expect("suite");
    assert_eq!(suite.pre_exec.as_deref(), Some(&["echo hi".to_string()][..]));
    assert!(cfg.find_suite("missing").is_none());
}

#[test]
fn yaml_runner_config_is_supported() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("runner.yaml");
    file.write_str(
        "path: /work/project/sauce-runner.json\nnpm:\n  packages:\n    left-pad: 1.3.0\n    typescript: 5\n",
    )
    .expect("write");

    let cfg = run_config::load_at(file.path()).expect("load");
    assert_eq!(cfg.path, PathBuf::from("/work/project/sauce-runner.json"));
    let npm = cfg.npm.as_ref().expect("npm section");
    assert_eq!(npm.install_tokens(), vec!["left-pad@1.3.0", "typescript@5"]);
}

// ---------------------------------------------------------------------------
// 3. Tolerated input
// ---------------------------------------------------------------------------

#[test]
fn null_collections_load_as_empty() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("sauce-runner.json");
    file.write_str(r#"{"path": null, "npm": {"packages": null, "registries": null}, "suites": null}"#)
        .expect("write");

    let cfg = run_config::load_at(file.path()).expect("load");
    assert_eq!(cfg.path, file.path().to_path_buf());
    assert!(cfg.suites.is_empty());
    let npm = cfg.npm.as_ref().expect("npm section");
    assert!(npm.packages.is_empty());
    assert!(npm.registries.is_empty());
}

#[test]
fn mistyped_optional_fields_load_as_unset() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("sauce-runner.json");
    file.write_str(
        r#"{"npm": {
            "registries": [{"url": "https://r.example/", "email": 42, "scope": false}],
            "strictSSL": ["x"],
            "legacyPeerDeps": {"value": false}
        }}"#,
    )
    .expect("write");

    let cfg = run_config::load_at(file.path()).expect("load");
    let npm = cfg.npm.as_ref().expect("npm section");
    assert_eq!(npm.registries, vec![Registry::new("https://r.example/")]);
    assert!(npm.strict_ssl.is_none());
    assert!(npm.legacy_peer_deps.is_none());
}

#[test]
fn null_sections_in_yaml_load_as_empty() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("runner.yaml");
    file.write_str("npm:\n  packages: ~\n  registries: ~\nsuites: ~\n").expect("write");

    let cfg = run_config::load_at(file.path()).expect("load");
    assert!(cfg.npm.as_ref().expect("npm section").packages.is_empty());
    assert!(cfg.suites.is_empty());
}
