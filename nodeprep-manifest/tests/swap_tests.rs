//! Manifest swap guard behaviour across success and failure of the enclosed
//! action.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use nodeprep_core::{PackageName, PackageVersion};
use nodeprep_manifest::{
    backup_path, run_exclusive, write_synthetic_manifest, ManifestError, SwapToken,
};
use tempfile::TempDir;

#[derive(Debug)]
enum ActionError {
    Manifest(ManifestError),
    Install(&'static str),
}

impl From<ManifestError> for ActionError {
    fn from(e: ManifestError) -> Self {
        ActionError::Manifest(e)
    }
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::Manifest(e) => write!(f, "{e}"),
            ActionError::Install(msg) => f.write_str(msg),
        }
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn project_with_both_manifests() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("package.json"), r#"{"name":"user-project"}"#).expect("write");
    fs::write(dir.path().join("package-lock.json"), r#"{"lockfileVersion":3}"#).expect("write");
    dir
}

fn packages() -> BTreeMap<PackageName, PackageVersion> {
    [(PackageName::from("left-pad"), PackageVersion::from("1.3.0"))]
        .into_iter()
        .collect()
}

fn leftover_backups(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(".nodeprep-"))
        .collect()
}

fn assert_user_manifests_intact(dir: &Path) {
    assert_eq!(
        fs::read_to_string(dir.join("package.json")).expect("package.json restored"),
        r#"{"name":"user-project"}"#
    );
    assert_eq!(
        fs::read_to_string(dir.join("package-lock.json")).expect("lock restored"),
        r#"{"lockfileVersion":3}"#
    );
    assert!(leftover_backups(dir).is_empty(), "backups must not remain");
}

#[test]
fn manifests_restored_after_successful_action() {
    init_logger();
    let dir = project_with_both_manifests();
    let token = SwapToken::random();

    let root = dir.path();
    let token_ref = &token;

    let seen = tokio_test::block_on(run_exclusive(root, token_ref, || async move {
        assert!(backup_path(root, "package.json", token_ref).exists());
        let path = write_synthetic_manifest(root, &packages())?;
        let content = fs::read_to_string(path).expect("read synthetic");
        Ok::<_, ActionError>(content)
    }))
    .expect("run_exclusive");

    assert!(seen.contains("left-pad"), "action saw the synthetic manifest");
    assert_user_manifests_intact(dir.path());
}

#[test]
fn manifests_restored_after_failing_action() {
    init_logger();
    let dir = project_with_both_manifests();
    let token = SwapToken::random();

    let root = dir.path();

    let err = tokio_test::block_on(run_exclusive(root, &token, || async move {
        write_synthetic_manifest(root, &packages())?;
        // A lock file generated by the package manager before it failed.
        fs::write(root.join("package-lock.json"), "generated").expect("write");
        Err::<(), _>(ActionError::Install("install exploded"))
    }))
    .expect_err("action error must propagate");

    assert!(matches!(err, ActionError::Install("install exploded")));
    assert_user_manifests_intact(dir.path());
}

#[test]
fn action_error_wins_when_restore_also_fails() {
    init_logger();
    let dir = project_with_both_manifests();
    let token = SwapToken::random();

    let root = dir.path();

    let err = tokio_test::block_on(run_exclusive(root, &token, || async move {
        write_synthetic_manifest(root, &packages())?;
        // Something left a non-empty directory where the manifest goes back.
        fs::remove_file(root.join("package.json")).expect("remove synthetic");
        fs::create_dir_all(root.join("package.json").join("occupied")).expect("mkdir");
        Err::<(), _>(ActionError::Install("install exploded"))
    }))
    .expect_err("action error must propagate");

    assert!(matches!(err, ActionError::Install("install exploded")), "got: {err}");
    assert!(dir.path().join("package.json").is_dir());
    assert!(
        backup_path(dir.path(), "package.json", &token).exists(),
        "unrestorable backup is left for the user"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("package-lock.json")).expect("lock restored"),
        r#"{"lockfileVersion":3}"#
    );
}

#[test]
fn missing_lock_file_stays_absent() {
    init_logger();
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("package.json"), r#"{"name":"user-project"}"#).expect("write");
    let token = SwapToken::random();

    let root = dir.path();

    tokio_test::block_on(run_exclusive(root, &token, || async move {
        write_synthetic_manifest(root, &packages())?;
        fs::write(root.join("package-lock.json"), "generated").expect("write");
        Ok::<_, ActionError>(())
    }))
    .expect("run_exclusive");

    assert!(dir.path().join("package.json").exists());
    assert!(!dir.path().join("package-lock.json").exists());
    assert!(leftover_backups(dir.path()).is_empty());
}

#[test]
fn empty_directory_stays_empty() {
    init_logger();
    let dir = TempDir::new().expect("tempdir");
    let token = SwapToken::random();

    let root = dir.path();

    tokio_test::block_on(run_exclusive(root, &token, || async move {
        write_synthetic_manifest(root, &packages())?;
        Ok::<_, ActionError>(())
    }))
    .expect("run_exclusive");

    let mut entries = fs::read_dir(dir.path()).expect("read_dir");
    assert!(entries.next().is_none(), "synthetic manifest must be removed");
}

#[test]
fn concurrent_tokens_do_not_collide() {
    init_logger();
    let dir = project_with_both_manifests();
    let first = SwapToken::random();
    let second = SwapToken::random();
    assert_ne!(
        backup_path(dir.path(), "package.json", &first),
        backup_path(dir.path(), "package.json", &second)
    );
}
