//! Synthetic manifest writer.
//!
//! The install phase runs against a throwaway `package.json` that lists only
//! the run's declared packages. It is written with a `.tmp` + rename so the
//! package manager never sees a half-written file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use nodeprep_core::{PackageName, PackageVersion};

use crate::error::{io_err, ManifestError};

/// Manifest document: `{ "dependencies": { <name>: <version> } }`.
#[derive(Debug, Clone, Serialize)]
pub struct SyntheticManifest<'a> {
    pub dependencies: &'a BTreeMap<PackageName, PackageVersion>,
}

/// Write the synthetic `package.json` for `packages` into `work_dir`.
///
/// Returns the path written.
pub fn write_synthetic_manifest(
    work_dir: &Path,
    packages: &BTreeMap<PackageName, PackageVersion>,
) -> Result<PathBuf, ManifestError> {
    let path = work_dir.join("package.json");
    let tmp = work_dir.join("package.json.nodeprep.tmp");
    let content = serde_json::to_string_pretty(&SyntheticManifest {
        dependencies: packages,
    })?;
    write_with_tmp(&path, &content, &tmp)?;
    tracing::info!(
        "wrote synthetic manifest with {} dependencies: {}",
        packages.len(),
        path.display()
    );
    Ok(path)
}

/// Delete the synthetic `package.json` from `work_dir`. Absence is not an
/// error.
pub fn remove_synthetic_manifest(work_dir: &Path) -> Result<(), ManifestError> {
    let path = work_dir.join("package.json");
    match std::fs::remove_file(&path) {
        Ok(()) => {
            tracing::debug!("removed synthetic manifest {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(path, e)),
    }
}

fn write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), ManifestError> {
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn packages(pairs: &[(&str, &str)]) -> BTreeMap<PackageName, PackageVersion> {
        pairs
            .iter()
            .map(|(n, v)| (PackageName::from(*n), PackageVersion::from(*v)))
            .collect()
    }

    #[test]
    fn writes_dependencies_object() {
        let tmp = TempDir::new().unwrap();
        let path =
            write_synthetic_manifest(tmp.path(), &packages(&[("left-pad", "1.3.0"), ("b", "2")]))
                .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"dependencies": {"b": "2", "left-pad": "1.3.0"}})
        );
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        write_synthetic_manifest(tmp.path(), &packages(&[("a", "1")])).unwrap();
        assert!(!tmp.path().join("package.json.nodeprep.tmp").exists());
    }

    #[test]
    fn remove_is_quiet_when_absent() {
        let tmp = TempDir::new().unwrap();
        remove_synthetic_manifest(tmp.path()).unwrap();
        write_synthetic_manifest(tmp.path(), &packages(&[("a", "1")])).unwrap();
        remove_synthetic_manifest(tmp.path()).unwrap();
        assert!(!tmp.path().join("package.json").exists());
    }

    #[test]
    fn rename_failure_cleans_tmp() {
        let tmp = TempDir::new().unwrap();
        // A directory at the target path makes the rename fail.
        let target = tmp.path().join("package.json");
        fs::create_dir_all(target.join("occupied")).unwrap();
        let tmp_path = tmp.path().join("scratch.tmp");

        let err = write_with_tmp(&target, "{}", &tmp_path).expect_err("rename onto dir");
        assert!(matches!(err, ManifestError::Io { .. }));
        assert!(!tmp_path.exists(), ".tmp should be cleaned up");
        assert!(target.is_dir());
    }
}
