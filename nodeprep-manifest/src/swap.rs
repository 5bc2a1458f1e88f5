//! Manifest swap guard.
//!
//! ## Protocol
//!
//! 1. Rename each canonical manifest to `<name>.nodeprep-<token>`; a manifest
//!    that does not exist is recorded as absent and skipped.
//! 2. Run the action (it may write a synthetic `package.json`, and the
//!    package manager may generate a lock file).
//! 3. Put every backup back over its canonical name and delete canonical
//!    files that were absent before step 1. A missing backup is skipped.
//! 4. Only then surface the action's error.
//!
//! The token makes backup names unique per run, so two runs in the same
//! directory never share backups. Step 3 also runs when the guard is
//! dropped, which covers cancellation of the enclosing future.

use std::fmt;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{io_err, ManifestError};

/// Manifest file names owned by the guard, in swap order.
pub const CANONICAL_MANIFESTS: [&str; 2] = ["package.json", "package-lock.json"];

// ---------------------------------------------------------------------------
// Swap token
// ---------------------------------------------------------------------------

/// Run-scoped suffix for backup file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SwapToken(String);

impl SwapToken {
    /// Fresh random token.
    pub fn random() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Token derived from a caller-supplied run identifier.
    pub fn from_run_id(run_id: impl Into<String>) -> Self {
        Self(run_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SwapToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// `<work_dir>/<name>.nodeprep-<token>`. No I/O.
pub fn backup_path(work_dir: &Path, name: &str, token: &SwapToken) -> PathBuf {
    work_dir.join(format!("{name}.nodeprep-{token}"))
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// The manifest existed and now sits at its backup path.
    Moved,
    /// The manifest did not exist before the swap.
    Absent,
}

/// Manifests moved out of a working directory, pending restoration.
#[derive(Debug)]
pub struct ManifestSwap {
    work_dir: PathBuf,
    token: SwapToken,
    slots: Vec<(&'static str, Slot)>,
    restored: bool,
}

impl ManifestSwap {
    /// Move every existing canonical manifest in `work_dir` to its backup
    /// name.
    ///
    /// On failure the manifests already moved are put back before the error
    /// is returned.
    pub fn swap_out(work_dir: &Path, token: &SwapToken) -> Result<Self, ManifestError> {
        let mut swap = Self {
            work_dir: work_dir.to_path_buf(),
            token: token.clone(),
            slots: Vec::with_capacity(CANONICAL_MANIFESTS.len()),
            restored: false,
        };

        for name in CANONICAL_MANIFESTS {
            let canonical = work_dir.join(name);
            let backup = backup_path(work_dir, name, token);
            match std::fs::rename(&canonical, &backup) {
                Ok(()) => {
                    tracing::debug!("moved {} -> {}", canonical.display(), backup.display());
                    swap.slots.push((name, Slot::Moved));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!("{} absent; nothing to move", canonical.display());
                    swap.slots.push((name, Slot::Absent));
                }
                // `swap` is dropped here, which restores the slots recorded so far.
                Err(e) => return Err(io_err(canonical, e)),
            }
        }
        Ok(swap)
    }

    /// Names that existed before the swap.
    pub fn moved(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots
            .iter()
            .filter(|(_, slot)| *slot == Slot::Moved)
            .map(|(name, _)| *name)
    }

    /// Put the manifests back. Every slot is attempted; the first error is
    /// returned.
    pub fn restore(mut self) -> Result<(), ManifestError> {
        self.restore_slots()
    }

    fn restore_slots(&mut self) -> Result<(), ManifestError> {
        self.restored = true;
        let mut first_err = None;

        for (name, slot) in &self.slots {
            let canonical = self.work_dir.join(name);
            let result = match slot {
                Slot::Moved => {
                    let backup = backup_path(&self.work_dir, name, &self.token);
                    match std::fs::rename(&backup, &canonical) {
                        Ok(()) => {
                            tracing::debug!("restored {}", canonical.display());
                            Ok(())
                        }
                        Err(e) if e.kind() == ErrorKind::NotFound => {
                            tracing::warn!("backup {} vanished; skipping", backup.display());
                            Ok(())
                        }
                        Err(e) => Err(io_err(backup, e)),
                    }
                }
                Slot::Absent => match std::fs::remove_file(&canonical) {
                    Ok(()) => {
                        tracing::debug!("removed generated {}", canonical.display());
                        Ok(())
                    }
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(io_err(canonical, e)),
                },
            };
            if let Err(e) = result {
                tracing::error!("manifest restore step failed: {e}");
                first_err.get_or_insert(e);
            }
        }

        first_err.map_or(Ok(()), Err)
    }
}

impl Drop for ManifestSwap {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.restore_slots() {
            tracing::warn!("restoring manifests on drop failed: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// run_exclusive
// ---------------------------------------------------------------------------

/// Run `action` with the canonical manifests of `work_dir` moved aside.
///
/// Restoration always runs after the action. The action's own error wins
/// over a restoration error, which is only logged in that case.
pub async fn run_exclusive<F, Fut, T, E>(
    work_dir: &Path,
    token: &SwapToken,
    action: F,
) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<ManifestError> + fmt::Display,
{
    let swap = ManifestSwap::swap_out(work_dir, token)?;
    tracing::debug!(
        "swapped out user manifests: {:?}",
        swap.moved().collect::<Vec<_>>()
    );
    let outcome = action().await;
    let restored = swap.restore();

    match (outcome, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(restore_err)) => Err(restore_err.into()),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(restore_err)) => {
            tracing::error!("restore failed after action error ({err}): {restore_err}");
            Err(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn token() -> SwapToken {
        SwapToken::from_run_id("test")
    }

    #[test]
    fn random_tokens_differ() {
        assert_ne!(SwapToken::random(), SwapToken::random());
    }

    #[test]
    fn backup_path_carries_token() {
        let path = backup_path(Path::new("/w"), "package.json", &token());
        assert_eq!(path, PathBuf::from("/w/package.json.nodeprep-test"));
    }

    #[test]
    fn swap_out_moves_existing_and_records_absent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), "{}").unwrap();

        let swap = ManifestSwap::swap_out(tmp.path(), &token()).unwrap();
        assert!(!tmp.path().join("package.json").exists());
        assert!(backup_path(tmp.path(), "package.json", &token()).exists());
        assert_eq!(swap.moved().collect::<Vec<_>>(), vec!["package.json"]);

        swap.restore().unwrap();
        assert_eq!(fs::read_to_string(tmp.path().join("package.json")).unwrap(), "{}");
    }

    #[test]
    fn drop_without_restore_puts_files_back() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package-lock.json"), "lock").unwrap();
        {
            let _swap = ManifestSwap::swap_out(tmp.path(), &token()).unwrap();
            fs::write(tmp.path().join("package.json"), "synthetic").unwrap();
        }
        assert_eq!(
            fs::read_to_string(tmp.path().join("package-lock.json")).unwrap(),
            "lock"
        );
        assert!(!tmp.path().join("package.json").exists());
    }

    #[test]
    fn vanished_backup_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), "{}").unwrap();
        let swap = ManifestSwap::swap_out(tmp.path(), &token()).unwrap();
        fs::remove_file(backup_path(tmp.path(), "package.json", &token())).unwrap();
        swap.restore().unwrap();
        assert!(!tmp.path().join("package.json").exists());
    }

    #[test]
    #[cfg(unix)]
    fn swap_out_failure_reports_path() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("readonly");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), "{}").unwrap();

        let mut perms = fs::metadata(&dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&dir, perms).unwrap();

        let result = ManifestSwap::swap_out(&dir, &token());

        let mut perms = fs::metadata(&dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&dir, perms).unwrap();

        // Running as root bypasses directory permissions.
        if let Err(err) = result {
            assert!(matches!(err, ManifestError::Io { .. }));
            assert!(err.to_string().contains("package.json"));
        }
        assert_eq!(fs::read_to_string(dir.join("package.json")).unwrap(), "{}");
    }
}
