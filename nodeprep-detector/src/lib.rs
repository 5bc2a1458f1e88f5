//! Pre-existing dependency tree detection for `nodeprep-detector`.
//!
//! `detect_dependency_tree(run_cfg, host)` decides whether the project that
//! owns a run configuration already ships a `node_modules` directory, in
//! which case native modules must be rebuilt for the current host.
//!
//! Assumption: the run configuration sits at the root of the project, so
//! `node_modules` is looked up as its sibling.

use std::path::{Path, PathBuf};

use nodeprep_core::{HostEnv, RunConfig};

/// Name of the dependency tree directory.
pub const NODE_MODULES: &str = "node_modules";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Outcome of dependency tree detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyTree {
    /// No `node_modules` directory next to the manifest.
    Absent,
    /// A `node_modules` directory exists; `project_dir` needs a rebuild.
    Present { project_dir: PathBuf },
    /// The manifest lives in the runner's home directory inside a container,
    /// so any `node_modules` there belongs to the runner, not the user.
    RunnerHome,
}

impl DependencyTree {
    pub fn needs_rebuild(&self) -> bool {
        matches!(self, DependencyTree::Present { .. })
    }

    /// Project directory to rebuild, if any.
    pub fn project_dir(&self) -> Option<&Path> {
        match self {
            DependencyTree::Present { project_dir } => Some(project_dir),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Detect a pre-existing dependency tree for the project owning `run_cfg`.
pub fn detect_dependency_tree(run_cfg: &RunConfig, host: &HostEnv) -> DependencyTree {
    detect_in(&run_cfg.project_dir(), host)
}

/// Detect a pre-existing dependency tree in `project_dir`.
pub fn detect_in(project_dir: &Path, host: &HostEnv) -> DependencyTree {
    if is_runner_home(project_dir, host) {
        tracing::debug!(
            project_dir = %project_dir.display(),
            "manifest is in the runner home; ignoring its node_modules"
        );
        return DependencyTree::RunnerHome;
    }

    let exists = project_dir.join(NODE_MODULES).is_dir();
    if exists {
        DependencyTree::Present {
            project_dir: project_dir.to_path_buf(),
        }
    } else {
        DependencyTree::Absent
    }
}

// ---------------------------------------------------------------------------
// Utilities
// ---------------------------------------------------------------------------

fn is_runner_home(project_dir: &Path, host: &HostEnv) -> bool {
    if host.in_managed_vm {
        return false;
    }
    host.home.as_deref() == Some(project_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managed_vm_never_counts_as_runner_home() {
        let host = HostEnv {
            home: Some(PathBuf::from("/home/seluser")),
            in_managed_vm: true,
            ..HostEnv::default()
        };
        assert!(!is_runner_home(Path::new("/home/seluser"), &host));
    }

    #[test]
    fn trailing_separator_still_matches_home() {
        let host = HostEnv {
            home: Some(PathBuf::from("/home/seluser/")),
            ..HostEnv::default()
        };
        assert!(is_runner_home(Path::new("/home/seluser"), &host));
    }

    #[test]
    fn unknown_home_is_never_runner_home() {
        assert!(!is_runner_home(Path::new("/"), &HostEnv::default()));
    }
}
