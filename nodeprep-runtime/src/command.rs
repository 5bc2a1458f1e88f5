//! Pure command construction.
//!
//! Every invocation is built as a program plus an argument vector. Package
//! names and `key=value` pairs from the run configuration are passed as
//! separate argv entries without escaping; only a shell would reinterpret
//! them, and a shell is used only where the platform requires one.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use nodeprep_core::NodeContext;

/// Package-manager binary resolved from `PATH` in globals mode.
pub const NPM_BIN: &str = "npm";

/// Package-manager subcommands the orchestrator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subcommand {
    Config,
    Rebuild,
    Install,
}

impl Subcommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subcommand::Config => "config",
            Subcommand::Rebuild => "rebuild",
            Subcommand::Install => "install",
        }
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A program and its arguments, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    /// Command for `subcommand args...` under `node`.
    ///
    /// - explicit: `<nodePath> <npmPath> <subcommand> <args...>`
    /// - globals: `npm <subcommand> <args...>`, wrapped in `cmd /C` on
    ///   Windows where `npm` is a batch script.
    pub fn for_invocation(node: &NodeContext, subcommand: Subcommand, args: &[String]) -> Self {
        let tail = std::iter::once(OsString::from(subcommand.as_str()))
            .chain(args.iter().map(OsString::from));

        if !node.use_globals {
            return Self {
                program: node.node_path.clone(),
                args: std::iter::once(node.npm_path.clone().into_os_string())
                    .chain(tail)
                    .collect(),
            };
        }

        if cfg!(windows) {
            Self {
                program: PathBuf::from("cmd"),
                args: [OsString::from("/C"), OsString::from(NPM_BIN)]
                    .into_iter()
                    .chain(tail)
                    .collect(),
            }
        } else {
            Self {
                program: PathBuf::from(NPM_BIN),
                args: tail.collect(),
            }
        }
    }

    /// `sh -c <command>` (`cmd /C <command>` on Windows) for user-supplied
    /// shell command lines.
    pub fn shell(command: &str) -> Self {
        let (program, flag) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };
        Self {
            program: PathBuf::from(program),
            args: vec![OsString::from(flag), OsString::from(command)],
        }
    }

    /// Program name for log lines and error messages.
    pub fn display_program(&self) -> String {
        self.program.display().to_string()
    }
}

/// Arguments for `rebuild`, scoped to `project_dir` when known.
pub fn rebuild_args(project_dir: Option<&std::path::Path>) -> Vec<String> {
    match project_dir {
        Some(dir) => vec!["--prefix".to_string(), dir.display().to_string()],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn strings(spec: &CommandSpec) -> Vec<String> {
        spec.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn explicit_mode_runs_script_through_interpreter() {
        let node = NodeContext::explicit("/usr/bin/node", "/opt/npm/bin/npm-cli.js");
        let spec = CommandSpec::for_invocation(
            &node,
            Subcommand::Install,
            &["left-pad@1.3.0".to_string()],
        );
        assert_eq!(spec.program, PathBuf::from("/usr/bin/node"));
        assert_eq!(
            strings(&spec),
            vec!["/opt/npm/bin/npm-cli.js", "install", "left-pad@1.3.0"]
        );
    }

    #[test]
    #[cfg(not(windows))]
    fn globals_mode_runs_npm_without_shell() {
        let spec = CommandSpec::for_invocation(
            &NodeContext::globals(),
            Subcommand::Config,
            &["set".to_string(), "fund=false".to_string()],
        );
        assert_eq!(spec.program, PathBuf::from("npm"));
        assert_eq!(strings(&spec), vec!["config", "set", "fund=false"]);
    }

    #[test]
    fn hostile_package_names_stay_single_arguments() {
        let spec = CommandSpec::for_invocation(
            &NodeContext::explicit("node", "npm-cli.js"),
            Subcommand::Install,
            &["x; rm -rf /".to_string()],
        );
        assert_eq!(spec.args.len(), 3);
        assert_eq!(spec.args[2], OsString::from("x; rm -rf /"));
    }

    #[test]
    fn rebuild_is_scoped_with_prefix() {
        assert_eq!(
            rebuild_args(Some(Path::new("/work/project"))),
            vec!["--prefix", "/work/project"]
        );
        assert!(rebuild_args(None).is_empty());
    }

    #[test]
    fn subcommand_names() {
        assert_eq!(Subcommand::Config.to_string(), "config");
        assert_eq!(Subcommand::Rebuild.to_string(), "rebuild");
        assert_eq!(Subcommand::Install.to_string(), "install");
    }
}
