//! Suite pre-exec commands.
//!
//! Each command is a shell string run through the platform shell, one after
//! another, with output streamed. The whole sequence shares one deadline.

use std::path::Path;
use std::time::Duration;

use nodeprep_core::Suite;

use crate::command::CommandSpec;
use crate::invoker::run_streaming;

/// Run `suite`'s pre-exec commands in `work_dir`.
///
/// Returns `true` when there are none or all of them exit 0. Stops at the
/// first failure. A command that cannot be started counts as a failure.
pub async fn run_pre_exec(suite: &Suite, limit: Duration, work_dir: &Path) -> bool {
    let Some(commands) = suite.pre_exec.as_deref() else {
        return true;
    };

    match tokio::time::timeout(limit, run_sequence(commands, work_dir)).await {
        Ok(passed) => passed,
        Err(_) => {
            tracing::error!("Pre-Exec timed out after {} seconds", limit.as_secs());
            false
        }
    }
}

async fn run_sequence(commands: &[String], work_dir: &Path) -> bool {
    for command in commands {
        tracing::info!(command = %command, "executing pre-exec command");
        let code = match run_streaming(&CommandSpec::shell(command), work_dir).await {
            Ok(code) => code,
            Err(e) => {
                tracing::error!("unable to start command: {e}");
                Some(1)
            }
        };
        if code != Some(0) {
            tracing::error!(command = %command, code = ?code, "pre-exec command failed");
            return false;
        }
    }
    true
}
