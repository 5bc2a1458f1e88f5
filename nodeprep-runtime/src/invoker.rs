//! Package-manager subprocess invocation.
//!
//! The child's stdout and stderr are forwarded to ours by background tasks
//! while we wait for it, so a chatty child never blocks on a full pipe. The
//! call resolves when the child exits, not when its pipes close. The raw
//! exit code is returned; `None` means the child was killed by a signal.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;

use nodeprep_core::NodeContext;

use crate::command::{CommandSpec, Subcommand};
use crate::error::RuntimeError;

/// Something that can run package-manager subcommands.
#[allow(async_fn_in_trait)]
pub trait PackageManager {
    /// Run `subcommand args...` and report the exit code. Spawn failures are
    /// errors; non-zero exits are not.
    async fn invoke(&self, subcommand: Subcommand, args: &[String])
        -> Result<Option<i32>, RuntimeError>;
}

/// Runs the real package-manager binary described by a [`NodeContext`].
#[derive(Debug, Clone)]
pub struct PackageManagerInvoker {
    node: NodeContext,
    work_dir: PathBuf,
}

impl PackageManagerInvoker {
    /// Invoker whose children start in `work_dir`.
    pub fn new(node: NodeContext, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            node,
            work_dir: work_dir.into(),
        }
    }
}

impl PackageManager for PackageManagerInvoker {
    async fn invoke(
        &self,
        subcommand: Subcommand,
        args: &[String],
    ) -> Result<Option<i32>, RuntimeError> {
        let spec = CommandSpec::for_invocation(&self.node, subcommand, args);
        tracing::debug!(
            program = %spec.display_program(),
            subcommand = %subcommand,
            args = args.len(),
            "invoking package manager"
        );
        run_streaming(&spec, &self.work_dir).await
    }
}

/// How long output forwarding may continue after the child has exited.
///
/// A background grandchild that inherited the pipes can keep them open
/// indefinitely; forwarding is abandoned once this elapses.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Spawn `spec` in `work_dir`, forward its output, and wait for it to exit.
///
/// The child is killed if this future is dropped before it exits.
pub(crate) async fn run_streaming(
    spec: &CommandSpec,
    work_dir: &Path,
) -> Result<Option<i32>, RuntimeError> {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .current_dir(work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| RuntimeError::Spawn {
        program: spec.display_program(),
        source,
    })?;

    let forwarders = [
        child
            .stdout
            .take()
            .map(|out| tokio::spawn(forward(out, tokio::io::stdout()))),
        child
            .stderr
            .take()
            .map(|err| tokio::spawn(forward(err, tokio::io::stderr()))),
    ];

    let wait_result = child.wait().await;

    for handle in forwarders.into_iter().flatten() {
        let abort = handle.abort_handle();
        if tokio::time::timeout(OUTPUT_DRAIN_GRACE, handle).await.is_err() {
            abort.abort();
            tracing::debug!(
                program = %spec.display_program(),
                "output still open after exit; no longer forwarding"
            );
        }
    }

    let status = wait_result.map_err(|source| RuntimeError::Wait {
        program: spec.display_program(),
        source,
    })?;
    Ok(status.code())
}

async fn forward<R, W>(mut from: R, mut to: W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    tokio::io::copy(&mut from, &mut to).await.ok();
    to.flush().await.ok();
}
