use std::future::Future;

use crate::error::{io_err, RuntimeError};

/// Install the global `tracing` subscriber (`RUST_LOG`, default `info`).
/// Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Drive `future` to completion on a single-threaded runtime, blocking the
/// current thread.
///
/// Phases of a provisioning run never overlap, so one thread is enough; the
/// blocking pool still backs stdout/stderr forwarding.
pub fn run_blocking<F: Future>(future: F) -> Result<F::Output, RuntimeError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    Ok(runtime.block_on(future))
}
