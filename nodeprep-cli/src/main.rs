//! nodeprep — prepare a JavaScript project's dependencies before a test run.
//!
//! # Usage
//!
//! ```text
//! nodeprep prepare --run-cfg <file> [--work-dir <dir>] (--node-bin <path> --npm-cli <path> | --globals)
//!                  [--metrics-dir <dir>] [--timeout-secs N] [--run-id <id>]
//! nodeprep config --run-cfg <file> [--json]
//! nodeprep pre-exec --run-cfg <file> --suite <name> [--timeout-secs N]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigArgs, pre_exec::PreExecArgs, prepare::PrepareArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "nodeprep",
    version,
    about = "Provision npm dependencies for a test run without touching the project's manifests",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configure npm, rebuild an existing node_modules, and install the run's packages.
    Prepare(PrepareArgs),

    /// Print the npm configuration a run config translates to.
    Config(ConfigArgs),

    /// Run a suite's pre-exec commands.
    PreExec(PreExecArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Prepare(args) => args.run(),
        Commands::Config(args) => args.run(),
        Commands::PreExec(args) => args.run(),
    }
}
