//! The main entry point for the `response-fix` command-line application.
//!
//! Parses arguments, sets up logging, runs the patcher and prints the report.
//! Any error aborts the run with a non-zero exit code.

use response_fix::cli::{self, Args};
use response_fix::errors::Result;
use response_fix::patcher;
use response_fix::report::Reporter;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::parse_args();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Resolves settings, patches the files and prints the report.
fn run(args: &Args) -> Result<()> {
    let settings = args.resolve()?;
    let reporter = Reporter::new(args.format);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = patcher::run_patch(&settings, |outcome| {
        reporter.write_file_line(&mut out, outcome, settings.dry_run)
    })?;
    reporter.write_summary(&mut out, &summary)?;

    Ok(())
}

/// Diagnostics go to stderr so stdout stays a clean report. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
