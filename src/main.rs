//! parfind - parallel find
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use parfind::config::{CliArgs, FindConfig};
use parfind::error::FindError;
use parfind::progress::{print_summary, ProgressReporter};
use parfind::walker::{WalkCoordinator, WalkResult, POLL_INTERVAL};
use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status after Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

/// Exit status for malformed options, distinct from the usage error kinds
const EXIT_BAD_OPTION: u8 = 10;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            let code = e
                .downcast_ref::<FindError>()
                .map_or(1, FindError::exit_code);
            eprintln!("ERROR: {:#}", e);
            ExitCode::from(code)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_BAD_OPTION),
            };
            e.print().context("Failed to print usage")?;
            return Ok(code);
        }
    };

    setup_logging(args.verbose);

    let config = FindConfig::from_args(args)?;

    let sink = Box::new(BufWriter::new(io::stdout()));
    let coordinator = WalkCoordinator::new(config.clone(), sink);

    // Setup signal handler for graceful shutdown
    let shutdown = coordinator.shutdown_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        shutdown.trigger();
    })
    .context("Failed to set signal handler")?;

    let progress = config.show_progress.then(|| {
        let reporter = Arc::new(ProgressReporter::new());
        reporter.set_status("Starting walk...");
        reporter
    });

    let done = Arc::new(AtomicBool::new(false));
    let progress_thread = progress.as_ref().map(|reporter| {
        let reporter = Arc::clone(reporter);
        let probe = coordinator.progress_probe();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                reporter.update(&probe.snapshot());
                thread::sleep(POLL_INTERVAL);
            }
        })
    });

    let result = coordinator.run();

    done.store(true, Ordering::Relaxed);
    if let Some(handle) = progress_thread {
        let _ = handle.join();
    }

    let result = result?;

    if let Some(reporter) = &progress {
        if result.completed || result.output_closed {
            reporter.finish_and_clear();
        } else {
            reporter.finish("Walk interrupted");
        }
    }

    if config.show_stats {
        print_summary(&result);
    }

    Ok(exit_code_for(&result))
}

fn exit_code_for(result: &WalkResult) -> ExitCode {
    if result.completed {
        return ExitCode::SUCCESS;
    }

    if result.output_closed {
        debug!("Output closed by reader");
        return ExitCode::SUCCESS;
    }

    info!("Walk was interrupted before completion");
    ExitCode::from(EXIT_INTERRUPTED)
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "parfind=debug" } else { "parfind=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
