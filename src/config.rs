//! Configuration types for parfind
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//!
//! Tuning flags (`--jobs`, `--progress`, ...) are handled by clap. The
//! find-style part of the command line (`PATH -type f -name GLOB`) is
//! collected verbatim and handed to [`crate::expression::parse`].

use crate::error::{ConfigError, FindError};
use crate::expression;
use crate::filter::FilterSpec;
use clap::Parser;
use std::path::PathBuf;

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 512;

/// Parallel find: print entries of a directory tree matching a filter
#[derive(Parser, Debug, Clone)]
#[command(
    name = "parfind",
    version,
    about = "Parallel find: print entries of a directory tree matching a filter",
    long_about = "Walks a directory tree with a pool of scan workers and prints every entry \
                  matching the given filters, one path per line.\n\n\
                  Symbolic links are never followed. Unreadable directories are skipped silently.",
    after_help = "EXPRESSION:\n    \
        -type d|f       only directories (d) or regular files (f)\n    \
        -name GLOB      base name matches GLOB ('*' any run, '?' one character)\n    \
        -iname GLOB     like -name, case-insensitive\n\n\
        EXAMPLES:\n    \
        parfind /srv/data\n    \
        parfind src -type f -name '*.rs'\n    \
        parfind -j 32 --stats /home -iname 'readme*'"
)]
pub struct CliArgs {
    /// Number of directories scanned in parallel
    #[arg(
        short = 'j',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub jobs: usize,

    /// Show a progress spinner on stderr
    #[arg(short = 'P', long)]
    pub progress: bool,

    /// Print a summary on stderr when the walk ends
    #[arg(long)]
    pub stats: bool,

    /// Verbose logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Root directory followed by the filter expression
    #[arg(
        value_name = "ARGS",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub expression: Vec<String>,
}

fn default_workers() -> usize {
    // Directory listing is I/O bound
    (num_cpus::get() * 2).min(MAX_WORKERS)
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct FindConfig {
    /// Root directory; `None` is reported as a missing path when the walk starts
    pub root: Option<PathBuf>,

    /// Entry filter
    pub filter: FilterSpec,

    /// Maximum concurrent directory scans
    pub worker_count: usize,

    /// Show progress indicator
    pub show_progress: bool,

    /// Print summary after the walk
    pub show_stats: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl FindConfig {
    /// Configuration for walking `root` with `filter` and default tuning
    pub fn new(root: impl Into<PathBuf>, filter: FilterSpec) -> Self {
        Self {
            root: Some(root.into()),
            filter,
            worker_count: default_workers(),
            show_progress: false,
            show_stats: false,
            verbose: false,
        }
    }

    /// Set the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, FindError> {
        let expr = expression::parse(&args.expression[..])?;

        validate_workers(args.jobs)?;

        Ok(Self {
            root: expr.root,
            filter: expr.filter,
            worker_count: args.jobs,
            show_progress: args.progress,
            show_stats: args.stats,
            verbose: args.verbose,
        })
    }

    /// Check tuning values
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_workers(self.worker_count)
    }
}

fn validate_workers(count: usize) -> Result<(), ConfigError> {
    if count == 0 || count > MAX_WORKERS {
        return Err(ConfigError::InvalidWorkerCount {
            count,
            max: MAX_WORKERS,
        });
    }
    Ok(())
}
