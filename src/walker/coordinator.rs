//! Walk coordinator - orchestrates the parallel directory walk
//!
//! The coordinator is responsible for:
//! - Validating the root path before any work starts
//! - Seeding the task queue and starting the scan workers
//! - Dispatching queued directories until the walk drains
//! - Shutdown handling (Ctrl-C, closed output)
//! - Final statistics and cleanup
//!
//! The dispatch loop runs on the calling thread. It is the only consumer of
//! the task queue; scans run on the worker pool and feed subdirectories back
//! into the queue.

use crate::config::FindConfig;
use crate::entry::DirEntry;
use crate::error::{FindError, Result, UsageError, UsageErrorKind, WorkerError};
use crate::walker::printer::Printer;
use crate::walker::queue::{Next, ScanTicket, TaskQueue};
use crate::walker::scanner::{Scanner, WalkStats};
use crate::walker::worker::ScanWorker;
use crossbeam_channel::{bounded, Sender};
use std::fs;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace};

/// Result of a completed walk
#[derive(Debug)]
pub struct WalkResult {
    /// Directories listed
    pub dirs_scanned: u64,

    /// Entries seen in directory listings
    pub entries_seen: u64,

    /// Lines printed
    pub matched: u64,

    /// Directories whose listing failed part way
    pub errors: u64,

    /// Directories skipped for lack of permission
    pub permission_denied: u64,

    /// Symlinks that were not followed
    pub symlinks_skipped: u64,

    /// Directories pushed onto the task queue
    pub dirs_queued: u64,

    /// Directories handed to a worker
    pub dirs_dispatched: u64,

    /// Times dispatch waited for a free worker
    pub saturated_waits: u64,

    /// Time taken for the walk
    pub duration: Duration,

    /// Whether the walk drained (vs was cancelled)
    pub completed: bool,

    /// The output sink was closed by the reader (e.g. `| head`)
    pub output_closed: bool,
}

/// Coordinates the parallel directory walk
pub struct WalkCoordinator {
    /// Configuration
    config: Arc<FindConfig>,

    /// Pending directories and outstanding scans
    queue: Arc<TaskQueue>,

    /// Filter and output sink
    printer: Arc<Printer>,

    /// Counters shared with the scanners
    stats: Arc<WalkStats>,

    /// Shutdown signal
    shutdown: Arc<AtomicBool>,
}

impl WalkCoordinator {
    /// Create a new walk coordinator writing matches to `sink`
    pub fn new(config: FindConfig, sink: Box<dyn Write + Send>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let printer = Arc::new(Printer::new(
            config.filter.clone(),
            sink,
            Arc::clone(&shutdown),
        ));

        Self {
            config: Arc::new(config),
            queue: Arc::new(TaskQueue::new()),
            printer,
            stats: Arc::new(WalkStats::default()),
            shutdown,
        }
    }

    /// Handle that stops the walk from another thread (for signal handlers)
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            queue: Arc::clone(&self.queue),
        }
    }

    /// Handle for polling progress from another thread
    pub fn progress_probe(&self) -> ProgressProbe {
        ProgressProbe {
            queue: Arc::clone(&self.queue),
            printer: Arc::clone(&self.printer),
            stats: Arc::clone(&self.stats),
            total_workers: self.config.worker_count,
            started: Instant::now(),
        }
    }

    /// Run the walk to completion
    ///
    /// Root path problems are reported before any worker starts. After that
    /// the walk only fails if the worker pool breaks or the output sink
    /// fails for a reason other than the reader going away.
    pub fn run(&self) -> Result<WalkResult> {
        self.config.validate()?;
        let root = self.preflight()?;

        let start_time = Instant::now();
        info!(
            root = %root.path().display(),
            workers = self.config.worker_count,
            filtered = !self.config.filter.is_empty(),
            "Starting directory walk"
        );

        self.queue.push(root);

        // Room for one job per worker, so dispatch never blocks on the channel
        let (job_tx, job_rx) = bounded(self.config.worker_count);
        let scanner = Arc::new(Scanner::new(
            Arc::clone(&self.printer),
            Arc::clone(&self.queue),
            Arc::clone(&self.stats),
            Arc::clone(&self.shutdown),
        ));

        let mut workers = Vec::with_capacity(self.config.worker_count);
        for id in 0..self.config.worker_count {
            match ScanWorker::spawn(id, Arc::clone(&scanner), job_rx.clone()) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    self.shutdown.store(true, Ordering::SeqCst);
                    drop(job_tx);
                    // Join failures are logged inside; the spawn error is the one reported
                    let _ = join_workers(workers);
                    return Err(e.into());
                }
            }
        }
        drop(job_rx);
        debug!(count = workers.len(), "Workers spawned");

        let dispatched = self.dispatch(&job_tx);

        // Workers drain whatever is left in the channel, then exit
        drop(job_tx);
        let join_result = join_workers(workers);

        let completed = dispatched?;
        join_result?;

        let output_closed = self.finish_output()?;
        let duration = start_time.elapsed();

        let result = WalkResult {
            dirs_scanned: self.stats.dirs_scanned.load(Ordering::Relaxed),
            entries_seen: self.stats.entries_seen.load(Ordering::Relaxed),
            matched: self.printer.matched(),
            errors: self.stats.errors.load(Ordering::Relaxed),
            permission_denied: self.stats.permission_denied.load(Ordering::Relaxed),
            symlinks_skipped: self.stats.symlinks_skipped.load(Ordering::Relaxed),
            dirs_queued: self.queue.stats().enqueued(),
            dirs_dispatched: self.queue.stats().dispatched(),
            saturated_waits: self.queue.stats().saturated_waits(),
            duration,
            completed: completed && !output_closed,
            output_closed,
        };

        info!(
            dirs = result.dirs_scanned,
            matched = result.matched,
            errors = result.errors,
            duration_ms = duration.as_millis() as u64,
            completed = result.completed,
            "Walk finished"
        );

        Ok(result)
    }

    /// Validate the root path and turn it into the first queue entry
    fn preflight(&self) -> Result<DirEntry> {
        let root = self
            .config
            .root
            .as_deref()
            .ok_or_else(|| UsageError::new(UsageErrorKind::PathMissing))?;

        let metadata = fs::metadata(root).map_err(|e| {
            debug!(root = %root.display(), error = %e, "Root not accessible");
            UsageError::new(UsageErrorKind::PathNotFound)
        })?;

        if !metadata.is_dir() {
            return Err(UsageError::new(UsageErrorKind::PathNotDirectory).into());
        }

        DirEntry::from_path(root).map_err(|e| {
            debug!(root = %root.display(), error = %e, "Root vanished during pre-flight");
            FindError::from(UsageError::new(UsageErrorKind::PathNotFound))
        })
    }

    /// Hand queued directories to the workers until the walk drains
    ///
    /// Returns `Ok(true)` once the queue is empty with no scan outstanding,
    /// `Ok(false)` if shutdown was requested first.
    fn dispatch(&self, job_tx: &Sender<ScanTicket>) -> Result<bool> {
        loop {
            match self.queue.pop_or_wait(self.config.worker_count, &self.shutdown) {
                Next::Entry(ticket) => {
                    trace!(path = %ticket.entry().path().display(), "Dispatching directory");
                    // A failed send hands the ticket back and drops it, releasing the slot
                    job_tx.send(ticket).map_err(|_| {
                        self.shutdown.store(true, Ordering::SeqCst);
                        WorkerError::ChannelClosed
                    })?;
                }
                Next::Drained => {
                    debug!("Task queue drained");
                    return Ok(true);
                }
                Next::Cancelled => {
                    info!("Shutdown signal received");
                    return Ok(false);
                }
            }
        }
    }

    /// Flush the sink; returns true if the reader closed the output
    fn finish_output(&self) -> Result<bool> {
        if let Err(e) = self.printer.flush() {
            debug!(error = %e, "Flush failed");
        }

        match self.printer.take_error() {
            None => Ok(false),
            Some(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(true),
            Some(e) => Err(FindError::Io(e)),
        }
    }
}

/// Stops a running walk
///
/// Sets the shared shutdown flag and wakes the dispatcher so it does not
/// sit out the rest of its poll interval.
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    queue: Arc<TaskQueue>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.queue.nudge();
    }
}

/// Join all worker threads, reporting the first panic
fn join_workers(workers: Vec<ScanWorker>) -> std::result::Result<(), WorkerError> {
    let mut first_error = None;

    for worker in workers {
        if let Err(e) = worker.join() {
            error!(error = %e, "Worker failed to join cleanly");
            first_error.get_or_insert(e);
        }
    }

    first_error.map_or(Ok(()), Err)
}

/// Progress information for display
#[derive(Debug, Clone)]
pub struct WalkProgress {
    /// Directories listed
    pub dirs: u64,

    /// Entries seen
    pub entries: u64,

    /// Lines printed
    pub matched: u64,

    /// Directories waiting in the queue
    pub queue_size: usize,

    /// Scans in flight
    pub active_scans: usize,

    /// Worker pool size
    pub total_workers: usize,

    /// Listing failures
    pub errors: u64,

    /// Elapsed time
    pub elapsed: Duration,
}

impl WalkProgress {
    /// Entries seen per second
    pub fn entries_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.entries as f64 / secs
        } else {
            0.0
        }
    }

    /// Directories listed per second
    pub fn dirs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.dirs as f64 / secs
        } else {
            0.0
        }
    }
}

/// Read-only view of a running walk
#[derive(Clone)]
pub struct ProgressProbe {
    queue: Arc<TaskQueue>,
    printer: Arc<Printer>,
    stats: Arc<WalkStats>,
    total_workers: usize,
    started: Instant,
}

impl ProgressProbe {
    /// Take a snapshot
    pub fn snapshot(&self) -> WalkProgress {
        WalkProgress {
            dirs: self.stats.dirs_scanned.load(Ordering::Relaxed),
            entries: self.stats.entries_seen.load(Ordering::Relaxed),
            matched: self.printer.matched(),
            queue_size: self.queue.len(),
            active_scans: self.queue.outstanding(),
            total_workers: self.total_workers,
            errors: self.stats.errors.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }
}

/// Walk `config.root`, writing matches to `sink`
pub fn run_walk(config: FindConfig, sink: Box<dyn Write + Send>) -> Result<WalkResult> {
    WalkCoordinator::new(config, sink).run()
}
