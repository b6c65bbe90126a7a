//! Directory scanning
//!
//! A scan lists exactly one directory. The directory itself is offered to
//! the printer first, then each child is either pushed back onto the task
//! queue (directories) or offered to the printer directly (everything
//! else). Scans never recurse.

use crate::entry::DirEntry;
use crate::error::{ScanError, ScanOutcome};
use crate::walker::printer::Printer;
use crate::walker::queue::TaskQueue;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Counters shared by all scans of one walk
#[derive(Debug, Default)]
pub struct WalkStats {
    /// Directories listed
    pub dirs_scanned: AtomicU64,

    /// Children seen across all listings
    pub entries_seen: AtomicU64,

    /// Symlinks that were not followed
    pub symlinks_skipped: AtomicU64,

    /// Directories skipped for lack of permission
    pub permission_denied: AtomicU64,

    /// Listings that failed part way
    pub errors: AtomicU64,
}

impl WalkStats {
    fn record_dir(&self) {
        self.dirs_scanned.fetch_add(1, Ordering::Relaxed);
    }

    fn record_entries(&self, count: u64) {
        self.entries_seen.fetch_add(count, Ordering::Relaxed);
    }

    fn record_symlink(&self) {
        self.symlinks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_denied(&self) {
        self.permission_denied.fetch_add(1, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// Lists directories, prints matches and requeues subdirectories
pub struct Scanner {
    printer: Arc<Printer>,
    queue: Arc<TaskQueue>,
    stats: Arc<WalkStats>,
    shutdown: Arc<AtomicBool>,
}

impl Scanner {
    pub fn new(
        printer: Arc<Printer>,
        queue: Arc<TaskQueue>,
        stats: Arc<WalkStats>,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            printer,
            queue,
            stats,
            shutdown,
        }
    }

    /// Scan one directory entry
    pub fn scan(&self, entry: &DirEntry) -> ScanOutcome {
        if self.is_cancelled() {
            return skipped(entry.path(), "walk cancelled");
        }

        if entry.is_symlink() {
            self.stats.record_symlink();
            return skipped(entry.path(), "symbolic link not followed");
        }

        self.printer.consider(entry);

        let listing = match fs::read_dir(entry.path()) {
            Ok(listing) => listing,
            Err(e) => return self.listing_failed(ScanError::from_io(entry.path(), e)),
        };

        self.stats.record_dir();

        let mut entries = 0usize;
        let mut subdirs = 0usize;

        for item in listing {
            if self.is_cancelled() {
                self.stats.record_entries(entries as u64);
                return skipped(entry.path(), "walk cancelled");
            }

            let child = match item.and_then(|item| DirEntry::from_read_dir(&item)) {
                Ok(child) => child,
                Err(e) => {
                    let error = ScanError::from_io(entry.path(), e);
                    if error.is_recoverable() {
                        continue;
                    }
                    // Children pushed so far are still expanded
                    self.stats.record_entries(entries as u64);
                    return self.listing_failed(error);
                }
            };

            entries += 1;

            if child.is_directory() {
                subdirs += 1;
                self.queue.push(child);
            } else {
                self.printer.consider(&child);
            }
        }

        self.stats.record_entries(entries as u64);

        ScanOutcome::Success {
            path: entry.path().to_path_buf(),
            entries,
            subdirs,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    fn listing_failed(&self, error: ScanError) -> ScanOutcome {
        if error.is_recoverable() {
            self.stats.record_denied();
            return ScanOutcome::Skipped {
                path: error.path().clone(),
                reason: error.to_string(),
            };
        }

        self.stats.record_error();
        ScanOutcome::Failed {
            path: error.path().clone(),
            error,
        }
    }
}

fn skipped(path: &Path, reason: &str) -> ScanOutcome {
    ScanOutcome::Skipped {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
