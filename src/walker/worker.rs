//! Scan worker threads
//!
//! Each worker:
//! - Receives dispatched directories from the job channel
//! - Runs one scan per directory
//! - Drops the ticket when done, which tells the dispatcher the scan is over
//!
//! Workers exit when the dispatcher drops the sending side of the channel.

use crate::error::{ScanOutcome, WorkerError};
use crate::walker::queue::ScanTicket;
use crate::walker::scanner::Scanner;
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// A worker thread that processes dispatched directories
pub struct ScanWorker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<u64>>,
}

impl ScanWorker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        scanner: Arc<Scanner>,
        jobs: Receiver<ScanTicket>,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("scan-{}", id))
            .spawn(move || worker_loop(id, &scanner, jobs))
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Wait for the worker to finish, returning how many directories it scanned
    pub fn join(mut self) -> Result<u64, WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|payload| WorkerError::Panicked {
                id: self.id,
                message: panic_message(payload.as_ref()),
            }),
            None => Ok(0),
        }
    }
}

/// Main worker loop
fn worker_loop(id: usize, scanner: &Scanner, jobs: Receiver<ScanTicket>) -> u64 {
    debug!(worker = id, "Worker starting");
    let mut scans = 0u64;

    for ticket in jobs.iter() {
        let outcome = scanner.scan(ticket.entry());
        scans += 1;

        match &outcome {
            ScanOutcome::Success { path, entries, subdirs } => {
                trace!(worker = id, path = %path.display(), entries, subdirs, "Directory scanned");
            }
            ScanOutcome::Skipped { path, reason } => {
                trace!(worker = id, path = %path.display(), reason = %reason, "Directory skipped");
            }
            ScanOutcome::Failed { path, error } => {
                warn!(worker = id, path = %path.display(), error = %error, "Directory failed");
            }
        }

        // Marks the scan finished only after every child has been queued
        drop(ticket);
    }

    debug!(worker = id, scans, "Worker shutting down");
    scans
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Worker thread panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::DirEntry;
    use crate::filter::FilterSpec;
    use crate::walker::printer::Printer;
    use crate::walker::queue::{Next, TaskQueue};
    use crate::walker::scanner::WalkStats;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_worker_scans_and_exits_on_disconnect() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let shutdown = Arc::new(AtomicBool::new(false));
        let queue = Arc::new(TaskQueue::new());
        let printer = Arc::new(Printer::new(
            FilterSpec::any(),
            Box::new(std::io::sink()),
            Arc::clone(&shutdown),
        ));
        let scanner = Arc::new(Scanner::new(
            printer,
            Arc::clone(&queue),
            Arc::new(WalkStats::default()),
            Arc::clone(&shutdown),
        ));

        let (tx, rx) = crossbeam_channel::bounded(1);
        let worker = ScanWorker::spawn(0, scanner, rx).unwrap();

        queue.push(DirEntry::from_path(dir.path()).unwrap());
        match queue.pop_or_wait(1, &shutdown) {
            Next::Entry(ticket) => tx.send(ticket).unwrap(),
            other => panic!("expected entry, got {:?}", other),
        }

        // The worker queues "sub" and releases the root ticket
        match queue.pop_or_wait(1, &shutdown) {
            Next::Entry(ticket) => {
                assert_eq!(ticket.entry().path(), dir.path().join("sub"));
                tx.send(ticket).unwrap();
            }
            other => panic!("expected entry, got {:?}", other),
        }
        assert!(matches!(queue.pop_or_wait(1, &shutdown), Next::Drained));

        drop(tx);
        assert_eq!(worker.join().unwrap(), 2);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
