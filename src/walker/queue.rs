//! Task queue shared by the dispatcher and the scan workers
//!
//! One mutex guards both the pending directories and the count of scans in
//! flight, and one condition variable is signalled on every push and every
//! scan completion. Holding both under the same lock is what makes the
//! termination check exact: the dispatcher only sees "queue empty and no
//! scan outstanding" when no running scan can still push a child.

use crate::entry::DirEntry;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long the dispatcher sleeps between checks of the shutdown flag
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Statistics for the task queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total directories enqueued
    pub enqueued: AtomicU64,

    /// Total directories handed to a scanner
    pub dispatched: AtomicU64,

    /// Times the dispatcher waited because every worker was busy
    pub saturated_waits: AtomicU64,
}

impl QueueStats {
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn saturated_waits(&self) -> u64 {
        self.saturated_waits.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<DirEntry>,
    outstanding: usize,
}

/// What the dispatcher should do next
#[derive(Debug)]
pub enum Next {
    /// A directory to scan; dropping the ticket marks the scan finished
    Entry(ScanTicket),
    /// Queue empty and nothing in flight
    Drained,
    /// Shutdown was requested
    Cancelled,
}

/// Pending directories plus outstanding-scan bookkeeping
#[derive(Debug, Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    wake: Condvar,
    stats: QueueStats,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directory and wake the dispatcher
    pub fn push(&self, entry: DirEntry) {
        let mut state = self.state.lock();
        state.pending.push_back(entry);
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        self.wake.notify_one();
    }

    /// Block until a directory can be dispatched or the walk is over
    ///
    /// A directory is handed out only while fewer than `max_outstanding`
    /// scans are in flight. Returns [`Next::Drained`] once the queue is
    /// empty and every outstanding scan has finished.
    pub fn pop_or_wait(self: &Arc<Self>, max_outstanding: usize, shutdown: &AtomicBool) -> Next {
        let max_outstanding = max_outstanding.max(1);
        let mut state = self.state.lock();

        loop {
            if shutdown.load(Ordering::Relaxed) {
                return Next::Cancelled;
            }

            if state.pending.is_empty() {
                if state.outstanding == 0 {
                    return Next::Drained;
                }
            } else if state.outstanding < max_outstanding {
                if let Some(entry) = state.pending.pop_front() {
                    state.outstanding += 1;
                    self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
                    return Next::Entry(ScanTicket {
                        entry,
                        queue: Arc::clone(self),
                    });
                }
            } else {
                self.stats.saturated_waits.fetch_add(1, Ordering::Relaxed);
            }

            // Timed so the shutdown flag is noticed without a notify
            self.wake.wait_for(&mut state, POLL_INTERVAL);
        }
    }

    /// Record the end of one scan and wake the dispatcher
    fn complete(&self) {
        let mut state = self.state.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        self.wake.notify_all();
    }

    /// Wake the dispatcher without changing state (e.g. after a shutdown request)
    pub fn nudge(&self) {
        let _state = self.state.lock();
        self.wake.notify_all();
    }

    /// Number of directories waiting to be scanned
    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().pending.is_empty()
    }

    /// Number of scans in flight
    pub fn outstanding(&self) -> usize {
        self.state.lock().outstanding
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}

/// A dispatched directory
///
/// The scan counts as outstanding until the ticket is dropped, including
/// when a worker panics mid-scan or the job never reaches a worker.
#[derive(Debug)]
pub struct ScanTicket {
    entry: DirEntry,
    queue: Arc<TaskQueue>,
}

impl ScanTicket {
    pub fn entry(&self) -> &DirEntry {
        &self.entry
    }
}

impl Drop for ScanTicket {
    fn drop(&mut self) {
        self.queue.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryType;
    use std::thread;

    fn dir(path: &str) -> DirEntry {
        DirEntry::new(path, EntryType::Directory, false)
    }

    #[test]
    fn test_queue_basic() {
        let queue = Arc::new(TaskQueue::new());
        let shutdown = AtomicBool::new(false);

        queue.push(dir("/test"));
        assert!(!queue.is_empty());
        assert_eq!(queue.len(), 1);

        match queue.pop_or_wait(4, &shutdown) {
            Next::Entry(ticket) => assert_eq!(ticket.entry().path().to_str(), Some("/test")),
            other => panic!("expected entry, got {:?}", other),
        }
    }

    #[test]
    fn test_fifo_order() {
        let queue = Arc::new(TaskQueue::new());
        let shutdown = AtomicBool::new(false);
        queue.push(dir("/a"));
        queue.push(dir("/b"));

        let mut seen = Vec::new();
        let mut tickets = Vec::new();
        for _ in 0..2 {
            if let Next::Entry(ticket) = queue.pop_or_wait(4, &shutdown) {
                seen.push(ticket.entry().path().to_path_buf());
                tickets.push(ticket);
            }
        }
        assert_eq!(seen, vec![std::path::PathBuf::from("/a"), std::path::PathBuf::from("/b")]);
    }

    #[test]
    fn test_queue_completion() {
        let queue = Arc::new(TaskQueue::new());
        let shutdown = AtomicBool::new(false);

        // Empty queue with nothing in flight = drained
        assert!(matches!(queue.pop_or_wait(1, &shutdown), Next::Drained));

        queue.push(dir("/test"));

        let ticket = match queue.pop_or_wait(1, &shutdown) {
            Next::Entry(ticket) => ticket,
            other => panic!("expected entry, got {:?}", other),
        };

        // Queue empty but scan outstanding
        assert!(queue.is_empty());
        assert_eq!(queue.outstanding(), 1);

        drop(ticket);

        assert_eq!(queue.outstanding(), 0);
        assert!(matches!(queue.pop_or_wait(1, &shutdown), Next::Drained));
    }

    #[test]
    fn test_waits_for_outstanding_scan() {
        let queue = Arc::new(TaskQueue::new());
        let shutdown = AtomicBool::new(false);
        queue.push(dir("/root"));

        let ticket = match queue.pop_or_wait(1, &shutdown) {
            Next::Entry(ticket) => ticket,
            other => panic!("expected entry, got {:?}", other),
        };

        // A "scanner" pushes a child and then finishes
        let q = Arc::clone(&queue);
        let scanner = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            q.push(dir("/root/child"));
            drop(ticket);
        });

        match queue.pop_or_wait(1, &shutdown) {
            Next::Entry(child) => assert_eq!(child.entry().path().to_str(), Some("/root/child")),
            other => panic!("expected child entry, got {:?}", other),
        }
        scanner.join().unwrap();

        assert!(matches!(queue.pop_or_wait(1, &shutdown), Next::Drained));
        assert_eq!(queue.stats().enqueued(), 2);
        assert_eq!(queue.stats().dispatched(), 2);
    }

    #[test]
    fn test_respects_outstanding_limit() {
        let queue = Arc::new(TaskQueue::new());
        let shutdown = AtomicBool::new(false);
        queue.push(dir("/a"));
        queue.push(dir("/b"));

        let first = match queue.pop_or_wait(1, &shutdown) {
            Next::Entry(ticket) => ticket,
            other => panic!("expected entry, got {:?}", other),
        };

        let release = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            drop(first);
        });

        // Blocks until the first scan completes
        let second = queue.pop_or_wait(1, &shutdown);
        assert!(matches!(second, Next::Entry(_)));
        assert!(queue.stats().saturated_waits() >= 1);
        release.join().unwrap();
    }

    #[test]
    fn test_nudge_wakes_waiting_dispatcher() {
        let queue = Arc::new(TaskQueue::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        queue.push(dir("/busy"));

        // Keep one scan outstanding so the dispatcher has to wait
        let ticket = match queue.pop_or_wait(1, &shutdown) {
            Next::Entry(ticket) => ticket,
            other => panic!("expected entry, got {:?}", other),
        };

        let q = Arc::clone(&queue);
        let flag = Arc::clone(&shutdown);
        let dispatcher = thread::spawn(move || q.pop_or_wait(1, &flag));

        thread::sleep(Duration::from_millis(20));
        shutdown.store(true, Ordering::SeqCst);
        queue.nudge();

        assert!(matches!(dispatcher.join().unwrap(), Next::Cancelled));
        drop(ticket);
    }

    #[test]
    fn test_cancellation() {
        let queue = Arc::new(TaskQueue::new());
        let shutdown = AtomicBool::new(true);
        queue.push(dir("/a"));
        assert!(matches!(queue.pop_or_wait(4, &shutdown), Next::Cancelled));
        // Pending work is left untouched
        assert_eq!(queue.len(), 1);
    }
}
