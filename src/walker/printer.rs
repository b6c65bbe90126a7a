//! Serialized output of matching entries
//!
//! Every matching path is written as one line while holding the sink lock,
//! so lines from different workers never interleave. The lock is taken per
//! line and never held across filesystem work.

use crate::entry::DirEntry;
use crate::filter::FilterSpec;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Applies the filter to entries and writes matches to the output sink
pub struct Printer {
    filter: FilterSpec,
    sink: Mutex<Box<dyn Write + Send>>,
    matched: AtomicU64,

    /// Set once the sink has failed; further matches are dropped
    failed: AtomicBool,
    error: Mutex<Option<io::Error>>,

    /// Raised on sink failure so the walk stops early
    shutdown: Arc<AtomicBool>,
}

impl Printer {
    pub fn new(filter: FilterSpec, sink: Box<dyn Write + Send>, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            filter,
            sink: Mutex::new(sink),
            matched: AtomicU64::new(0),
            failed: AtomicBool::new(false),
            error: Mutex::new(None),
            shutdown,
        }
    }

    /// Print `entry` if it passes the filter
    ///
    /// Returns true if a line was written.
    pub fn consider(&self, entry: &DirEntry) -> bool {
        if !self.filter.matches(entry) || self.failed.load(Ordering::Relaxed) {
            return false;
        }

        let result = {
            let mut sink = self.sink.lock();
            write_line(&mut **sink, entry.path())
        };

        match result {
            Ok(()) => {
                self.matched.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    /// Flush buffered output
    pub fn flush(&self) -> io::Result<()> {
        if self.failed.load(Ordering::Relaxed) {
            return Ok(());
        }
        let result = self.sink.lock().flush();
        if let Err(e) = result {
            let kind = e.kind();
            self.fail(e);
            return Err(io::Error::from(kind));
        }
        Ok(())
    }

    /// Number of lines written
    pub fn matched(&self) -> u64 {
        self.matched.load(Ordering::Relaxed)
    }

    /// Take the first sink error, if any
    pub fn take_error(&self) -> Option<io::Error> {
        self.error.lock().take()
    }

    fn fail(&self, err: io::Error) {
        if self.failed.swap(true, Ordering::SeqCst) {
            return;
        }

        if err.kind() == io::ErrorKind::BrokenPipe {
            debug!("Output closed, stopping walk");
        } else {
            warn!(error = %err, "Failed to write output, stopping walk");
        }

        *self.error.lock() = Some(err);
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

#[cfg(unix)]
fn write_line(sink: &mut dyn Write, path: &Path) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;

    sink.write_all(path.as_os_str().as_bytes())?;
    sink.write_all(b"\n")
}

#[cfg(not(unix))]
fn write_line(sink: &mut dyn Write, path: &Path) -> io::Result<()> {
    writeln!(sink, "{}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryType;
    use std::thread;

    /// Sink that keeps its bytes reachable after being boxed
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn lines(&self) -> Vec<String> {
            String::from_utf8(self.0.lock().clone())
                .unwrap()
                .lines()
                .map(String::from)
                .collect()
        }
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn file(path: &str) -> DirEntry {
        DirEntry::new(path, EntryType::File, false)
    }

    #[test]
    fn test_prints_only_matches() {
        let buf = SharedBuf::default();
        let mut b = FilterSpec::builder();
        b.name("*.txt").unwrap();
        let printer = Printer::new(b.build(), Box::new(buf.clone()), Arc::new(AtomicBool::new(false)));

        assert!(printer.consider(&file("root/a.txt")));
        assert!(!printer.consider(&file("root/a.md")));

        assert_eq!(buf.lines(), vec!["root/a.txt"]);
        assert_eq!(printer.matched(), 1);
    }

    #[test]
    fn test_concurrent_lines_do_not_interleave() {
        let buf = SharedBuf::default();
        let printer = Arc::new(Printer::new(
            FilterSpec::any(),
            Box::new(buf.clone()),
            Arc::new(AtomicBool::new(false)),
        ));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let printer = Arc::clone(&printer);
                thread::spawn(move || {
                    for i in 0..200 {
                        printer.consider(&file(&format!("root/worker-{}/entry-{:04}", t, i)));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let lines = buf.lines();
        assert_eq!(lines.len(), 1600);
        assert!(lines
            .iter()
            .all(|l| l.starts_with("root/worker-") && l.contains("/entry-") && l.len() == 24));
    }

    #[test]
    fn test_broken_pipe_requests_shutdown() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let printer = Printer::new(FilterSpec::any(), Box::new(ClosedPipe), Arc::clone(&shutdown));

        assert!(!printer.consider(&file("root/a.txt")));
        assert!(shutdown.load(Ordering::SeqCst));

        // Later matches are dropped without touching the sink again
        assert!(!printer.consider(&file("root/b.txt")));
        let err = printer.take_error().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(printer.take_error().is_none());
    }
}
