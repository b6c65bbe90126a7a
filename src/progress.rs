//! Progress reporting for the parallel walk
//!
//! Everything here draws on stderr; stdout carries matched paths only.

use crate::walker::{WalkProgress, WalkResult};
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Spinner that displays walk status
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());

        // The template is a literal, so parsing cannot fail at runtime
        if let Ok(spinner) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(spinner.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &WalkProgress) {
        self.bar.set_message(progress_message(progress));
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn progress_message(progress: &WalkProgress) -> String {
    let mut msg = format!(
        "Dirs: {} ({:.0}/s) | Entries: {} ({:.0}/s) | Matched: {} | Queue: {} | Scans: {}/{}",
        format_number(progress.dirs),
        progress.dirs_per_second(),
        format_number(progress.entries),
        progress.entries_per_second(),
        format_number(progress.matched),
        progress.queue_size,
        progress.active_scans,
        progress.total_workers,
    );

    if progress.errors > 0 {
        msg.push_str(&format!(" | Errors: {}", format_number(progress.errors)));
    }

    msg
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the walk results to stderr
pub fn print_summary(result: &WalkResult) {
    let duration_secs = result.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        result.entries_seen as f64 / duration_secs
    } else {
        0.0
    };

    let title = if result.completed {
        style("Walk Complete").green().bold()
    } else {
        style("Walk Interrupted").yellow().bold()
    };

    eprintln!();
    eprintln!("{}", title);
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(result.dirs_scanned)
    );
    eprintln!(
        "  {} {}",
        style("Entries:").bold(),
        format_number(result.entries_seen)
    );
    eprintln!("  {} {}", style("Matched:").bold(), format_number(result.matched));
    eprintln!(
        "  {} {:.1}s ({:.0} entries/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    eprintln!(
        "  {} {} queued, {} dispatched, {} saturated waits",
        style("Scheduling:").bold(),
        format_number(result.dirs_queued),
        format_number(result.dirs_dispatched),
        format_number(result.saturated_waits)
    );
    if result.symlinks_skipped > 0 {
        eprintln!(
            "  {} {}",
            style("Symlinks skipped:").bold(),
            format_number(result.symlinks_skipped)
        );
    }
    if result.permission_denied > 0 {
        eprintln!(
            "  {} {}",
            style("Permission denied:").yellow().bold(),
            format_number(result.permission_denied)
        );
    }
    if result.errors > 0 {
        eprintln!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(result.errors)
        );
    }
    eprintln!();
}
