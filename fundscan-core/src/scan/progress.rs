//! Progress reporting for period scans.
//!
//! The engine never prints on its own; callers pass a `ScanProgress` and the
//! CLI supplies `StdoutProgress`. Tests and library consumers use
//! `SilentProgress`.

use crate::error::FilterError;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Statistics for one monthly file scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStats {
    /// Distinct requested identifiers matched in this file.
    pub matched: usize,
    /// Size of the requested set for this file.
    pub requested: usize,
    /// Rows accepted into the accumulator.
    pub accepted: usize,
    /// Rows skipped (unrequested identifier).
    pub discarded: usize,
    /// Whether the scan stopped before end-of-file.
    pub early_exit: bool,
}

/// Aggregate counters for one period scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub rows_accepted: usize,
    pub rows_discarded: usize,
}

/// Callbacks for multi-file scan progress.
pub trait ScanProgress {
    /// Called before a monthly file is opened.
    fn on_file_start(&self, path: &Path);

    /// Called when a monthly file has been scanned.
    fn on_file_done(&self, path: &Path, stats: &FileStats, elapsed: Duration);

    /// Called when a monthly file cannot be opened or read; the month is
    /// skipped and the run continues.
    fn on_file_skipped(&self, path: &Path, error: &FilterError);

    /// Called once after the whole period has been processed.
    fn on_run_done(&self, summary: &RunSummary, elapsed: Duration);
}

/// Progress reporter that prints one line per file to stdout.
pub struct StdoutProgress;

impl ScanProgress for StdoutProgress {
    fn on_file_start(&self, path: &Path) {
        print!("> {}...", path.display());
        let _ = std::io::stdout().flush();
    }

    fn on_file_done(&self, _path: &Path, stats: &FileStats, elapsed: Duration) {
        println!(
            " done in {:.2?}: matched {} of {} identifiers, accepted {}, discarded {}{}",
            elapsed,
            stats.matched,
            stats.requested,
            stats.accepted,
            stats.discarded,
            if stats.early_exit { " (early exit)" } else { "" }
        );
    }

    fn on_file_skipped(&self, _path: &Path, error: &FilterError) {
        println!(" skipped: {error}");
    }

    fn on_run_done(&self, summary: &RunSummary, elapsed: Duration) {
        println!(
            "> Processed {} file(s) in {:.2?} ({} skipped); {} rows accepted, {} discarded",
            summary.files_processed,
            elapsed,
            summary.files_skipped,
            summary.rows_accepted,
            summary.rows_discarded
        );
    }
}

/// No-op progress reporter.
pub struct SilentProgress;

impl ScanProgress for SilentProgress {
    fn on_file_start(&self, _path: &Path) {}
    fn on_file_done(&self, _path: &Path, _stats: &FileStats, _elapsed: Duration) {}
    fn on_file_skipped(&self, _path: &Path, _error: &FilterError) {}
    fn on_run_done(&self, _summary: &RunSummary, _elapsed: Duration) {}
}
