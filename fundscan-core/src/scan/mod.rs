//! Monthly-file scanning: source naming/parsing, the early-exit scanner, and
//! progress reporting.

pub mod progress;
pub mod scanner;
pub mod source;

pub use progress::{FileStats, RunSummary, ScanProgress, SilentProgress, StdoutProgress};
pub use scanner::{scan_month, MatchTracker, ObservationSink, RowAction, ScanState};
pub use source::{monthly_file_path, open_monthly, ColumnMap};
