//! Single-file row scanner with the grouped-rows early exit.
//!
//! Monthly files list all funds, with each fund's daily rows contiguous. The
//! scanner exploits that layout twice: repeated unrequested identifiers are
//! skipped without a set lookup, and once every requested identifier has been
//! matched at least once the rest of the file cannot contain anything useful
//! and the scan stops.

use super::progress::FileStats;
use super::source;
use crate::domain::Observation;
use crate::error::FilterError;
use std::collections::BTreeSet;
use std::path::Path;

/// Destination for matched observations — the seam between the scanner and
/// the flat/matrix accumulators.
pub trait ObservationSink {
    fn record(&mut self, obs: Observation);
}

impl ObservationSink for Vec<Observation> {
    fn record(&mut self, obs: Observation) {
        self.push(obs);
    }
}

/// Where a file scan stands with respect to the requested set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No requested identifier matched yet.
    Seeking,
    /// Some, but not all, requested identifiers matched.
    PartiallyMatched,
    /// Every requested identifier matched; no further rows can be useful.
    FullyMatched,
}

/// What to do with one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// Parse the remaining fields and emit the observation.
    Emit,
    /// Skip the row.
    Skip,
    /// Terminate the file scan (early exit).
    Stop,
}

/// Tracks distinct matches across one file.
///
/// `matched` counts distinct identifiers, not rows: it only advances when a
/// requested row's identifier differs from the previous matched one.
#[derive(Debug)]
pub struct MatchTracker<'a> {
    requested: &'a BTreeSet<String>,
    last_matched: Option<String>,
    last_rejected: Option<String>,
    matched: usize,
}

impl<'a> MatchTracker<'a> {
    pub fn new(requested: &'a BTreeSet<String>) -> Self {
        Self {
            requested,
            last_matched: None,
            last_rejected: None,
            matched: 0,
        }
    }

    /// Distinct requested identifiers matched so far.
    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn state(&self) -> ScanState {
        if self.matched >= self.requested.len() {
            ScanState::FullyMatched
        } else if self.matched == 0 {
            ScanState::Seeking
        } else {
            ScanState::PartiallyMatched
        }
    }

    /// Classify one row's identifier.
    pub fn classify(&mut self, cnpj: &str) -> RowAction {
        // Contiguous run of an identifier we already rejected: no set lookup.
        if self.last_rejected.as_deref() == Some(cnpj) {
            return RowAction::Skip;
        }
        if self.requested.contains(cnpj) {
            if self.last_matched.as_deref() != Some(cnpj) {
                self.matched += 1;
                self.last_matched = Some(cnpj.to_string());
            }
            RowAction::Emit
        } else if self.state() == ScanState::FullyMatched {
            RowAction::Stop
        } else {
            self.last_rejected = Some(cnpj.to_string());
            RowAction::Skip
        }
    }
}

/// Scan one monthly file, emitting rows for requested identifiers into `sink`.
///
/// PRECONDITION: rows are contiguous per identifier within the file, and once
/// every requested identifier has been matched no requested identifier
/// reappears later. The early exit depends on this; if the file violates it,
/// later rows are silently dropped. See the divergence test in
/// `tests/property_tests.rs`.
pub fn scan_month(
    path: &Path,
    requested: &BTreeSet<String>,
    sink: &mut dyn ObservationSink,
) -> Result<FileStats, FilterError> {
    let (mut reader, map) = source::open_monthly(path)?;
    let mut tracker = MatchTracker::new(requested);
    let mut stats = FileStats {
        requested: requested.len(),
        ..FileStats::default()
    };

    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        let cnpj = record.get(map.cnpj).unwrap_or("");
        match tracker.classify(cnpj) {
            RowAction::Emit => {
                sink.record(source::parse_observation(&record, &map, cnpj, path)?);
                stats.accepted += 1;
            }
            RowAction::Skip => stats.discarded += 1,
            RowAction::Stop => {
                stats.early_exit = true;
                break;
            }
        }
    }

    stats.matched = tracker.matched();
    Ok(stats)
}
