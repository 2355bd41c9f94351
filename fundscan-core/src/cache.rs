//! Presence cache — first (year, month) of appearance per fund identifier.
//!
//! Building the cache walks every monthly file in range once; consuming it
//! lets later runs shrink the per-month search set to the identifiers already
//! known to appear by that month. The cache is persisted as a `;`-delimited
//! side file next to the input files and loaded read-only afterwards.

use crate::config::FilterConfig;
use crate::domain::{MonthRange, PresenceRecord, YearMonth};
use crate::error::FilterError;
use crate::scan::progress::{FileStats, RunSummary, ScanProgress};
use crate::scan::source;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;

/// In-memory presence mapping: identifier → first month seen.
#[derive(Debug, Default)]
pub struct PresenceCache {
    records: BTreeMap<String, YearMonth>,
}

impl PresenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the cache by scanning every monthly file in the configured range.
    ///
    /// The month loop stops as soon as every requested identifier has a
    /// record (months are chronological, so the first sighting wins). Missing
    /// or unreadable monthly files are reported and skipped, leaving any
    /// identifiers first appearing there to be picked up in a later month.
    ///
    /// Refuses to run when no cache file name is configured, since the result
    /// could not be persisted.
    pub fn build(
        config: &FilterConfig,
        requested: &BTreeSet<String>,
        progress: &dyn ScanProgress,
    ) -> Result<Self, FilterError> {
        config.validate()?;
        if config.cache_name.is_none() {
            return Err(FilterError::CacheNameRequired);
        }

        let mut records: BTreeMap<String, YearMonth> = BTreeMap::new();
        let mut summary = RunSummary::default();
        let run_start = Instant::now();

        for ym in MonthRange::new(config.start, config.end) {
            if records.len() == requested.len() {
                break;
            }
            let path = source::monthly_file_path(&config.input_dir, ym);
            progress.on_file_start(&path);
            let file_start = Instant::now();
            match scan_file_presences(&path, requested, ym, &mut records) {
                Ok(stats) => {
                    summary.files_processed += 1;
                    summary.rows_accepted += stats.accepted;
                    summary.rows_discarded += stats.discarded;
                    progress.on_file_done(&path, &stats, file_start.elapsed());
                }
                Err(err) if err.is_month_local() => {
                    summary.files_skipped += 1;
                    progress.on_file_skipped(&path, &err);
                }
                Err(err) => return Err(err),
            }
        }

        progress.on_run_done(&summary, run_start.elapsed());
        Ok(Self { records })
    }

    /// Persist the cache to its side file, one record per row.
    pub fn save(&self, path: &Path) -> Result<(), FilterError> {
        let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(path)?;
        for (cnpj, first_seen) in &self.records {
            writer.serialize(PresenceRecord::new(cnpj.clone(), *first_seen))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Load a previously saved cache.
    pub fn load(path: &Path) -> Result<Self, FilterError> {
        let mut reader = csv::ReaderBuilder::new().delimiter(b';').from_path(path)?;
        let mut records = BTreeMap::new();
        for result in reader.deserialize() {
            let rec: PresenceRecord = result?;
            records.insert(rec.cnpj.clone(), rec.first_seen());
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First month the identifier was seen, if it has a record.
    pub fn first_seen(&self, cnpj: &str) -> Option<YearMonth> {
        self.records.get(cnpj).copied()
    }

    /// All records, sorted by identifier.
    pub fn records(&self) -> Vec<PresenceRecord> {
        self.records
            .iter()
            .map(|(cnpj, first_seen)| PresenceRecord::new(cnpj.clone(), *first_seen))
            .collect()
    }

    /// The subset of `requested` already present in the corpus by `ym`.
    ///
    /// A requested identifier with no record at all means the cache predates
    /// the identifier list and is stale: fatal, never silently treated as
    /// absent.
    pub fn present_in(
        &self,
        requested: &BTreeSet<String>,
        ym: YearMonth,
    ) -> Result<BTreeSet<String>, FilterError> {
        let mut present = BTreeSet::new();
        for cnpj in requested {
            match self.records.get(cnpj) {
                None => {
                    return Err(FilterError::IdentifierNotInCache { cnpj: cnpj.clone() });
                }
                Some(first_seen) if *first_seen <= ym => {
                    present.insert(cnpj.clone());
                }
                Some(_) => {}
            }
        }
        Ok(present)
    }
}

/// Scan one monthly file for first sightings of requested identifiers.
///
/// Only the identifier column is inspected. Contiguous rows for the same
/// identifier are collapsed via the last-seen check, and the scan stops once
/// every requested identifier is known.
fn scan_file_presences(
    path: &Path,
    requested: &BTreeSet<String>,
    ym: YearMonth,
    records: &mut BTreeMap<String, YearMonth>,
) -> Result<FileStats, FilterError> {
    let (mut reader, map) = source::open_monthly(path)?;
    let mut stats = FileStats {
        requested: requested.len(),
        ..FileStats::default()
    };
    let mut last_seen = String::new();

    let mut record = csv::StringRecord::new();
    while reader.read_record(&mut record)? {
        let cnpj = record.get(map.cnpj).unwrap_or("");
        if cnpj == last_seen {
            stats.discarded += 1;
            continue;
        }
        last_seen.clear();
        last_seen.push_str(cnpj);

        if requested.contains(cnpj) && !records.contains_key(cnpj) {
            records.insert(cnpj.to_string(), ym);
            stats.matched += 1;
            stats.accepted += 1;
            if records.len() == requested.len() {
                stats.early_exit = true;
                break;
            }
        } else {
            stats.discarded += 1;
        }
    }

    Ok(stats)
}
