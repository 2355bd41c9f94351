//! Run orchestration: dispatches the four operations over a validated config.
//!
//! The period loop is shared by the flat and matrix filters: months are
//! walked strictly chronologically, each monthly file is opened, streamed,
//! and closed before the next, and a file that cannot be opened or read is
//! reported and skipped without aborting the run. When a cache file name is
//! configured the presence cache is loaded once and used to shrink each
//! month's search set before scanning.

use crate::cache::PresenceCache;
use crate::config::{FilterConfig, Operation};
use crate::domain::{MonthRange, Observation, PresenceRecord};
use crate::error::FilterError;
use crate::matrix::QuoteMatrix;
use crate::output;
use crate::scan::progress::{RunSummary, ScanProgress};
use crate::scan::scanner::{scan_month, ObservationSink};
use crate::scan::source;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

/// Structured outcome of one operation, for the caller to display.
#[derive(Debug)]
pub enum RunReport {
    Flat {
        observations: usize,
        summary: RunSummary,
        /// Written output path; `None` when output writing was disabled.
        output: Option<PathBuf>,
    },
    Matrix {
        dates_with_data: usize,
        identifiers: usize,
        summary: RunSummary,
        /// (cotas, vardia) paths; `None` when output writing was disabled.
        outputs: Option<(PathBuf, PathBuf)>,
    },
    CacheBuilt {
        identifiers: usize,
        path: PathBuf,
        summary: RunSummary,
    },
    CacheRecords(Vec<PresenceRecord>),
}

/// Execute one operation end to end.
pub fn execute(
    op: Operation,
    config: &FilterConfig,
    requested: &BTreeSet<String>,
    progress: &dyn ScanProgress,
) -> Result<RunReport, FilterError> {
    match op {
        Operation::FlatFilter => run_flat_filter(config, requested, progress),
        Operation::MatrixFilter => run_matrix_filter(config, requested, progress),
        Operation::CacheBuild => build_and_save_cache(config, requested, progress),
        Operation::CacheShow => show_cache(config),
    }
}

fn run_flat_filter(
    config: &FilterConfig,
    requested: &BTreeSet<String>,
    progress: &dyn ScanProgress,
) -> Result<RunReport, FilterError> {
    config.validate()?;
    if requested.is_empty() {
        return Err(FilterError::EmptyRequest);
    }
    let cache = load_cache_if_configured(config)?;

    let mut observations: Vec<Observation> = Vec::new();
    let summary = scan_period(config, requested, cache.as_ref(), &mut observations, progress)?;

    let output = if config.write_output {
        let path = config.output_path("");
        output::write_flat(&path, &observations)?;
        Some(path)
    } else {
        None
    };

    Ok(RunReport::Flat {
        observations: observations.len(),
        summary,
        output,
    })
}

fn run_matrix_filter(
    config: &FilterConfig,
    requested: &BTreeSet<String>,
    progress: &dyn ScanProgress,
) -> Result<RunReport, FilterError> {
    config.validate()?;
    if requested.is_empty() {
        return Err(FilterError::EmptyRequest);
    }
    let cache = load_cache_if_configured(config)?;

    let mut matrix = QuoteMatrix::new(config.start, config.end, requested);
    let summary = scan_period(config, requested, cache.as_ref(), &mut matrix, progress)?;

    let outputs = if config.write_output {
        let cotas = config.output_path("_cotas");
        let vardia = config.output_path("_vardia");
        output::write_matrix(&cotas, &vardia, &matrix)?;
        Some((cotas, vardia))
    } else {
        None
    };

    Ok(RunReport::Matrix {
        dates_with_data: matrix.dates_with_data(),
        identifiers: matrix.columns().len(),
        summary,
        outputs,
    })
}

fn build_and_save_cache(
    config: &FilterConfig,
    requested: &BTreeSet<String>,
    progress: &dyn ScanProgress,
) -> Result<RunReport, FilterError> {
    if requested.is_empty() {
        return Err(FilterError::EmptyRequest);
    }
    let cache = PresenceCache::build(config, requested, progress)?;
    let path = config.cache_path().ok_or(FilterError::CacheNameRequired)?;
    cache.save(&path)?;
    Ok(RunReport::CacheBuilt {
        identifiers: cache.len(),
        path,
        summary: RunSummary::default(),
    })
}

fn show_cache(config: &FilterConfig) -> Result<RunReport, FilterError> {
    let path = config.cache_path().ok_or(FilterError::CacheNameRequired)?;
    let cache = PresenceCache::load(&path)?;
    Ok(RunReport::CacheRecords(cache.records()))
}

/// Load the presence cache when a cache name is configured.
///
/// A configured-but-unreadable cache is fatal: the caller asked for
/// cache-assisted filtering and silently scanning without it would change
/// the run's performance contract unannounced.
fn load_cache_if_configured(config: &FilterConfig) -> Result<Option<PresenceCache>, FilterError> {
    match config.cache_path() {
        Some(path) => Ok(Some(PresenceCache::load(&path)?)),
        None => Ok(None),
    }
}

/// Walk the configured month range, scanning each file into `sink`.
fn scan_period(
    config: &FilterConfig,
    requested: &BTreeSet<String>,
    cache: Option<&PresenceCache>,
    sink: &mut dyn ObservationSink,
    progress: &dyn ScanProgress,
) -> Result<RunSummary, FilterError> {
    let mut summary = RunSummary::default();
    let run_start = Instant::now();

    for ym in MonthRange::new(config.start, config.end) {
        // Cache-assisted pre-filter: only identifiers already present by
        // this month are worth looking for. Fatal if the cache does not
        // know a requested identifier at all.
        let month_subset;
        let active: &BTreeSet<String> = match cache {
            Some(cache) => {
                month_subset = cache.present_in(requested, ym)?;
                &month_subset
            }
            None => requested,
        };

        let path = source::monthly_file_path(&config.input_dir, ym);
        progress.on_file_start(&path);
        let file_start = Instant::now();
        match scan_month(&path, active, sink) {
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
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_OUTPUT_NAME;
    use crate::domain::YearMonth;
    use crate::scan::progress::SilentProgress;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn config(dir: &std::path::Path) -> FilterConfig {
        FilterConfig {
            start: ym(2021, 1),
            end: ym(2021, 1),
            input_dir: dir.to_path_buf(),
            output_dir: dir.to_path_buf(),
            output_name: DEFAULT_OUTPUT_NAME.into(),
            cache_name: None,
            write_output: true,
        }
    }

    #[test]
    fn empty_request_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(
            Operation::FlatFilter,
            &config(dir.path()),
            &set(&[]),
            &SilentProgress,
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::EmptyRequest));
    }

    #[test]
    fn cache_build_requires_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(
            Operation::CacheBuild,
            &config(dir.path()),
            &set(&["A"]),
            &SilentProgress,
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::CacheNameRequired));
    }

    #[test]
    fn invalid_period_aborts_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.start = ym(2021, 6);
        cfg.end = ym(2021, 5);
        let err = execute(Operation::FlatFilter, &cfg, &set(&["A"]), &SilentProgress).unwrap_err();
        assert!(matches!(err, FilterError::InvalidPeriod(_)));
    }

    #[test]
    fn configured_but_missing_cache_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.cache_name = Some("_nope".into());
        let err = execute(Operation::FlatFilter, &cfg, &set(&["A"]), &SilentProgress).unwrap_err();
        assert!(matches!(err, FilterError::Csv(_) | FilterError::Io(_)));
    }

    #[test]
    fn missing_monthly_files_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // No input files exist at all: every month is skipped, run succeeds.
        let report = execute(
            Operation::FlatFilter,
            &config(dir.path()),
            &set(&["A"]),
            &SilentProgress,
        )
        .unwrap();
        match report {
            RunReport::Flat {
                observations,
                summary,
                output,
            } => {
                assert_eq!(observations, 0);
                assert_eq!(summary.files_processed, 0);
                assert_eq!(summary.files_skipped, 1);
                assert!(output.is_some());
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }
}
