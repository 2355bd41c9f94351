//! Run configuration and the operation selector.
//!
//! One immutable `FilterConfig` is validated up front and threaded explicitly
//! into every component; there is no ambient static state. The four commands
//! the engine understands are a single `Operation` enum rather than parallel
//! code paths.

use crate::domain::{YearMonth, YEAR_MAX, YEAR_MIN};
use crate::error::FilterError;
use std::path::PathBuf;

/// Header names of the four required columns in the monthly files.
pub const HEADER_CNPJ: &str = "CNPJ_FUNDO";
pub const HEADER_DATE: &str = "DT_COMPTC";
pub const HEADER_QUOTA: &str = "VL_QUOTA";
pub const HEADER_HOLDERS: &str = "NR_COTST";

/// Default base name for the filtered output file.
pub const DEFAULT_OUTPUT_NAME: &str = "_DADOS_FILTRADOS";

/// The selected operation for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Extract a flat observation file, one row per fund/date.
    FlatFilter,
    /// Pivot observations into the quota-level and daily-change tables.
    MatrixFilter,
    /// Scan the full period and record each identifier's first month.
    CacheBuild,
    /// Load a saved presence cache for display.
    CacheShow,
}

/// Immutable per-run configuration, validated once before any file I/O.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// First month of the period (inclusive).
    pub start: YearMonth,
    /// Last month of the period (inclusive).
    pub end: YearMonth,
    /// Directory holding the monthly input files and the cache side file.
    pub input_dir: PathBuf,
    /// Directory for output files.
    pub output_dir: PathBuf,
    /// Base name for output files (without extension).
    pub output_name: String,
    /// Presence cache file name (without extension); `None` disables the
    /// cache-assisted pre-filter and forbids cache operations.
    pub cache_name: Option<String>,
    /// When false, scan and report but skip writing output files.
    pub write_output: bool,
}

impl FilterConfig {
    /// Check year bounds, month bounds, and range ordering.
    pub fn validate(&self) -> Result<(), FilterError> {
        for ym in [self.start, self.end] {
            if !(YEAR_MIN..=YEAR_MAX).contains(&ym.year) {
                return Err(FilterError::InvalidPeriod(format!(
                    "year {} outside {YEAR_MIN}..={YEAR_MAX}",
                    ym.year
                )));
            }
            if !(1..=12).contains(&ym.month) {
                return Err(FilterError::InvalidPeriod(format!(
                    "month {} outside 1..=12",
                    ym.month
                )));
            }
        }
        if self.start > self.end {
            return Err(FilterError::InvalidPeriod(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Path of the presence cache side file, if a cache name is configured.
    /// The cache lives next to the input files, not in the output directory.
    pub fn cache_path(&self) -> Option<PathBuf> {
        self.cache_name
            .as_ref()
            .map(|name| self.input_dir.join(format!("{name}.csv")))
    }

    /// Path of an output file: `<output_dir>/<output_name><suffix>.csv`.
    pub fn output_path(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.csv", self.output_name, suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(start: YearMonth, end: YearMonth) -> FilterConfig {
        FilterConfig {
            start,
            end,
            input_dir: "/data/in".into(),
            output_dir: "/data/out".into(),
            output_name: DEFAULT_OUTPUT_NAME.into(),
            cache_name: None,
            write_output: true,
        }
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn accepts_ordinary_range() {
        assert!(config(ym(2021, 1), ym(2021, 12)).validate().is_ok());
    }

    #[test]
    fn accepts_single_month() {
        assert!(config(ym(2021, 7), ym(2021, 7)).validate().is_ok());
    }

    #[test]
    fn rejects_year_out_of_bounds() {
        assert!(config(ym(2004, 1), ym(2021, 1)).validate().is_err());
        assert!(config(ym(2021, 1), ym(2101, 1)).validate().is_err());
    }

    #[test]
    fn rejects_reversed_range() {
        assert!(config(ym(2021, 6), ym(2021, 5)).validate().is_err());
        assert!(config(ym(2022, 1), ym(2021, 12)).validate().is_err());
    }

    #[test]
    fn cache_path_requires_name() {
        let mut c = config(ym(2021, 1), ym(2021, 2));
        assert!(c.cache_path().is_none());
        c.cache_name = Some("_cache".into());
        assert_eq!(
            c.cache_path().unwrap(),
            PathBuf::from("/data/in/_cache.csv")
        );
    }

    #[test]
    fn output_path_applies_suffix() {
        let c = config(ym(2021, 1), ym(2021, 2));
        assert_eq!(
            c.output_path("_cotas"),
            PathBuf::from("/data/out/_DADOS_FILTRADOS_cotas.csv")
        );
    }
}
