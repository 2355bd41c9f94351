//! Monthly source files: naming, opening, and column resolution.
//!
//! Input files are `;`-delimited with a header row; the four columns we need
//! are located by their fixed header names, so extra columns and column
//! reordering in the published files are tolerated. Decimal values use
//! invariant dot notation regardless of locale.

use crate::config::{HEADER_CNPJ, HEADER_DATE, HEADER_HOLDERS, HEADER_QUOTA};
use crate::domain::{Observation, YearMonth};
use crate::error::FilterError;
use chrono::NaiveDate;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Name of the monthly disclosure file for a given month:
/// `<input_dir>/inf_diario_fi_<YYYY><MM>.csv`.
pub fn monthly_file_path(input_dir: &Path, ym: YearMonth) -> PathBuf {
    input_dir.join(format!("inf_diario_fi_{:04}{:02}.csv", ym.year, ym.month))
}

/// Positions of the four required columns within one file's header.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    pub cnpj: usize,
    pub date: usize,
    pub quota: usize,
    pub holders: usize,
}

impl ColumnMap {
    /// Resolve the required columns from a header record.
    pub fn from_headers(headers: &csv::StringRecord, file: &Path) -> Result<Self, FilterError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or(FilterError::MissingColumn {
                    column,
                    file: file.to_path_buf(),
                })
        };
        Ok(Self {
            cnpj: find(HEADER_CNPJ)?,
            date: find(HEADER_DATE)?,
            quota: find(HEADER_QUOTA)?,
            holders: find(HEADER_HOLDERS)?,
        })
    }
}

/// Open a monthly file as a `;`-delimited CSV reader and resolve its columns.
pub fn open_monthly(path: &Path) -> Result<(csv::Reader<File>, ColumnMap), FilterError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_path(path)?;
    let map = ColumnMap::from_headers(reader.headers()?, path)?;
    Ok((reader, map))
}

/// Parse the date, quota, and holder-count fields of a matched row.
pub fn parse_observation(
    record: &csv::StringRecord,
    map: &ColumnMap,
    cnpj: &str,
    file: &Path,
) -> Result<Observation, FilterError> {
    let malformed = |reason: String| FilterError::MalformedRow {
        line: record.position().map(|p| p.line()).unwrap_or(0),
        file: file.to_path_buf(),
        reason,
    };
    let field = |idx: usize| record.get(idx).unwrap_or("");

    let date = NaiveDate::parse_from_str(field(map.date), "%Y-%m-%d")
        .map_err(|e| malformed(format!("bad date '{}': {e}", field(map.date))))?;
    let quota: f64 = field(map.quota)
        .parse()
        .map_err(|e| malformed(format!("bad quota '{}': {e}", field(map.quota))))?;
    let holders: u32 = field(map.holders)
        .parse()
        .map_err(|e| malformed(format!("bad holder count '{}': {e}", field(map.holders))))?;

    Ok(Observation {
        cnpj: cnpj.to_string(),
        date,
        quota,
        holders,
    })
}
