//! Dense date×fund quote matrix.
//!
//! One row per calendar day from the first day of the start month through the
//! last day of the end month, one column per requested identifier in
//! ascending order. Missing cells hold strict NaN; a per-row flag records
//! whether the date received any observation at all, distinguishing "no
//! trading that day" from "zero quota".

use crate::domain::{Observation, YearMonth};
use crate::scan::scanner::ObservationSink;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

#[derive(Debug)]
pub struct QuoteMatrix {
    start_date: NaiveDate,
    end_date: NaiveDate,
    /// Identifiers in ascending order; column index = position here.
    columns: Vec<String>,
    /// Row-major cells; NaN = no observation.
    cells: Vec<f64>,
    /// One flag per row: did this date receive at least one observation?
    has_data: Vec<bool>,
}

impl QuoteMatrix {
    /// Empty matrix spanning `start.first_day()..=end.last_day()`.
    pub fn new(start: YearMonth, end: YearMonth, requested: &BTreeSet<String>) -> Self {
        let start_date = start.first_day();
        let end_date = end.last_day();
        let rows = (end_date - start_date).num_days() as usize + 1;
        let columns: Vec<String> = requested.iter().cloned().collect();
        Self {
            start_date,
            end_date,
            cells: vec![f64::NAN; rows * columns.len()],
            has_data: vec![false; rows],
            columns,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn row_count(&self) -> usize {
        self.has_data.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row index of a calendar date; `None` outside the matrix range.
    ///
    /// Inverse of `date_at`: the mapping is a bijection over every calendar
    /// day in range, weekends and holidays included.
    pub fn row_index(&self, date: NaiveDate) -> Option<usize> {
        (self.start_date..=self.end_date)
            .contains(&date)
            .then(|| (date - self.start_date).num_days() as usize)
    }

    /// Calendar date of a row index.
    pub fn date_at(&self, row: usize) -> NaiveDate {
        self.start_date + Duration::days(row as i64)
    }

    /// Column index of an identifier within the sorted column list.
    pub fn column_index(&self, cnpj: &str) -> Option<usize> {
        self.columns.binary_search_by(|c| c.as_str().cmp(cnpj)).ok()
    }

    /// Cell value; NaN when the fund has no observation on that date.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.columns.len() + col]
    }

    /// Whether the date at `row` received at least one observation.
    pub fn row_has_data(&self, row: usize) -> bool {
        self.has_data[row]
    }

    /// Number of dates that received at least one observation.
    pub fn dates_with_data(&self) -> usize {
        self.has_data.iter().filter(|&&b| b).count()
    }
}

impl ObservationSink for QuoteMatrix {
    /// Project an observation into its (date, fund) cell and flag the row.
    ///
    /// Observations outside the date range or for an unrequested identifier
    /// cannot occur when fed by the scanner (the period loop stays inside the
    /// range and the scanner filters identifiers), so they are ignored.
    fn record(&mut self, obs: Observation) {
        if let (Some(row), Some(col)) = (self.row_index(obs.date), self.column_index(&obs.cnpj)) {
            let width = self.columns.len();
            self.cells[row * width + col] = obs.quota;
            self.has_data[row] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn requested(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn obs(cnpj: &str, d: NaiveDate, quota: f64) -> Observation {
        Observation {
            cnpj: cnpj.into(),
            date: d,
            quota,
            holders: 1,
        }
    }

    #[test]
    fn spans_full_calendar_months() {
        let m = QuoteMatrix::new(ym(2021, 1), ym(2021, 2), &requested(&["A"]));
        assert_eq!(m.start_date(), date(2021, 1, 1));
        assert_eq!(m.end_date(), date(2021, 2, 28));
        assert_eq!(m.row_count(), 59);
    }

    #[test]
    fn leap_february_gets_its_29th_row() {
        let m = QuoteMatrix::new(ym(2024, 2), ym(2024, 2), &requested(&["A"]));
        assert_eq!(m.row_count(), 29);
        assert_eq!(m.date_at(28), date(2024, 2, 29));
    }

    #[test]
    fn row_index_and_date_at_are_inverse() {
        let m = QuoteMatrix::new(ym(2021, 1), ym(2021, 3), &requested(&["A"]));
        for row in 0..m.row_count() {
            assert_eq!(m.row_index(m.date_at(row)), Some(row));
        }
        assert_eq!(m.row_index(date(2020, 12, 31)), None);
        assert_eq!(m.row_index(date(2021, 4, 1)), None);
    }

    #[test]
    fn columns_are_sorted_ascending() {
        let m = QuoteMatrix::new(ym(2021, 1), ym(2021, 1), &requested(&["B", "A", "C"]));
        assert_eq!(m.columns(), ["A", "B", "C"]);
        assert_eq!(m.column_index("B"), Some(1));
        assert_eq!(m.column_index("Z"), None);
    }

    #[test]
    fn record_sets_cell_and_presence_flag() {
        let mut m = QuoteMatrix::new(ym(2021, 1), ym(2021, 1), &requested(&["A", "B"]));
        m.record(obs("A", date(2021, 1, 4), 1.5));

        let row = m.row_index(date(2021, 1, 4)).unwrap();
        assert!(m.row_has_data(row));
        assert_eq!(m.value(row, 0), 1.5);
        assert!(m.value(row, 1).is_nan());
        assert!(!m.row_has_data(0));
        assert_eq!(m.dates_with_data(), 1);
    }
}
