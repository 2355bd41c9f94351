//! Calendar period handling: the `YearMonth` pair and the inclusive month iterator.
//!
//! Months are the unit of work for the whole engine — one disclosure file per
//! month — so ordering and iteration live here, along with the leap-aware
//! month-end arithmetic the matrix date axis depends on.

use chrono::{Duration, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Earliest year with monthly files published outside the compressed archive.
pub const YEAR_MIN: i32 = 2005;
/// Upper sanity bound for requested years.
pub const YEAR_MAX: i32 = 2100;

/// A calendar (year, month) pair, ordered chronologically.
///
/// The derived `Ord` compares year first, then month, which is exactly the
/// ordering the presence cache uses to decide whether a fund already appears
/// by a given month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Build a `YearMonth`; `None` when the month is outside 1..=12.
    ///
    /// Year bounds are a run-configuration concern, validated separately.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month in 1..=12")
    }

    /// Last calendar day of the month, leap-year aware.
    pub fn last_day(&self) -> NaiveDate {
        self.succ().first_day() - Duration::days(1)
    }

    /// The following month.
    pub fn succ(&self) -> YearMonth {
        if self.month == 12 {
            YearMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Parse the `YYYY-MM` form used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{s}'"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("bad year in '{s}'"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("bad month in '{s}'"))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in '{s}'"))
    }
}

/// Inclusive iterator over months, strictly chronological.
///
/// Yields nothing when `start > end`.
#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Option<YearMonth>,
    end: YearMonth,
}

impl MonthRange {
    pub fn new(start: YearMonth, end: YearMonth) -> Self {
        Self {
            next: (start <= end).then_some(start),
            end,
        }
    }
}

impl Iterator for MonthRange {
    type Item = YearMonth;

    fn next(&mut self) -> Option<YearMonth> {
        let current = self.next?;
        self.next = (current < self.end).then(|| current.succ());
        Some(current)
    }
}
