//! Presence records — the first month each fund identifier appears in the corpus.

use super::period::YearMonth;
use serde::{Deserialize, Serialize};

/// First-appearance record for one fund identifier.
///
/// At most one record exists per identifier. The recorded month is the
/// earliest month any row for the identifier was observed during the scan
/// that built the cache, which is not necessarily the fund's true inception.
///
/// Year and month are stored as separate fields so the record maps directly
/// onto one row of the `;`-delimited cache side file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub cnpj: String,
    pub first_year: i32,
    pub first_month: u32,
}

impl PresenceRecord {
    pub fn new(cnpj: impl Into<String>, first_seen: YearMonth) -> Self {
        Self {
            cnpj: cnpj.into(),
            first_year: first_seen.year,
            first_month: first_seen.month,
        }
    }

    /// The first month the identifier was seen.
    pub fn first_seen(&self) -> YearMonth {
        YearMonth {
            year: self.first_year,
            month: self.first_month,
        }
    }

    /// True if the fund already appears in the corpus by `ym`: its first
    /// appearance is in an earlier year, or the same year and a month <= `ym`.
    pub fn present_by(&self, ym: YearMonth) -> bool {
        self.first_seen() <= ym
    }
}
