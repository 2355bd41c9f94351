//! Observation — one fund/date/quota row extracted from a monthly file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily quota observation for one fund.
///
/// Immutable once created; the flat output file is exactly a sequence of
/// these in scan order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Fund registry number (CNPJ), the opaque identifier key.
    pub cnpj: String,
    /// Reporting date of the row.
    pub date: NaiveDate,
    /// Per-share net asset value on that date.
    pub quota: f64,
    /// Number of quota holders.
    pub holders: u32,
}
