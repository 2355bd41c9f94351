//! Structured error types for filter runs.
//!
//! The split matters at the period loop: `Io`, `Csv`, `MissingColumn`, and
//! `MalformedRow` raised while scanning one monthly file are recoverable (the
//! month is reported and skipped), everything else aborts the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("a cache file name is required for cache operations")]
    CacheNameRequired,

    #[error("no fund identifiers requested")]
    EmptyRequest,

    #[error("identifier '{cnpj}' not found in presence cache — rebuild the cache or run without it")]
    IdentifierNotInCache { cnpj: String },

    #[error("required column '{column}' missing in {}", file.display())]
    MissingColumn { column: &'static str, file: PathBuf },

    #[error("malformed row at line {line} in {}: {reason}", file.display())]
    MalformedRow {
        line: u64,
        file: PathBuf,
        reason: String,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilterError {
    /// True for errors confined to a single monthly file; the period scan
    /// reports these and moves on to the next month.
    pub fn is_month_local(&self) -> bool {
        matches!(
            self,
            FilterError::Io(_)
                | FilterError::Csv(_)
                | FilterError::MissingColumn { .. }
                | FilterError::MalformedRow { .. }
        )
    }
}
