//! Domain types: observations, presence records, and calendar periods.

pub mod observation;
pub mod period;
pub mod presence;

pub use observation::Observation;
pub use period::{MonthRange, YearMonth, YEAR_MAX, YEAR_MIN};
pub use presence::PresenceRecord;
