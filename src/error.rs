//! Error types shared by the simulator, record store and aggregator.

use chrono::NaiveDate;
use thiserror::Error;

/// A malformed hourly series. Rejects the whole write it was found in.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Series does not hold exactly one value per hour of the day.
    #[error("series `{series}`: expected 24 hourly values, got {len}")]
    WrongLength { series: String, len: usize },
    /// Series holds a negative emission value.
    #[error("series `{series}`: hour {hour} is negative ({value})")]
    Negative {
        series: String,
        hour: usize,
        value: f64,
    },
    /// Series holds NaN or an infinity.
    #[error("series `{series}`: hour {hour} is not a finite number")]
    NonFinite { series: String, hour: usize },
}

/// Errors surfaced by the emissions core and its persistence boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmissionsError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// A required upstream entity (home, record) is absent.
    #[error("not found: {0}")]
    NotFound(String),
    /// The emission factor source could not produce a factor.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Insert-only write hit an existing `(home, date)` record.
    #[error("duplicate record for home `{home_id}` on {date}")]
    DuplicateRecord { home_id: String, date: NaiveDate },
    #[error("day count must be > 0, got {0}")]
    InvalidDays(u32),
    /// Window longer than the aggregator accepts.
    #[error("day count {days} exceeds the maximum window of {max} days")]
    WindowTooLong { days: u32, max: u32 },
    /// Window would start before the earliest representable date.
    #[error("a {days}-day window ending {end} starts before the earliest supported date")]
    WindowOutOfRange { days: u32, end: NaiveDate },
}
