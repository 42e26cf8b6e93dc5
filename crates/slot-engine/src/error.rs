//! Error types for slot-engine operations.

use std::fmt;

use thiserror::Error;

/// The constraint source that failed to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    OpeningHours,
    LunchBreaks,
    Holidays,
    Bookings,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::OpeningHours => "opening hours",
            ConstraintKind::LunchBreaks => "lunch breaks",
            ConstraintKind::Holidays => "holidays",
            ConstraintKind::Bookings => "bookings",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    /// A clock time was not a valid `HH:MM` string.
    #[error("Invalid time format: {0:?}")]
    InvalidTimeFormat(String),

    /// A minute offset fell outside a single day.
    #[error("Minute offset out of range: {0} (expected 0..=1439)")]
    OutOfRange(i64),

    #[error("Invalid service duration: {0} minutes (must be positive)")]
    InvalidServiceDuration(i64),

    /// An interval would end after local midnight.
    #[error("Interval {start}..{end} crosses midnight")]
    UnsupportedCrossMidnightInterval { start: i64, end: i64 },

    /// A constraint source failed to respond. Distinct from "fully booked".
    #[error("Constraint source unavailable ({kind}): {reason}")]
    AdapterUnavailable {
        kind: ConstraintKind,
        reason: String,
    },

    #[error("Invalid opening hours: {0}")]
    InvalidOpeningHours(String),

    #[error("Invalid day of week: {0} (expected 0 = Sunday ..= 6 = Saturday)")]
    InvalidDayOfWeek(u8),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A snapshot or configuration document was not valid JSON, or one of
    /// its records failed validation.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller abandoned a batch resolution.
    #[error("Availability request cancelled")]
    Cancelled,
}

impl EngineError {
    /// Whether retrying the same request may succeed.
    ///
    /// Everything else is a caller contract violation and will fail the same
    /// way again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineError::AdapterUnavailable { .. } | EngineError::Cancelled
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
