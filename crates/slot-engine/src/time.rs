//! Clock-time arithmetic on a single shop-local day.
//!
//! Every comparison in the engine is reduced to minutes since local midnight.
//! `"HH:MM"` strings only exist at the boundary: parsed once on the way in,
//! formatted once on the way out.
//!
//! Intervals are half-open: `[start, end)`. Two intervals overlap iff
//! `a.start < b.end && b.start < a.end`, so an interval ending exactly when
//! another starts is NOT an overlap. [`TimeInterval::overlaps`] is the only
//! overlap test in the crate.

use crate::error::{EngineError, Result};

/// Minutes in one day. An interval may end exactly at midnight but not past it.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Last representable start-of-minute in a day (`23:59`).
pub const LAST_MINUTE: i64 = MINUTES_PER_DAY - 1;

/// Parse a zero-or-one-padded `"HH:MM"` clock time into minutes since midnight.
///
/// # Errors
/// Returns `EngineError::InvalidTimeFormat` for a missing colon, more than one
/// colon, empty or non-numeric parts, hour > 23 or minute > 59.
pub fn to_minutes(time: &str) -> Result<i64> {
    let invalid = || EngineError::InvalidTimeFormat(time.to_string());

    let (hours, minutes) = time.trim().split_once(':').ok_or_else(invalid)?;
    if minutes.contains(':') {
        return Err(invalid());
    }

    let hours = parse_component(hours).ok_or_else(invalid)?;
    let minutes = parse_component(minutes).ok_or_else(invalid)?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(hours * 60 + minutes)
}

// Digits only: `str::parse` alone would accept "+5".
fn parse_component(part: &str) -> Option<i64> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Format minutes since midnight as a zero-padded 24-hour `"HH:MM"` string.
///
/// # Errors
/// Returns `EngineError::OutOfRange` when `minutes` is outside `0..=1439`.
/// The value is never wrapped across midnight.
pub fn to_time_string(minutes: i64) -> Result<String> {
    if !(0..=LAST_MINUTE).contains(&minutes) {
        return Err(EngineError::OutOfRange(minutes));
    }
    Ok(format!("{:02}:{:02}", minutes / 60, minutes % 60))
}

/// A half-open `[start, end)` span of minutes within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeInterval {
    start: i64,
    end: i64,
}

impl TimeInterval {
    /// Build an interval from explicit bounds.
    ///
    /// # Errors
    /// - `OutOfRange` if `start` is negative, past the last minute of the
    ///   day, or `end < start`.
    /// - `UnsupportedCrossMidnightInterval` if `end` lies past midnight.
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if !(0..=LAST_MINUTE).contains(&start) {
            return Err(EngineError::OutOfRange(start));
        }
        if end < start {
            return Err(EngineError::OutOfRange(end));
        }
        if end > MINUTES_PER_DAY {
            return Err(EngineError::UnsupportedCrossMidnightInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build an interval from a start minute and a length in minutes.
    pub fn from_start(start: i64, duration_minutes: i64) -> Result<Self> {
        if duration_minutes < 0 {
            return Err(EngineError::OutOfRange(duration_minutes));
        }
        Self::new(start, start.saturating_add(duration_minutes))
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end - self.start
    }

    /// Whether the two intervals share at least one minute.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the intervals are adjacent: one ends exactly where the other begins.
    ///
    /// Touching intervals do not overlap. This exists for diagnostics only.
    pub fn touches(&self, other: &TimeInterval) -> bool {
        self.end == other.start || other.end == self.start
    }

    /// Whether `minute` lies inside `[start, end)`.
    pub fn contains_minute(&self, minute: i64) -> bool {
        self.start <= minute && minute < self.end
    }
}
