//! Exclusion rules applied to the candidate grid.
//!
//! Each candidate `c` for a service of length `d` is checked, in order:
//!
//! 1. fit-before-close: `c + d` must not pass the close minute;
//! 2. booking conflict: `[c, c + d)` must not overlap any active booking;
//! 3. lunch conflict: `[c, c + d)` must not overlap any active lunch break.
//!
//! Holidays are not handled here. They gate the whole day before the grid is
//! generated (see [`crate::day`]).

use serde::Serialize;
use tracing::trace;

use crate::error::{EngineError, Result};
use crate::model::{ExistingBooking, LunchBreak};
use crate::time::TimeInterval;

/// Why a candidate start time was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// The service would still be running at closing time.
    PastClosing { close_minute: i64 },
    /// Overlaps the booking starting at `booking_start`.
    BookingConflict { booking_start: i64 },
    /// Overlaps the lunch break starting at `lunch_start`.
    LunchConflict { lunch_start: i64 },
}

pub(crate) fn validate_duration(service_duration: i64) -> Result<()> {
    if service_duration <= 0 {
        return Err(EngineError::InvalidServiceDuration(service_duration));
    }
    Ok(())
}

/// Run the rule chain for one candidate and return the first rule it breaks.
///
/// # Errors
/// `InvalidServiceDuration` unless `service_duration > 0`.
pub fn check_candidate(
    candidate: i64,
    service_duration: i64,
    close_minute: i64,
    bookings: &[ExistingBooking],
    lunch_breaks: &[LunchBreak],
) -> Result<Option<Rejection>> {
    validate_duration(service_duration)?;

    if candidate.saturating_add(service_duration) > close_minute {
        return Ok(Some(Rejection::PastClosing { close_minute }));
    }

    let slot = TimeInterval::from_start(candidate, service_duration)?;

    for booking in bookings {
        let busy = booking.interval();
        if slot.overlaps(&busy) {
            return Ok(Some(Rejection::BookingConflict {
                booking_start: busy.start(),
            }));
        }
        if slot.touches(&busy) {
            trace!(candidate, booking_start = busy.start(), "slot touches booking");
        }
    }

    for lunch in lunch_breaks {
        let busy = lunch.interval();
        if slot.overlaps(&busy) {
            return Ok(Some(Rejection::LunchConflict {
                lunch_start: busy.start(),
            }));
        }
        if slot.touches(&busy) {
            trace!(candidate, lunch_start = busy.start(), "slot touches lunch break");
        }
    }

    Ok(None)
}

/// Keep the candidates that pass every rule, preserving their order.
///
/// # Errors
/// `InvalidServiceDuration` unless `service_duration > 0`, even when
/// `candidates` is empty.
pub fn filter(
    candidates: &[i64],
    service_duration: i64,
    close_minute: i64,
    bookings: &[ExistingBooking],
    lunch_breaks: &[LunchBreak],
) -> Result<Vec<i64>> {
    validate_duration(service_duration)?;

    let mut available = Vec::with_capacity(candidates.len());
    for &candidate in candidates {
        match check_candidate(candidate, service_duration, close_minute, bookings, lunch_breaks)? {
            None => available.push(candidate),
            Some(rejection) => trace!(candidate, ?rejection, "candidate excluded"),
        }
    }
    Ok(available)
}
