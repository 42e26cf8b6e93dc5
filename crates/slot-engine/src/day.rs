//! The single-day pipeline: holiday gate, grid generation, exclusion filter.
//!
//! This is the one synchronous composition every async path in the crate
//! goes through, so slot listing, start-time validation and date resolution
//! can never disagree.

use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::filter::{self, Rejection};
use crate::model::{ExistingBooking, LunchBreak, OpeningHours};
use crate::slots;
use crate::time;

/// Everything that constrains one barber on one date.
#[derive(Debug, Clone, Default)]
pub struct DayConstraints {
    /// The date falls inside at least one holiday range.
    pub on_holiday: bool,
    pub opening_hours: Option<OpeningHours>,
    pub bookings: Vec<ExistingBooking>,
    pub lunch_breaks: Vec<LunchBreak>,
}

/// Outcome of validating one proposed start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum SlotDecision {
    Available,
    /// The barber is on holiday that day.
    Holiday,
    /// No opening hours, or the weekday is marked closed.
    Closed,
    BeforeOpening { open_minute: i64 },
    /// Not on the step grid offered to customers.
    OffGrid { step_minutes: i64 },
    Rejected(Rejection),
}

impl SlotDecision {
    pub fn is_available(&self) -> bool {
        matches!(self, SlotDecision::Available)
    }
}

/// Bookable start minutes for `day`, ascending.
///
/// # Errors
/// `InvalidServiceDuration` unless `service_duration > 0`. This is checked
/// before the holiday gate: bad input never hides behind an empty day.
pub fn available_slots(
    day: &DayConstraints,
    service_duration: i64,
    step_minutes: i64,
) -> Result<Vec<i64>> {
    filter::validate_duration(service_duration)?;

    if day.on_holiday {
        return Ok(Vec::new());
    }
    let Some(hours) = day.opening_hours.as_ref().and_then(OpeningHours::hours) else {
        return Ok(Vec::new());
    };

    let candidates = slots::generate(day.opening_hours.as_ref(), step_minutes);
    filter::filter(
        &candidates,
        service_duration,
        hours.end(),
        &day.bookings,
        &day.lunch_breaks,
    )
}

/// Validate one proposed start minute against the same rules as
/// [`available_slots`].
///
/// `Available` is returned exactly when `start` would appear in
/// [`available_slots`] for the same inputs.
///
/// # Errors
/// `InvalidServiceDuration` unless `service_duration > 0`; `OutOfRange` when
/// `start` is not a minute of the day.
pub fn check_start(
    day: &DayConstraints,
    start: i64,
    service_duration: i64,
    step_minutes: i64,
) -> Result<SlotDecision> {
    filter::validate_duration(service_duration)?;
    if !(0..=time::LAST_MINUTE).contains(&start) {
        return Err(EngineError::OutOfRange(start));
    }

    if day.on_holiday {
        return Ok(SlotDecision::Holiday);
    }
    let Some(opening) = day.opening_hours.as_ref() else {
        return Ok(SlotDecision::Closed);
    };
    let Some(hours) = opening.hours() else {
        return Ok(SlotDecision::Closed);
    };

    if start < hours.start() {
        return Ok(SlotDecision::BeforeOpening {
            open_minute: hours.start(),
        });
    }
    if !slots::aligned_to_grid(opening, start, step_minutes) {
        return Ok(SlotDecision::OffGrid { step_minutes });
    }

    let rejection = filter::check_candidate(
        start,
        service_duration,
        hours.end(),
        &day.bookings,
        &day.lunch_breaks,
    )?;
    Ok(match rejection {
        None => SlotDecision::Available,
        Some(r) => SlotDecision::Rejected(r),
    })
}
