//! Candidate start-time grid for one working day.
//!
//! The grid starts at the opening minute and advances by a fixed step. The
//! close minute itself is never a candidate, and nothing here knows about
//! service length: fitting a service before closing is the filter's job.

use crate::model::OpeningHours;

/// Default spacing between offered start times, in minutes.
pub const DEFAULT_STEP_MINUTES: i64 = 15;

/// Generate candidate start minutes for a day with the given opening hours.
///
/// Returns an empty grid when `opening_hours` is absent or closed, and when
/// `step_minutes` is not positive (the configuration layer rejects that case
/// before it can reach here).
pub fn generate(opening_hours: Option<&OpeningHours>, step_minutes: i64) -> Vec<i64> {
    let Some(hours) = opening_hours.and_then(OpeningHours::hours) else {
        return Vec::new();
    };
    if step_minutes <= 0 {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    let mut candidate = hours.start();
    while candidate < hours.end() {
        candidates.push(candidate);
        candidate += step_minutes;
    }
    candidates
}

/// Whether `minute` is reachable from the opening minute in whole steps.
///
/// Says nothing about closing time; a late aligned minute is rejected by the
/// fit-before-close rule instead.
pub fn aligned_to_grid(opening_hours: &OpeningHours, minute: i64, step_minutes: i64) -> bool {
    match opening_hours.open_minute() {
        Some(open) if step_minutes > 0 => minute >= open && (minute - open) % step_minutes == 0,
        _ => false,
    }
}
