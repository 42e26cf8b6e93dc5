//! Typed constraint records consumed by the engine.
//!
//! Every record validates its invariants when it is built, either through a
//! constructor or through its serde record form (`#[serde(try_from = ...)]`).
//! Consumers never re-check shape; an invalid row cannot exist.

use chrono::{Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::time::{self, TimeInterval};

// ---------------------------------------------------------------------------
// Weekday indices (0 = Sunday ..= 6 = Saturday)
// ---------------------------------------------------------------------------

/// Convert a day index (0 = Sunday ..= 6 = Saturday) into a [`Weekday`].
pub fn weekday_from_index(index: u8) -> Result<Weekday> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(EngineError::InvalidDayOfWeek(other)),
    }
}

/// The day index (0 = Sunday ..= 6 = Saturday) of a [`Weekday`].
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

// ---------------------------------------------------------------------------
// OpeningHours
// ---------------------------------------------------------------------------

/// Weekly opening hours of one barber for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "OpeningHoursRecord")]
pub struct OpeningHours {
    pub barber_id: String,
    pub weekday: Weekday,
    /// `None` when the barber does not work this weekday.
    hours: Option<TimeInterval>,
}

impl OpeningHours {
    /// Opening hours from `"HH:MM"` strings.
    ///
    /// # Errors
    /// `InvalidTimeFormat` for malformed times, `InvalidOpeningHours` unless
    /// `open < close`.
    pub fn open(
        barber_id: impl Into<String>,
        weekday: Weekday,
        open_time: &str,
        close_time: &str,
    ) -> Result<Self> {
        let open = time::to_minutes(open_time)?;
        let close = time::to_minutes(close_time)?;
        Self::from_minutes(barber_id, weekday, open, close)
    }

    /// Opening hours from minute offsets.
    pub fn from_minutes(
        barber_id: impl Into<String>,
        weekday: Weekday,
        open_minute: i64,
        close_minute: i64,
    ) -> Result<Self> {
        if open_minute >= close_minute {
            return Err(EngineError::InvalidOpeningHours(format!(
                "open {} must be before close {}",
                open_minute, close_minute
            )));
        }
        if close_minute > time::LAST_MINUTE {
            return Err(EngineError::OutOfRange(close_minute));
        }
        Ok(Self {
            barber_id: barber_id.into(),
            weekday,
            hours: Some(TimeInterval::new(open_minute, close_minute)?),
        })
    }

    /// A weekday on which the barber does not work.
    pub fn closed(barber_id: impl Into<String>, weekday: Weekday) -> Self {
        Self {
            barber_id: barber_id.into(),
            weekday,
            hours: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.hours.is_none()
    }

    /// The working interval, `None` when closed.
    pub fn hours(&self) -> Option<TimeInterval> {
        self.hours
    }

    pub fn open_minute(&self) -> Option<i64> {
        self.hours.map(|h| h.start())
    }

    pub fn close_minute(&self) -> Option<i64> {
        self.hours.map(|h| h.end())
    }
}

#[derive(Deserialize)]
struct OpeningHoursRecord {
    barber_id: String,
    day_of_week: u8,
    #[serde(default)]
    open_time: Option<String>,
    #[serde(default)]
    close_time: Option<String>,
    #[serde(default)]
    is_closed: bool,
}

impl TryFrom<OpeningHoursRecord> for OpeningHours {
    type Error = EngineError;

    fn try_from(record: OpeningHoursRecord) -> Result<Self> {
        let weekday = weekday_from_index(record.day_of_week)?;
        // Times on a closed day are ignored, even when malformed.
        if record.is_closed {
            return Ok(Self::closed(record.barber_id, weekday));
        }
        match (record.open_time, record.close_time) {
            (Some(open), Some(close)) => Self::open(record.barber_id, weekday, &open, &close),
            _ => Err(EngineError::InvalidOpeningHours(
                "open_time and close_time are required unless is_closed".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// LunchBreak
// ---------------------------------------------------------------------------

/// A recurring daily break during which no service may run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "LunchBreakRecord")]
pub struct LunchBreak {
    pub barber_id: String,
    interval: TimeInterval,
    pub is_active: bool,
}

impl LunchBreak {
    /// An active lunch break starting at `start_time` (`"HH:MM"`).
    ///
    /// # Errors
    /// `InvalidTimeFormat`, `OutOfRange` for a negative duration, or
    /// `UnsupportedCrossMidnightInterval` if the break runs past midnight.
    pub fn new(barber_id: impl Into<String>, start_time: &str, duration_minutes: i64) -> Result<Self> {
        let start = time::to_minutes(start_time)?;
        Ok(Self {
            barber_id: barber_id.into(),
            interval: TimeInterval::from_start(start, duration_minutes)?,
            is_active: true,
        })
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }
}

#[derive(Deserialize)]
struct LunchBreakRecord {
    barber_id: String,
    start_time: String,
    duration_minutes: i64,
    #[serde(default = "default_true")]
    is_active: bool,
}

fn default_true() -> bool {
    true
}

impl TryFrom<LunchBreakRecord> for LunchBreak {
    type Error = EngineError;

    fn try_from(record: LunchBreakRecord) -> Result<Self> {
        Ok(Self::new(record.barber_id, &record.start_time, record.duration_minutes)?
            .with_active(record.is_active))
    }
}

// ---------------------------------------------------------------------------
// DateRange & Holiday
// ---------------------------------------------------------------------------

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// # Errors
    /// `InvalidDateRange` if `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(EngineError::InvalidDateRange(format!(
                "{} is before {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// `days` consecutive dates beginning at `start`.
    pub fn starting(start: NaiveDate, days: u32) -> Result<Self> {
        if days == 0 {
            return Err(EngineError::InvalidDateRange(
                "range must cover at least one day".to_string(),
            ));
        }
        let end = start
            .checked_add_signed(Duration::days(i64::from(days) - 1))
            .ok_or_else(|| EngineError::InvalidDateRange(format!("{} + {} days", start, days)))?;
        Self::new(start, end)
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the two ranges share at least one date.
    pub fn intersects(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Every date in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// A span of dates on which a barber takes no appointments at all.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "HolidayRecord")]
pub struct Holiday {
    pub barber_id: String,
    pub dates: DateRange,
    pub reason: Option<String>,
}

impl Holiday {
    pub fn new(
        barber_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            barber_id: barber_id.into(),
            dates: DateRange::new(start_date, end_date)?,
            reason,
        })
    }

    /// Whether `date` falls inside the inclusive holiday range.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.dates.contains(date)
    }
}

#[derive(Deserialize)]
struct HolidayRecord {
    barber_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default)]
    reason: Option<String>,
}

impl TryFrom<HolidayRecord> for Holiday {
    type Error = EngineError;

    fn try_from(record: HolidayRecord) -> Result<Self> {
        Self::new(
            record.barber_id,
            record.start_date,
            record.end_date,
            record.reason,
        )
    }
}

// ---------------------------------------------------------------------------
// ExistingBooking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    #[default]
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Only active bookings block a slot.
    pub fn is_active(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

/// An appointment already on a barber's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BookingRecord")]
pub struct ExistingBooking {
    pub barber_id: String,
    pub date: NaiveDate,
    interval: TimeInterval,
    pub status: BookingStatus,
}

impl ExistingBooking {
    /// # Errors
    /// `InvalidTimeFormat`, `InvalidServiceDuration` for a non-positive
    /// duration, or `UnsupportedCrossMidnightInterval`.
    pub fn new(
        barber_id: impl Into<String>,
        date: NaiveDate,
        start_time: &str,
        service_duration_minutes: i64,
        status: BookingStatus,
    ) -> Result<Self> {
        if service_duration_minutes <= 0 {
            return Err(EngineError::InvalidServiceDuration(service_duration_minutes));
        }
        let start = time::to_minutes(start_time)?;
        Ok(Self {
            barber_id: barber_id.into(),
            date,
            interval: TimeInterval::from_start(start, service_duration_minutes)?,
            status,
        })
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }
}

#[derive(Deserialize)]
struct BookingRecord {
    barber_id: String,
    date: NaiveDate,
    start_time: String,
    service_duration_minutes: i64,
    #[serde(default)]
    status: BookingStatus,
}

impl TryFrom<BookingRecord> for ExistingBooking {
    type Error = EngineError;

    fn try_from(record: BookingRecord) -> Result<Self> {
        Self::new(
            record.barber_id,
            record.date,
            &record.start_time,
            record.service_duration_minutes,
            record.status,
        )
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// The service being booked. Its duration is the span that must be free.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Service {
    id: String,
    duration_minutes: i64,
}

impl Service {
    /// # Errors
    /// `InvalidServiceDuration` unless `duration_minutes > 0`.
    pub fn new(id: impl Into<String>, duration_minutes: i64) -> Result<Self> {
        if duration_minutes <= 0 {
            return Err(EngineError::InvalidServiceDuration(duration_minutes));
        }
        Ok(Self {
            id: id.into(),
            duration_minutes,
        })
    }

    /// A service known only by its length.
    pub fn with_duration(duration_minutes: i64) -> Result<Self> {
        Self::new("", duration_minutes)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }
}
