//! Outbound operations: slot listing, start-time validation, single-date checks.
//!
//! [`AvailabilityEngine`] owns a [`ConstraintSource`], the [`EngineConfig`] and
//! an optional shared [`AvailabilityCache`]. Gates run cheapest first: the
//! holiday lookup, then the weekday's opening hours, and only then the
//! booking fetch and the full slot pipeline.
//!
//! Batch date resolution lives in [`crate::resolver`].

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::{debug, instrument, warn};

use crate::cache::{AvailabilityCache, CacheKey};
use crate::config::EngineConfig;
use crate::day::{self, DayConstraints, SlotDecision};
use crate::error::{ConstraintKind, EngineError, Result};
use crate::model::{DateRange, ExistingBooking, Holiday, LunchBreak, OpeningHours, Service};
use crate::source::{AdapterError, ConstraintSource};
use crate::time;

/// The availability engine. Read-path only: it never writes a record.
pub struct AvailabilityEngine<S> {
    pub(crate) source: S,
    pub(crate) config: EngineConfig,
    pub(crate) cache: Option<Arc<AvailabilityCache>>,
}

pub(crate) fn adapter_failure(kind: ConstraintKind) -> impl FnOnce(AdapterError) -> EngineError {
    move |err| {
        warn!(%kind, error = %err, "constraint source unavailable");
        err.into_engine(kind)
    }
}

impl<S: ConstraintSource> AvailabilityEngine<S> {
    /// Build an engine without a cache.
    ///
    /// # Errors
    /// `InvalidConfig` if `config` fails validation.
    pub fn new(source: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            cache: None,
        })
    }

    /// Share `cache` with this engine. The caller keeps its own handle to
    /// invalidate on configuration changes.
    pub fn with_cache(mut self, cache: Arc<AvailabilityCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&Arc<AvailabilityCache>> {
        self.cache.as_ref()
    }

    /// Bookable start times for `barber_id` on `date`, as ascending `"HH:MM"`.
    ///
    /// An empty list means the day is legitimately unavailable (holiday,
    /// closed, or fully booked). A constraint source failure is an
    /// `AdapterUnavailable` error instead, never an empty list.
    #[instrument(skip(self, service), fields(duration = service.duration_minutes()))]
    pub async fn compute_available_slots(
        &self,
        barber_id: &str,
        date: NaiveDate,
        service: &Service,
    ) -> Result<Vec<String>> {
        self.slot_minutes(barber_id, date, service)
            .await?
            .into_iter()
            .map(time::to_time_string)
            .collect()
    }

    /// Bookable start minutes for one date, running the gates in order.
    pub async fn slot_minutes(
        &self,
        barber_id: &str,
        date: NaiveDate,
        service: &Service,
    ) -> Result<Vec<i64>> {
        let Some(opening) = self.open_hours_for(barber_id, date).await? else {
            return Ok(Vec::new());
        };
        let lunch_breaks = self.lunch_breaks(barber_id).await?;
        self.evaluate_open_day(barber_id, date, &opening, &lunch_breaks, service)
            .await
    }

    /// Whether `barber_id` has at least one open slot on `date`.
    #[instrument(skip(self, service), fields(duration = service.duration_minutes()))]
    pub async fn is_date_available(
        &self,
        barber_id: &str,
        date: NaiveDate,
        service: &Service,
    ) -> Result<bool> {
        Ok(!self.slot_minutes(barber_id, date, service).await?.is_empty())
    }

    /// Validate a proposed `"HH:MM"` start time and say why it is rejected.
    ///
    /// Always reads through to the constraint source; the cache is never
    /// consulted on this path.
    ///
    /// # Errors
    /// `InvalidTimeFormat` for a malformed `start_time`, and
    /// `AdapterUnavailable` when a constraint source fails.
    #[instrument(skip(self, service), fields(duration = service.duration_minutes()))]
    pub async fn check_start_time(
        &self,
        barber_id: &str,
        date: NaiveDate,
        start_time: &str,
        service: &Service,
    ) -> Result<SlotDecision> {
        let start = time::to_minutes(start_time)?;
        let day = self.load_day(barber_id, date).await?;
        day::check_start(
            &day,
            start,
            service.duration_minutes(),
            self.config.step_minutes,
        )
    }

    /// Fetch every constraint for one date, skipping fetches a gate makes moot.
    pub async fn load_day(&self, barber_id: &str, date: NaiveDate) -> Result<DayConstraints> {
        if self.on_holiday(barber_id, date).await? {
            return Ok(DayConstraints {
                on_holiday: true,
                ..DayConstraints::default()
            });
        }

        let opening_hours = self.fetch_opening_hours(barber_id, date.weekday()).await?;
        if opening_hours.as_ref().map_or(true, OpeningHours::is_closed) {
            return Ok(DayConstraints {
                opening_hours,
                ..DayConstraints::default()
            });
        }

        let (bookings, lunch_breaks) = tokio::try_join!(
            self.fetch_bookings(barber_id, date),
            self.lunch_breaks(barber_id),
        )?;

        Ok(DayConstraints {
            on_holiday: false,
            opening_hours,
            bookings,
            lunch_breaks,
        })
    }

    // -----------------------------------------------------------------------
    // Gates and fetches shared with the resolver
    // -----------------------------------------------------------------------

    /// Opening hours for `date` if the day passes both cheap gates.
    async fn open_hours_for(&self, barber_id: &str, date: NaiveDate) -> Result<Option<OpeningHours>> {
        if self.on_holiday(barber_id, date).await? {
            debug!(%date, "holiday, no slots");
            return Ok(None);
        }
        let opening = self
            .fetch_opening_hours(barber_id, date.weekday())
            .await?
            .filter(|h| !h.is_closed());
        if opening.is_none() {
            debug!(%date, "closed weekday, no slots");
        }
        Ok(opening)
    }

    pub(crate) async fn fetch_holidays(
        &self,
        barber_id: &str,
        range: DateRange,
    ) -> Result<Vec<Holiday>> {
        self.source
            .holidays(barber_id, range)
            .await
            .map_err(adapter_failure(ConstraintKind::Holidays))
    }

    async fn on_holiday(&self, barber_id: &str, date: NaiveDate) -> Result<bool> {
        let holidays = self.fetch_holidays(barber_id, DateRange::single(date)).await?;
        Ok(holidays.iter().any(|h| h.covers(date)))
    }

    pub(crate) async fn fetch_opening_hours(
        &self,
        barber_id: &str,
        weekday: Weekday,
    ) -> Result<Option<OpeningHours>> {
        self.source
            .opening_hours(barber_id, weekday)
            .await
            .map_err(adapter_failure(ConstraintKind::OpeningHours))
    }

    async fn fetch_bookings(
        &self,
        barber_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<ExistingBooking>> {
        self.source
            .bookings(barber_id, date)
            .await
            .map_err(adapter_failure(ConstraintKind::Bookings))
    }

    pub(crate) async fn lunch_breaks(&self, barber_id: &str) -> Result<Vec<LunchBreak>> {
        self.source
            .active_lunch_breaks(barber_id)
            .await
            .map_err(adapter_failure(ConstraintKind::LunchBreaks))
    }

    /// Run the full pipeline for a day that already passed both gates,
    /// consulting and filling the cache.
    pub(crate) async fn evaluate_open_day(
        &self,
        barber_id: &str,
        date: NaiveDate,
        opening: &OpeningHours,
        lunch_breaks: &[LunchBreak],
        service: &Service,
    ) -> Result<Vec<i64>> {
        let key = self
            .cache
            .as_ref()
            .map(|_| {
                CacheKey::new(barber_id, date, service, self.config.step_minutes, lunch_breaks)
            });
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                debug!(%date, slots = hit.len(), "cache hit");
                return Ok(hit);
            }
            debug!(%date, "cache miss");
        }

        let bookings = self.fetch_bookings(barber_id, date).await?;

        let day = DayConstraints {
            on_holiday: false,
            opening_hours: Some(opening.clone()),
            bookings,
            lunch_breaks: lunch_breaks.to_vec(),
        };
        let slots = day::available_slots(&day, service.duration_minutes(), self.config.step_minutes)?;
        debug!(%date, slots = slots.len(), "computed slots");

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.put(key, slots.clone());
        }
        Ok(slots)
    }
}
