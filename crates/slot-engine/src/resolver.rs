//! Batch availability over a range of dates, for date-picker disabling.
//!
//! Per date, cheapest check first:
//!
//! 1. holiday gate (one holiday fetch covers the whole range);
//! 2. opening hours for the weekday (fetched once per distinct weekday);
//! 3. the full slot pipeline, only for dates that passed both gates.
//!
//! Dates share no mutable state and run concurrently, bounded by
//! [`EngineConfig::max_concurrent_days`](crate::EngineConfig). A batch is
//! all-or-nothing: any adapter failure or a cancellation discards every
//! partial answer.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Weekday};
use futures_util::future::try_join_all;
use futures_util::{stream, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::engine::AvailabilityEngine;
use crate::error::{EngineError, Result};
use crate::model::{DateRange, OpeningHours, Service};
use crate::source::ConstraintSource;

impl<S: ConstraintSource> AvailabilityEngine<S> {
    /// Map every date in `range` to whether it has at least one open slot.
    #[instrument(skip(self, service), fields(duration = service.duration_minutes()))]
    pub async fn resolve_availability_for_range(
        &self,
        barber_id: &str,
        range: DateRange,
        service: &Service,
    ) -> Result<BTreeMap<NaiveDate, bool>> {
        self.resolve_range(barber_id, range, service).await
    }

    /// Like [`resolve_availability_for_range`](Self::resolve_availability_for_range),
    /// abandoned as soon as `cancel` fires.
    ///
    /// Cancelling drops every in-flight adapter call and returns
    /// `EngineError::Cancelled`; no partial map is ever returned.
    pub async fn resolve_availability_for_range_with_cancel(
        &self,
        barber_id: &str,
        range: DateRange,
        service: &Service,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<NaiveDate, bool>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(barber_id, "range resolution cancelled");
                Err(EngineError::Cancelled)
            }
            result = self.resolve_range(barber_id, range, service) => result,
        }
    }

    /// The earliest date in `[from, from + horizon_days)` with an open slot.
    ///
    /// `horizon_days` defaults to [`EngineConfig::default_horizon_days`](crate::EngineConfig).
    #[instrument(skip(self, service), fields(duration = service.duration_minutes()))]
    pub async fn first_available_date(
        &self,
        barber_id: &str,
        from: NaiveDate,
        horizon_days: Option<u32>,
        service: &Service,
    ) -> Result<Option<NaiveDate>> {
        let days = horizon_days.unwrap_or(self.config.default_horizon_days);
        let range = DateRange::starting(from, days)?;
        let resolved = self.resolve_range(barber_id, range, service).await?;
        Ok(resolved
            .into_iter()
            .find_map(|(date, available)| available.then_some(date)))
    }

    async fn resolve_range(
        &self,
        barber_id: &str,
        range: DateRange,
        service: &Service,
    ) -> Result<BTreeMap<NaiveDate, bool>> {
        let holidays = self.fetch_holidays(barber_id, range).await?;
        let weekly = self.weekly_hours(barber_id, range).await?;

        let mut resolved = BTreeMap::new();
        let mut open_days: Vec<(NaiveDate, &OpeningHours)> = Vec::new();
        for date in range.days() {
            if holidays.iter().any(|h| h.covers(date)) {
                debug!(%date, "holiday");
                resolved.insert(date, false);
                continue;
            }
            match weekly.get(&date.weekday()).and_then(Option::as_ref) {
                Some(hours) if !hours.is_closed() => open_days.push((date, hours)),
                _ => {
                    debug!(%date, "closed weekday");
                    resolved.insert(date, false);
                }
            }
        }

        if open_days.is_empty() {
            return Ok(resolved);
        }

        let lunch_breaks = self.lunch_breaks(barber_id).await?;
        let lunch_breaks = lunch_breaks.as_slice();

        let evaluated: Vec<(NaiveDate, bool)> = stream::iter(open_days)
            .map(move |(date, hours)| async move {
                let slots = self
                    .evaluate_open_day(barber_id, date, hours, lunch_breaks, service)
                    .await?;
                Ok::<_, EngineError>((date, !slots.is_empty()))
            })
            .buffered(self.config.max_concurrent_days)
            .try_collect()
            .await?;

        resolved.extend(evaluated);
        Ok(resolved)
    }

    /// Opening hours for every distinct weekday in `range`, fetched concurrently.
    async fn weekly_hours(
        &self,
        barber_id: &str,
        range: DateRange,
    ) -> Result<HashMap<Weekday, Option<OpeningHours>>> {
        let weekdays: Vec<Weekday> = range
            .days()
            .take(7)
            .map(|date| date.weekday())
            .collect();

        let fetched = try_join_all(weekdays.into_iter().map(move |weekday| async move {
            let hours = self.fetch_opening_hours(barber_id, weekday).await?;
            Ok::<_, EngineError>((weekday, hours))
        }))
        .await?;

        Ok(fetched.into_iter().collect())
    }
}
