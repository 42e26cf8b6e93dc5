//! Read seams against the persistence collaborator.
//!
//! The engine never queries storage directly. It asks a [`ConstraintSource`]
//! for already-filtered records: active lunch breaks only, non-cancelled
//! bookings only. That filtering is part of the adapter contract, not a
//! per-call policy.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{NaiveDate, Weekday};
use serde::Deserialize;
use thiserror::Error;

use crate::error::{ConstraintKind, EngineError, Result};
use crate::model::{DateRange, ExistingBooking, Holiday, LunchBreak, OpeningHours};

/// A constraint source failed to answer (network, storage, timeout...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct AdapterError(pub String);

impl AdapterError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub(crate) fn into_engine(self, kind: ConstraintKind) -> EngineError {
        EngineError::AdapterUnavailable {
            kind,
            reason: self.0,
        }
    }
}

pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Typed read access to the records that constrain a barber's availability.
///
/// Every call may be I/O. Implementations must be safe to call concurrently.
#[async_trait]
pub trait ConstraintSource: Send + Sync {
    /// Opening hours of `barber_id` on `weekday`, `None` if no row exists.
    async fn opening_hours(
        &self,
        barber_id: &str,
        weekday: Weekday,
    ) -> AdapterResult<Option<OpeningHours>>;

    /// Lunch breaks with `is_active == true`.
    async fn active_lunch_breaks(&self, barber_id: &str) -> AdapterResult<Vec<LunchBreak>>;

    /// Holidays intersecting `range`.
    async fn holidays(&self, barber_id: &str, range: DateRange) -> AdapterResult<Vec<Holiday>>;

    /// Non-cancelled bookings on `date`.
    async fn bookings(&self, barber_id: &str, date: NaiveDate)
        -> AdapterResult<Vec<ExistingBooking>>;
}

#[async_trait]
impl<S: ConstraintSource + ?Sized> ConstraintSource for Arc<S> {
    async fn opening_hours(
        &self,
        barber_id: &str,
        weekday: Weekday,
    ) -> AdapterResult<Option<OpeningHours>> {
        (**self).opening_hours(barber_id, weekday).await
    }

    async fn active_lunch_breaks(&self, barber_id: &str) -> AdapterResult<Vec<LunchBreak>> {
        (**self).active_lunch_breaks(barber_id).await
    }

    async fn holidays(&self, barber_id: &str, range: DateRange) -> AdapterResult<Vec<Holiday>> {
        (**self).holidays(barber_id, range).await
    }

    async fn bookings(
        &self,
        barber_id: &str,
        date: NaiveDate,
    ) -> AdapterResult<Vec<ExistingBooking>> {
        (**self).bookings(barber_id, date).await
    }
}

// ---------------------------------------------------------------------------
// In-memory source
// ---------------------------------------------------------------------------

/// Every constraint record of a shop, as loaded from a JSON document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShopSnapshot {
    pub opening_hours: Vec<OpeningHours>,
    pub lunch_breaks: Vec<LunchBreak>,
    pub holidays: Vec<Holiday>,
    pub bookings: Vec<ExistingBooking>,
}

impl ShopSnapshot {
    /// Parse and validate a snapshot document.
    ///
    /// # Errors
    /// `EngineError::Json` if the document is malformed or any record fails
    /// validation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A [`ConstraintSource`] over an in-process [`ShopSnapshot`].
///
/// Applies the adapter filtering contract itself. The snapshot can be
/// edited in place, which is how configuration changes are modelled.
#[derive(Debug, Default)]
pub struct InMemorySource {
    snapshot: RwLock<ShopSnapshot>,
}

impl InMemorySource {
    pub fn new(snapshot: ShopSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    /// Apply an edit to the backing snapshot.
    pub fn update<F>(&self, edit: F)
    where
        F: FnOnce(&mut ShopSnapshot),
    {
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        edit(&mut guard);
    }

    fn read<T>(&self, f: impl FnOnce(&ShopSnapshot) -> T) -> T {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

#[async_trait]
impl ConstraintSource for InMemorySource {
    async fn opening_hours(
        &self,
        barber_id: &str,
        weekday: Weekday,
    ) -> AdapterResult<Option<OpeningHours>> {
        Ok(self.read(|snap| {
            snap.opening_hours
                .iter()
                .find(|h| h.barber_id == barber_id && h.weekday == weekday)
                .cloned()
        }))
    }

    async fn active_lunch_breaks(&self, barber_id: &str) -> AdapterResult<Vec<LunchBreak>> {
        Ok(self.read(|snap| {
            snap.lunch_breaks
                .iter()
                .filter(|l| l.barber_id == barber_id && l.is_active)
                .cloned()
                .collect()
        }))
    }

    async fn holidays(&self, barber_id: &str, range: DateRange) -> AdapterResult<Vec<Holiday>> {
        Ok(self.read(|snap| {
            snap.holidays
                .iter()
                .filter(|h| h.barber_id == barber_id && h.dates.intersects(&range))
                .cloned()
                .collect()
        }))
    }

    async fn bookings(
        &self,
        barber_id: &str,
        date: NaiveDate,
    ) -> AdapterResult<Vec<ExistingBooking>> {
        Ok(self.read(|snap| {
            snap.bookings
                .iter()
                .filter(|b| b.barber_id == barber_id && b.date == date && b.status.is_active())
                .cloned()
                .collect()
        }))
    }
}
