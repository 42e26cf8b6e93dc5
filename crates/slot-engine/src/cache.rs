//! Memoization of per-day slot results.
//!
//! One [`AvailabilityCache`] is built by the caller for whatever lifetime it
//! wants (process, request) and handed to the engine as an `Arc`. There is no
//! hidden global cache.
//!
//! The key carries the grid step and a fingerprint of the active lunch
//! breaks, so engines with different steps can share one cache, and editing
//! a lunch break changes the key and can never serve a stale answer. Bookings,
//! holidays and opening hours are not part of the key; code paths that change
//! them must invalidate.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use crate::model::{LunchBreak, Service};
use crate::time::TimeInterval;

/// Canonical form of a set of lunch breaks: sorted, deduplicated intervals.
///
/// Two fingerprints are equal iff the breaks exclude exactly the same
/// minutes in the same pieces, whatever order the adapter returned them in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LunchFingerprint(Vec<TimeInterval>);

impl LunchFingerprint {
    pub fn of(lunch_breaks: &[LunchBreak]) -> Self {
        let mut intervals: Vec<TimeInterval> =
            lunch_breaks.iter().map(LunchBreak::interval).collect();
        intervals.sort();
        intervals.dedup();
        Self(intervals)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub barber_id: String,
    pub date: NaiveDate,
    pub service_id: String,
    pub service_duration: i64,
    /// Grid spacing of the engine that computed the entry.
    pub step_minutes: i64,
    pub lunch_fingerprint: LunchFingerprint,
}

impl CacheKey {
    pub fn new(
        barber_id: &str,
        date: NaiveDate,
        service: &Service,
        step_minutes: i64,
        lunch_breaks: &[LunchBreak],
    ) -> Self {
        Self {
            barber_id: barber_id.to_string(),
            date,
            service_id: service.id().to_string(),
            service_duration: service.duration_minutes(),
            step_minutes,
            lunch_fingerprint: LunchFingerprint::of(lunch_breaks),
        }
    }
}

/// Last-write-wins map from [`CacheKey`] to available start minutes.
///
/// No TTL: a caller that wants expiry wraps this type. The only guarantee is
/// that after `put(k, v)` every `get(k)` returns `v` until an invalidation
/// touching `k`.
#[derive(Debug, Default)]
pub struct AvailabilityCache {
    entries: Mutex<HashMap<CacheKey, Vec<i64>>>,
}

impl AvailabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    // The map holds plain values; a panic mid-insert cannot leave it torn.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Vec<i64>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<i64>> {
        self.lock().get(key).cloned()
    }

    pub fn put(&self, key: CacheKey, slots: Vec<i64>) {
        self.lock().insert(key, slots);
    }

    /// Drop every entry. Idempotent.
    pub fn invalidate_all(&self) {
        self.lock().clear();
    }

    /// Drop every entry whose key matches `predicate`. Returns how many went.
    pub fn invalidate_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&CacheKey) -> bool,
    {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        before - entries.len()
    }

    /// Drop everything cached for one barber, e.g. after an opening-hours edit.
    pub fn invalidate_barber(&self, barber_id: &str) -> usize {
        self.invalidate_where(|key| key.barber_id == barber_id)
    }

    /// Drop one barber's entries for one date, e.g. after a booking lands.
    pub fn invalidate_date(&self, barber_id: &str, date: NaiveDate) -> usize {
        self.invalidate_where(|key| key.barber_id == barber_id && key.date == date)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
