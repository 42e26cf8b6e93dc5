//! # slot-engine
//!
//! Deterministic appointment availability for a barbershop booking system.
//!
//! Given a barber, a date, a service length and the shop's constraint
//! records (weekly opening hours, lunch breaks, holidays, existing bookings),
//! the engine computes the bookable start times, validates one proposed start
//! time, and batch-resolves which dates in a window have any opening at all.
//! It is read-path only: it owns no storage and writes no records.
//!
//! ## Modules
//!
//! - [`time`] — `"HH:MM"` ⇄ minute offsets, half-open intervals, the one overlap rule
//! - [`model`] — Validated constraint records (opening hours, lunch, holidays, bookings, services)
//! - [`source`] — Async read seams against the persistence collaborator, plus an in-memory source
//! - [`slots`] — Candidate start-time grid from opening hours
//! - [`filter`] — Fit-before-close, booking and lunch exclusion rules
//! - [`day`] — Single-day pipeline: holiday gate → grid → filter
//! - [`engine`] — Outbound operations over a constraint source
//! - [`resolver`] — Concurrent, cancellable date-range resolution
//! - [`cache`] — Explicit, injectable memoization of per-day results
//! - [`config`] — Engine tunables
//! - [`error`] — Error types

pub mod cache;
pub mod config;
pub mod day;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod resolver;
pub mod slots;
pub mod source;
pub mod time;

pub use cache::{AvailabilityCache, CacheKey, LunchFingerprint};
pub use config::EngineConfig;
pub use day::{available_slots, check_start, DayConstraints, SlotDecision};
pub use engine::AvailabilityEngine;
pub use error::{ConstraintKind, EngineError};
pub use filter::Rejection;
pub use model::{
    BookingStatus, DateRange, ExistingBooking, Holiday, LunchBreak, OpeningHours, Service,
};
pub use source::{AdapterError, ConstraintSource, InMemorySource, ShopSnapshot};
pub use time::{to_minutes, to_time_string, TimeInterval};
