//! Tests for the synchronous pipeline: grid generation, exclusion filter and
//! the single-day composition.

use chrono::{NaiveDate, Weekday};
use slot_engine::day::{available_slots, check_start, DayConstraints, SlotDecision};
use slot_engine::error::EngineError;
use slot_engine::filter::{self, Rejection};
use slot_engine::model::{BookingStatus, ExistingBooking, LunchBreak, OpeningHours};
use slot_engine::slots::{self, DEFAULT_STEP_MINUTES};
use slot_engine::time::{to_minutes, to_time_string};

// ── Helpers ─────────────────────────────────────────────────────────────────

const STEP: i64 = DEFAULT_STEP_MINUTES;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn hours(open: &str, close: &str) -> OpeningHours {
    OpeningHours::open("b1", Weekday::Mon, open, close).unwrap()
}

fn booking(start: &str, minutes: i64) -> ExistingBooking {
    ExistingBooking::new("b1", date(), start, minutes, BookingStatus::Confirmed).unwrap()
}

fn lunch(start: &str, minutes: i64) -> LunchBreak {
    LunchBreak::new("b1", start, minutes).unwrap()
}

fn open_day(open: &str, close: &str) -> DayConstraints {
    DayConstraints {
        opening_hours: Some(hours(open, close)),
        ..DayConstraints::default()
    }
}

fn labels(minutes: &[i64]) -> Vec<String> {
    minutes.iter().map(|m| to_time_string(*m).unwrap()).collect()
}

fn has(slots: &[String], t: &str) -> bool {
    slots.iter().any(|s| s == t)
}

// ── SlotGenerator ───────────────────────────────────────────────────────────

#[test]
fn grid_starts_at_open_and_excludes_close() {
    let grid = slots::generate(Some(&hours("09:00", "10:00")), STEP);
    assert_eq!(labels(&grid), ["09:00", "09:15", "09:30", "09:45"]);
}

#[test]
fn grid_with_uneven_close_stops_before_close() {
    let grid = slots::generate(Some(&hours("09:00", "09:40")), STEP);
    assert_eq!(labels(&grid), ["09:00", "09:15", "09:30"]);
}

#[test]
fn closed_or_missing_hours_produce_no_grid() {
    let closed = OpeningHours::closed("b1", Weekday::Sun);
    assert!(slots::generate(Some(&closed), STEP).is_empty());
    assert!(slots::generate(None, STEP).is_empty());
}

#[test]
fn grid_step_is_independent_of_service() {
    let grid = slots::generate(Some(&hours("09:00", "11:00")), 30);
    assert_eq!(labels(&grid), ["09:00", "09:30", "10:00", "10:30"]);
}

#[test]
fn non_positive_step_produces_no_grid() {
    assert!(slots::generate(Some(&hours("09:00", "11:00")), 0).is_empty());
}

// ── AvailabilityFilter ──────────────────────────────────────────────────────

#[test]
fn filter_rejects_non_positive_duration() {
    let grid = slots::generate(Some(&hours("09:00", "17:00")), STEP);
    assert!(matches!(
        filter::filter(&grid, 0, 1020, &[], &[]),
        Err(EngineError::InvalidServiceDuration(0))
    ));
    assert!(matches!(
        filter::filter(&[], -15, 1020, &[], &[]),
        Err(EngineError::InvalidServiceDuration(-15))
    ));
}

#[test]
fn filter_checks_every_booking_and_lunch() {
    // Bookings first, lunch later in the day: a slot must clear both lists.
    let grid = slots::generate(Some(&hours("09:00", "12:00")), STEP);
    let bookings = [booking("09:00", 30), booking("10:00", 30)];
    let lunches = [lunch("11:00", 30), lunch("11:45", 15)];

    let result = filter::filter(&grid, 30, to_minutes("12:00").unwrap(), &bookings, &lunches).unwrap();

    assert_eq!(labels(&result), ["09:30", "10:30"]);
}

#[test]
fn check_candidate_reports_first_failing_rule_in_order() {
    let close = to_minutes("17:00").unwrap();
    let bookings = [booking("16:30", 30)];
    let lunches = [lunch("16:30", 30)];

    // Past closing wins over the booking at the same time.
    assert_eq!(
        filter::check_candidate(to_minutes("16:45").unwrap(), 30, close, &bookings, &lunches).unwrap(),
        Some(Rejection::PastClosing { close_minute: close })
    );
    // Booking wins over lunch.
    assert_eq!(
        filter::check_candidate(to_minutes("16:15").unwrap(), 30, close, &bookings, &lunches).unwrap(),
        Some(Rejection::BookingConflict {
            booking_start: to_minutes("16:30").unwrap()
        })
    );
    assert_eq!(
        filter::check_candidate(to_minutes("16:00").unwrap(), 30, close, &bookings, &lunches).unwrap(),
        None
    );
}

// ── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn scenario_a_service_must_fit_before_close() {
    let day = open_day("09:00", "17:00");
    let slots = labels(&available_slots(&day, 60, STEP).unwrap());

    assert!(has(&slots, "09:00"));
    assert!(has(&slots, "16:00"));
    assert!(!has(&slots, "16:15"));
    assert!(!has(&slots, "16:45"));
    assert!(!has(&slots, "17:00"));
    assert_eq!(slots.last().map(String::as_str), Some("16:00"));
}

#[test]
fn scenario_b_lunch_break_is_half_open() {
    let mut day = open_day("09:00", "17:00");
    day.lunch_breaks = vec![lunch("12:00", 60)];
    let slots = labels(&available_slots(&day, 30, STEP).unwrap());

    assert!(has(&slots, "11:30"), "ends exactly at lunch start");
    assert!(!has(&slots, "11:45"), "runs into lunch");
    assert!(!has(&slots, "12:00"));
    assert!(!has(&slots, "12:30"), "inside lunch [12:00, 13:00)");
    assert!(has(&slots, "13:00"), "starts exactly at lunch end");
}

#[test]
fn scenario_c_booking_boundaries() {
    let mut day = open_day("09:00", "17:00");
    day.bookings = vec![booking("10:00", 45)];
    let slots = labels(&available_slots(&day, 30, STEP).unwrap());

    assert!(has(&slots, "09:30"), "ends exactly at booking start");
    assert!(!has(&slots, "09:45"), "ends 10:15, overlaps");
    assert!(!has(&slots, "10:00"));
    assert!(!has(&slots, "10:30"), "starts inside the booking");
    assert!(has(&slots, "10:45"), "starts exactly at booking end");
}

#[test]
fn holiday_day_has_no_slots_whatever_the_hours() {
    let mut day = open_day("09:00", "17:00");
    day.on_holiday = true;
    assert!(available_slots(&day, 30, STEP).unwrap().is_empty());
}

#[test]
fn holiday_does_not_hide_invalid_duration() {
    let day = DayConstraints {
        on_holiday: true,
        ..DayConstraints::default()
    };
    assert!(matches!(
        available_slots(&day, 0, STEP),
        Err(EngineError::InvalidServiceDuration(0))
    ));
}

#[test]
fn service_longer_than_the_day_has_no_slots() {
    let day = open_day("09:00", "10:00");
    assert!(available_slots(&day, 90, STEP).unwrap().is_empty());
}

#[test]
fn fully_booked_day_is_empty_not_an_error() {
    let mut day = open_day("09:00", "12:00");
    day.bookings = vec![booking("09:00", 180)];
    assert_eq!(available_slots(&day, 15, STEP).unwrap(), Vec::<i64>::new());
}

// ── check_start ─────────────────────────────────────────────────────────────

#[test]
fn check_start_explains_each_rejection() {
    let mut day = open_day("09:00", "17:00");
    day.bookings = vec![booking("10:00", 45)];
    day.lunch_breaks = vec![lunch("12:00", 60)];
    let at = |t: &str| check_start(&day, to_minutes(t).unwrap(), 30, STEP).unwrap();

    assert_eq!(at("09:00"), SlotDecision::Available);
    assert_eq!(at("08:45"), SlotDecision::BeforeOpening { open_minute: 540 });
    assert_eq!(at("09:10"), SlotDecision::OffGrid { step_minutes: STEP });
    assert_eq!(
        at("10:15"),
        SlotDecision::Rejected(Rejection::BookingConflict { booking_start: 600 })
    );
    assert_eq!(
        at("12:30"),
        SlotDecision::Rejected(Rejection::LunchConflict { lunch_start: 720 })
    );
    assert_eq!(
        at("16:45"),
        SlotDecision::Rejected(Rejection::PastClosing { close_minute: 1020 })
    );
    assert_eq!(
        at("17:00"),
        SlotDecision::Rejected(Rejection::PastClosing { close_minute: 1020 })
    );
}

#[test]
fn check_start_gates_holiday_and_closed_days() {
    let holiday = DayConstraints {
        on_holiday: true,
        opening_hours: Some(hours("09:00", "17:00")),
        ..DayConstraints::default()
    };
    assert_eq!(check_start(&holiday, 600, 30, STEP).unwrap(), SlotDecision::Holiday);

    let closed = DayConstraints {
        opening_hours: Some(OpeningHours::closed("b1", Weekday::Mon)),
        ..DayConstraints::default()
    };
    assert_eq!(check_start(&closed, 600, 30, STEP).unwrap(), SlotDecision::Closed);
    assert_eq!(
        check_start(&DayConstraints::default(), 600, 30, STEP).unwrap(),
        SlotDecision::Closed
    );
}

#[test]
fn check_start_rejects_minutes_outside_the_day() {
    let day = open_day("09:00", "17:00");
    assert!(matches!(
        check_start(&day, 1440, 30, STEP),
        Err(EngineError::OutOfRange(1440))
    ));
}

#[test]
fn check_start_agrees_with_available_slots() {
    let mut day = open_day("08:30", "18:00");
    day.bookings = vec![booking("09:15", 30), booking("14:00", 60)];
    day.lunch_breaks = vec![lunch("12:00", 45)];
    let slots = available_slots(&day, 45, STEP).unwrap();

    for minute in 0..=1439 {
        let decision = check_start(&day, minute, 45, STEP).unwrap();
        assert_eq!(
            decision.is_available(),
            slots.contains(&minute),
            "disagreement at {}",
            to_time_string(minute).unwrap()
        );
    }
}

#[test]
fn decision_serializes_with_flat_tags() {
    let json = serde_json::to_value(SlotDecision::Rejected(Rejection::LunchConflict {
        lunch_start: 720,
    }))
    .unwrap();
    assert_eq!(json["decision"], "rejected");
    assert_eq!(json["reason"], "lunch_conflict");
    assert_eq!(json["lunch_start"], 720);
}
