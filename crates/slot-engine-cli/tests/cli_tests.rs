//! Integration tests for the `slots` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to run every subcommand
//! through the actual binary against `tests/fixtures/shop.json`, including
//! stdin input, config files, environment overrides and error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the shop.json fixture.
fn shop_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/shop.json")
}

/// Helper: path to the config.json fixture (30-minute grid).
fn config_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/config.json")
}

/// Helper: a `slots` command with no inherited engine overrides.
fn slots() -> Command {
    let mut cmd = Command::cargo_bin("slots").unwrap();
    cmd.env_remove("SLOTS_STEP_MINUTES")
        .env_remove("SLOTS_MAX_CONCURRENT_DAYS")
        .env_remove("SLOTS_HORIZON_DAYS")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper: run `slots slots` for b1 on Monday 2026-03-16 and parse the list.
fn monday_slots(duration: &str) -> Vec<String> {
    let output = slots()
        .args(["slots", "--snapshot", shop_path(), "--barber", "b1"])
        .args(["--date", "2026-03-16", "--duration", duration])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("stdout must be a JSON array")
}

// ─────────────────────────────────────────────────────────────────────────────
// slots subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn slots_lists_bookable_start_times() {
    let list = monday_slots("30");
    let has = |t: &str| list.iter().any(|s| s == t);

    assert_eq!(list.first().map(String::as_str), Some("09:00"));
    assert!(has("09:30"), "ends at the booking start");
    assert!(!has("09:45"));
    assert!(!has("10:30"), "inside the 10:00 booking");
    assert!(has("10:45"), "starts at the booking end");
    assert!(!has("12:30"), "inside lunch");
    assert!(has("13:00"));
    assert!(has("14:00"), "cancelled booking does not block");
    assert!(has("15:00"), "inactive lunch does not block");
    assert_eq!(list.last().map(String::as_str), Some("16:30"));
}

#[test]
fn slots_reads_snapshot_from_stdin() {
    let snapshot = std::fs::read_to_string(shop_path()).expect("shop.json fixture must exist");

    slots()
        .args(["slots", "--barber", "b2", "--date", "2026-03-16", "--duration", "30"])
        .write_stdin(snapshot)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(r#"["13:30","#));
}

#[test]
fn slots_for_holiday_is_empty_array() {
    slots()
        .args(["slots", "-s", shop_path(), "-b", "b1", "--date", "2026-03-20", "--duration", "30"])
        .assert()
        .success()
        .stdout("[]\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// check subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_explains_booking_conflict() {
    slots()
        .args(["check", "-s", shop_path(), "-b", "b1", "--date", "2026-03-16"])
        .args(["--time", "10:15", "--duration", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""decision":"rejected""#))
        .stdout(predicate::str::contains(r#""reason":"booking_conflict""#))
        .stdout(predicate::str::contains(r#""booking_start":600"#));
}

#[test]
fn check_accepts_open_slot() {
    slots()
        .args(["check", "-s", shop_path(), "-b", "b1", "--date", "2026-03-16"])
        .args(["--time", "10:45", "--duration", "30"])
        .assert()
        .success()
        .stdout(r#"{"decision":"available"}"#.to_string() + "\n");
}

#[test]
fn check_reports_holiday() {
    slots()
        .args(["check", "-s", shop_path(), "-b", "b1", "--date", "2026-03-20"])
        .args(["--time", "10:00", "--duration", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""decision":"holiday""#));
}

#[test]
fn check_rejects_malformed_time() {
    slots()
        .args(["check", "-s", shop_path(), "-b", "b1", "--date", "2026-03-16"])
        .args(["--time", "25:00", "--duration", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("25:00"));
}

// ─────────────────────────────────────────────────────────────────────────────
// day / range / next subcommands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn day_prints_boolean() {
    slots()
        .args(["day", "-s", shop_path(), "-b", "b1", "--date", "2026-03-16", "--duration", "30"])
        .assert()
        .success()
        .stdout("true\n");

    slots()
        .args(["day", "-s", shop_path(), "-b", "b1", "--date", "2026-03-15", "--duration", "30"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn range_maps_each_date() {
    let output = slots()
        .args(["range", "-s", shop_path(), "-b", "b1", "--from", "2026-03-15"])
        .args(["--days", "7", "--duration", "30"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let map: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let map = map.as_object().expect("stdout must be a JSON object");
    assert_eq!(map.len(), 7);
    assert_eq!(map["2026-03-15"], false, "Sunday closed");
    assert_eq!(map["2026-03-16"], true);
    assert_eq!(map["2026-03-20"], false, "holiday");
    assert_eq!(map["2026-03-21"], true, "Saturday short day");
    assert_eq!(map.keys().next().map(String::as_str), Some("2026-03-15"));
}

#[test]
fn range_rejects_zero_days() {
    slots()
        .args(["range", "-s", shop_path(), "-b", "b1", "--from", "2026-03-15"])
        .args(["--days", "0", "--duration", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date window"));
}

#[test]
fn next_skips_holiday() {
    slots()
        .args(["next", "-s", shop_path(), "-b", "b1", "--from", "2026-03-20", "--duration", "60"])
        .assert()
        .success()
        .stdout("\"2026-03-21\"\n");
}

#[test]
fn next_prints_null_when_horizon_is_blocked() {
    slots()
        .args(["next", "-s", shop_path(), "-b", "b1", "--from", "2026-03-20"])
        .args(["--days", "1", "--duration", "60"])
        .assert()
        .success()
        .stdout("null\n");
}

#[test]
fn horizon_env_override_applies_to_next() {
    // From Friday's holiday, a 1-day default horizon sees nothing.
    slots()
        .env("SLOTS_HORIZON_DAYS", "1")
        .args(["next", "-s", shop_path(), "-b", "b1", "--from", "2026-03-20", "--duration", "60"])
        .assert()
        .success()
        .stdout("null\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn config_file_sets_grid_step() {
    let output = slots()
        .args(["--config", config_path()])
        .args(["slots", "-s", shop_path(), "-b", "b1", "--date", "2026-03-16", "--duration", "30"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let list: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert!(list.iter().all(|s| s.ends_with(":00") || s.ends_with(":30")));
    assert!(list.iter().any(|s| s == "09:30"));
}

#[test]
fn env_overrides_step_minutes() {
    let output = slots()
        .env("SLOTS_STEP_MINUTES", "60")
        .args(["slots", "-s", shop_path(), "-b", "b1", "--date", "2026-03-16", "--duration", "30"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let list: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(list, ["09:00", "11:00", "13:00", "14:00", "15:00", "16:00"]);
}

#[test]
fn unparseable_env_override_fails() {
    slots()
        .env("SLOTS_STEP_MINUTES", "quarter")
        .args(["day", "-s", shop_path(), "-b", "b1", "--date", "2026-03-16", "--duration", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SLOTS_STEP_MINUTES"));
}

#[test]
fn invalid_config_value_fails() {
    slots()
        .env("SLOTS_MAX_CONCURRENT_DAYS", "0")
        .args(["day", "-s", shop_path(), "-b", "b1", "--date", "2026-03-16", "--duration", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_concurrent_days"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Error handling
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn non_positive_duration_fails() {
    slots()
        .args(["slots", "-s", shop_path(), "-b", "b1", "--date", "2026-03-16", "--duration", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid service"));
}

#[test]
fn missing_snapshot_file_fails() {
    slots()
        .args(["day", "-s", "/nonexistent/shop.json", "-b", "b1", "--date", "2026-03-16", "--duration", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn malformed_snapshot_fails() {
    slots()
        .args(["day", "-b", "b1", "--date", "2026-03-16", "--duration", "30"])
        .write_stdin(r#"{"opening_hours":[{"barber_id":"b1","day_of_week":1,"open_time":"17:00","close_time":"09:00"}]}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse shop snapshot"));
}

#[test]
fn bad_date_is_rejected_by_argument_parser() {
    slots()
        .args(["day", "-s", shop_path(), "-b", "b1", "--date", "2026-02-30", "--duration", "30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--date"));
}

#[test]
fn verbose_logs_go_to_stderr() {
    slots()
        .args(["-v", "slots", "-s", shop_path(), "-b", "b1", "--date", "2026-03-16", "--duration", "30"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["))
        .stderr(predicate::str::contains("computed slots"));
}
