// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;

#[test]
fn first_sighting_sets_timestamp_and_full_delta() {
    let tracker = ActivityTracker::new();
    let t0 = SystemTime::now();
    let (ts, delta) = tracker.update_activity("p1", "a\nb\nc", t0);
    assert_eq!(ts, t0);
    assert_eq!(delta, 3);
}

#[test]
fn unchanged_content_does_not_advance_timestamp() {
    let tracker = ActivityTracker::new();
    let t0 = SystemTime::now();
    let t1 = t0 + Duration::from_secs(1);
    tracker.update_activity("p1", "a\nb", t0);
    let (ts, delta) = tracker.update_activity("p1", "a\nb", t1);
    assert_eq!(ts, t0);
    assert_eq!(delta, 0);
}

#[test]
fn more_lines_advances_timestamp_with_positive_delta() {
    let tracker = ActivityTracker::new();
    let t0 = SystemTime::now();
    let t1 = t0 + Duration::from_secs(1);
    tracker.update_activity("p1", "a", t0);
    let (ts, delta) = tracker.update_activity("p1", "a\nb\nc", t1);
    assert_eq!(ts, t1);
    assert_eq!(delta, 2);
}

#[test]
fn fewer_lines_is_buffer_wrap_with_delta_equal_new_count() {
    let tracker = ActivityTracker::new();
    let t0 = SystemTime::now();
    let t1 = t0 + Duration::from_secs(1);
    tracker.update_activity("p1", "a\nb\nc\nd\ne", t0);
    let (ts, delta) = tracker.update_activity("p1", "x\ny", t1);
    assert_eq!(ts, t1);
    assert_eq!(delta, 2);
}

#[test]
fn same_count_different_content_advances_with_delta_one() {
    let tracker = ActivityTracker::new();
    let t0 = SystemTime::now();
    let t1 = t0 + Duration::from_secs(1);
    tracker.update_activity("p1", "a\nb", t0);
    let (ts, delta) = tracker.update_activity("p1", "a\nc", t1);
    assert_eq!(ts, t1);
    assert_eq!(delta, 1);
}

#[test]
fn idempotent_second_identical_update_advances_timestamp_at_most_once() {
    let tracker = ActivityTracker::new();
    let t0 = SystemTime::now();
    let t1 = t0 + Duration::from_secs(1);
    let t2 = t0 + Duration::from_secs(2);
    let (ts1, _) = tracker.update_activity("p1", "same", t0);
    let (ts2, delta2) = tracker.update_activity("p1", "same", t1);
    let (ts3, delta3) = tracker.update_activity("p1", "same", t2);
    assert_eq!(ts1, ts2);
    assert_eq!(ts2, ts3);
    assert_eq!(delta2, 0);
    assert_eq!(delta3, 0);
}

#[test]
fn velocity_is_none_equivalent_zero_with_single_sample() {
    let tracker = ActivityTracker::new();
    let t0 = SystemTime::now();
    tracker.update_activity("p1", "hello", t0);
    assert_eq!(tracker.velocity_cps("p1"), Some(0.0));
}

#[test]
fn velocity_reflects_chars_over_elapsed_time() {
    let tracker = ActivityTracker::new();
    let t0 = SystemTime::now();
    let t1 = t0 + Duration::from_secs(2);
    tracker.update_activity("p1", "aa", t0);
    tracker.update_activity("p1", "aaaaaaaaaa", t1);
    let v = tracker.velocity_cps("p1").expect("velocity");
    assert!((v - 4.0).abs() < 0.001);
}

#[test]
fn unknown_pane_has_no_velocity_or_last_activity() {
    let tracker = ActivityTracker::new();
    assert_eq!(tracker.velocity_cps("ghost"), None);
    assert_eq!(tracker.time_since_last_activity("ghost", SystemTime::now()), None);
}

#[test]
fn clear_pane_drops_bookkeeping() {
    let tracker = ActivityTracker::new();
    let t0 = SystemTime::now();
    tracker.update_activity("p1", "a", t0);
    tracker.clear_pane("p1");
    assert_eq!(tracker.velocity_cps("p1"), None);
}
