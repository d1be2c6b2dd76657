// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::{Duration, SystemTime};

use proptest::prelude::*;

use super::*;
use crate::capture::Capture as RawCapture;

fn cap_from(text: &str) -> RawCapture {
    RawCapture { text: text.to_owned(), lines: crate::capture::split_lines(text) }
}

#[test]
fn identical_baseline_is_unchanged_with_zero_delta() {
    let t = SystemTime::now();
    let b = Baseline::from_capture(&cap_from("a\nb\n"), t);
    let c = Baseline::from_capture(&cap_from("a\nb\n"), t + Duration::from_millis(5));
    let change = compare(Some(&b), Some(&c));
    assert!(!change.changed);
    assert_eq!(change.lines_delta, 0);
}

#[test]
fn hash_equality_implies_unchanged() {
    let t = SystemTime::now();
    let b = Baseline::from_capture(&cap_from("same"), t);
    let c = Baseline::from_capture(&cap_from("same"), t);
    assert_eq!(b.content_hash, c.content_hash);
    assert!(!compare(Some(&b), Some(&c)).changed);
}

#[test]
fn missing_baseline_or_current_is_always_changed() {
    let t = SystemTime::now();
    let b = Baseline::from_capture(&cap_from("a"), t);
    assert!(compare(None, Some(&b)).changed);
    assert!(compare(Some(&b), None).changed);
    assert!(compare(None, None).changed);
}

#[test]
fn added_and_removed_are_mutually_exclusive() {
    let t = SystemTime::now();
    let b = Baseline::from_capture(&cap_from("a\nb\n"), t);
    let c = Baseline::from_capture(&cap_from("a\nb\nc\nd\n"), t + Duration::from_millis(1));
    let change = compare(Some(&b), Some(&c));
    assert_eq!(change.lines_added * change.lines_removed, 0);
    assert_eq!(change.lines_added, 2);
    assert_eq!(change.lines_removed, 0);
}

#[test]
fn latency_reflects_elapsed_time() {
    let t = SystemTime::now();
    let b = Baseline::from_capture(&cap_from("a"), t);
    let c = Baseline::from_capture(&cap_from("ab"), t + Duration::from_millis(80));
    assert_eq!(compare(Some(&b), Some(&c)).latency_ms, 80);
}

proptest! {
    /// Re-snapshotting identical content never reports a change, no
    /// matter what the content is.
    #[test]
    fn identical_content_is_never_changed(text in "[a-zA-Z0-9 \n]{0,200}") {
        let t = SystemTime::now();
        let b = Baseline::from_capture(&cap_from(&text), t);
        let c = Baseline::from_capture(&cap_from(&text), t + Duration::from_millis(3));
        let change = compare(Some(&b), Some(&c));
        prop_assert!(!change.changed);
        prop_assert_eq!(change.lines_delta, 0);
    }

    /// `lines_added` and `lines_removed` can never both be nonzero: a
    /// change is either growth or shrinkage, never both at once.
    #[test]
    fn added_and_removed_never_both_nonzero(
        before in "([a-z]\n){0,20}",
        after in "([a-z]\n){0,20}",
    ) {
        let t = SystemTime::now();
        let b = Baseline::from_capture(&cap_from(&before), t);
        let c = Baseline::from_capture(&cap_from(&after), t + Duration::from_millis(1));
        let change = compare(Some(&b), Some(&c));
        prop_assert_eq!(change.lines_added * change.lines_removed, 0);
    }
}
