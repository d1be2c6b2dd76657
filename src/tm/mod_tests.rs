// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_full_target() {
    let t: PaneTarget = "main:1.2".parse().unwrap();
    assert_eq!(t, PaneTarget { session: "main".to_owned(), window: 1, pane: 2 });
}

#[test]
fn session_only_defaults_window_and_pane() {
    let t: PaneTarget = "main".parse().unwrap();
    assert_eq!(t, PaneTarget { session: "main".to_owned(), window: 0, pane: 0 });
}

#[test]
fn session_and_window_defaults_pane() {
    let t: PaneTarget = "main:2".parse().unwrap();
    assert_eq!(t, PaneTarget { session: "main".to_owned(), window: 2, pane: 0 });
}

#[test]
fn empty_session_is_rejected() {
    let result: Result<PaneTarget, _> = ":1.2".parse();
    assert!(result.is_err());
}

#[test]
fn display_round_trips() {
    let t = PaneTarget { session: "work".to_owned(), window: 3, pane: 1 };
    assert_eq!(t.to_string(), "work:3.1");
}
