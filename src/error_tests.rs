// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn as_str_matches_screaming_snake_case() {
    assert_eq!(ErrorCode::SessionNotFound.as_str(), "SESSION_NOT_FOUND");
    assert_eq!(ErrorCode::TmuxError.as_str(), "TMUX_ERROR");
}

#[test]
fn target_missing_codes_carry_a_hint() {
    assert!(ErrorCode::SessionNotFound.default_hint().is_some());
    assert!(ErrorCode::PaneNotFound.default_hint().is_some());
    assert!(ErrorCode::InternalError.default_hint().is_none());
}

#[test]
fn display_includes_code_and_reason() {
    let err = CoreError::pane_not_found("main:0.3");
    assert!(err.to_string().contains("PANE_NOT_FOUND"));
    assert!(err.to_string().contains("main:0.3"));
}
