// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn wait_seconds_extracts_try_again_phrasing() {
    let text = "Error: rate limit exceeded. Try again in 120 seconds.";
    assert_eq!(extract_wait_seconds(text), Some(120));
}

#[test]
fn wait_seconds_rejects_out_of_range() {
    assert_eq!(extract_wait_seconds("retry after 0"), None);
    assert_eq!(extract_wait_seconds("retry after 999999"), None);
}

#[test]
fn wait_seconds_extracts_cooldown_phrasing() {
    assert_eq!(extract_wait_seconds("90 second cooldown before next call"), Some(90));
}

#[test]
fn reset_phrase_detects_wall_clock_hint() {
    assert!(has_rate_limit_reset_phrase("Limit resets 6am Pacific"));
    assert!(!has_rate_limit_reset_phrase("no reset info here"));
}

#[test]
fn claude_context_pattern_matches_known_phrasing() {
    let re = Regex::new(context_remaining_patterns(AgentKind::Claude)[1]).unwrap();
    let caps = re.captures("72% context remaining today").unwrap();
    assert_eq!(&caps[1], "72");
}
