// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn aliases_resolve_to_canonical_kind() {
    assert_eq!(AgentKind::from_token("cc"), Some(AgentKind::Claude));
    assert_eq!(AgentKind::from_token("COD"), Some(AgentKind::Codex));
    assert_eq!(AgentKind::from_token("gmi"), Some(AgentKind::Gemini));
    assert_eq!(AgentKind::from_token("Claude"), Some(AgentKind::Claude));
}

#[test]
fn unknown_token_resolves_to_none() {
    assert_eq!(AgentKind::from_token("notepad"), None);
}

#[test]
fn duration_parses_each_unit() {
    assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
    assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
    assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
    assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
}

#[test]
fn duration_rejects_unknown_unit() {
    assert!(parse_duration("30x").is_err());
}

#[test]
fn percentage_rejects_out_of_range() {
    assert!(parse_percentage("100").is_ok());
    assert!(parse_percentage("0").is_ok());
    assert!(parse_percentage("101").is_err());
    assert!(parse_percentage("-1").is_err());
}

#[test]
fn probe_timeout_enforces_bounds() {
    assert!(parse_probe_timeout("100").is_ok());
    assert!(parse_probe_timeout("60000").is_ok());
    assert!(parse_probe_timeout("99").is_err());
    assert!(parse_probe_timeout("60001").is_err());
}

fn probe_args(method: ProbeMethod, aggressive: bool) -> ProbeArgs {
    ProbeArgs { target: "main:0.0".to_owned(), method, timeout_ms: 5000, aggressive }
}

#[test]
fn aggressive_is_rejected_with_interrupt_test() {
    let err = validate_probe_args(&probe_args(ProbeMethod::InterruptTest, true)).unwrap_err();
    assert_eq!(err.code, crate::error::ErrorCode::InvalidFlag);
}

#[test]
fn aggressive_is_accepted_with_keystroke_echo() {
    assert!(validate_probe_args(&probe_args(ProbeMethod::KeystrokeEcho, true)).is_ok());
}

#[test]
fn non_aggressive_is_accepted_with_either_method() {
    assert!(validate_probe_args(&probe_args(ProbeMethod::InterruptTest, false)).is_ok());
    assert!(validate_probe_args(&probe_args(ProbeMethod::KeystrokeEcho, false)).is_ok());
}
