// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The state classifier: capture → `{state, velocity, context%, rate-limit
//! flag, confidence}`.
//!
//! Priority mirrors the screen-pattern classifier's error-then-prompt-then-
//! working ordering: error wins over idle, idle wins over stalled, and a
//! stall is only declared when nothing else explains zero output velocity.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::capture::Capture;
use crate::config::AgentKind;
use crate::patterns::{
    agent_error_substrings, context_remaining_patterns, extract_wait_seconds,
    has_rate_limit_reset_phrase, COMMON_ERROR_SUBSTRINGS, IDLE_PROMPT_SUFFIXES, RATE_LIMIT_SUBSTRINGS,
};

/// Default stall window: zero output velocity beyond this, without an
/// idle prompt match, is classified as stalled.
pub const DEFAULT_STALL_THRESHOLD: Duration = Duration::from_secs(5 * 60);

/// Classified activity state of a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStateKind {
    Active,
    Idle,
    Working,
    Generating,
    Waiting,
    Stalled,
    Error,
    Unknown,
}

/// Full classifier output for one pane observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityState {
    pub state: ActivityStateKind,
    pub velocity_cps: f64,
    pub confidence: f64,
    pub state_since: SystemTime,
    pub last_observed: SystemTime,
    pub context_remaining: Option<f64>,
    pub rate_limited: bool,
    pub wait_seconds: Option<u64>,
    pub error_detail: Option<String>,
}

/// Inputs the classifier needs beyond the capture itself.
pub struct ClassifyInput<'a> {
    pub capture: &'a Capture,
    pub kind: AgentKind,
    pub velocity_cps: f64,
    pub stall_threshold: Duration,
    pub time_since_last_activity: Duration,
    pub prior: Option<(ActivityStateKind, SystemTime)>,
    pub now: SystemTime,
}

fn last_n_lines(capture: &Capture, n: usize) -> String {
    let start = capture.lines.len().saturating_sub(n);
    capture.lines[start..].join("\n")
}

fn matches_error(kind: AgentKind, window: &str) -> Option<String> {
    let lower = window.to_lowercase();
    for needle in COMMON_ERROR_SUBSTRINGS.iter().chain(agent_error_substrings(kind)) {
        if lower.contains(&needle.to_lowercase()) {
            return Some((*needle).to_owned());
        }
    }
    None
}

fn matches_idle(capture: &Capture) -> bool {
    capture
        .last_non_empty_line()
        .is_some_and(|line| IDLE_PROMPT_SUFFIXES.iter().any(|suf| line.ends_with(suf)))
}

fn detect_rate_limit(window: &str) -> (bool, Option<u64>) {
    let lower = window.to_lowercase();
    let hit = RATE_LIMIT_SUBSTRINGS.iter().any(|s| lower.contains(s)) || has_rate_limit_reset_phrase(window);
    if !hit {
        return (false, None);
    }
    (true, extract_wait_seconds(window))
}

fn extract_context_remaining(kind: AgentKind, capture: &Capture) -> Option<f64> {
    let window = last_n_lines(capture, 50);
    for pattern in context_remaining_patterns(kind) {
        let Ok(re) = regex::Regex::new(pattern) else { continue };
        if let Some(caps) = re.captures(&window) {
            if let Some(m) = caps.get(1) {
                if let Ok(value) = m.as_str().parse::<f64>() {
                    if (0.0..=100.0).contains(&value) {
                        return Some(value);
                    }
                }
            }
        }
    }
    None
}

/// Classify a pane observation into a full [`ActivityState`].
pub fn classify(input: ClassifyInput<'_>) -> ActivityState {
    let ClassifyInput { capture, kind, velocity_cps, stall_threshold, time_since_last_activity, prior, now } =
        input;

    let error_window = last_n_lines(capture, 20);
    let rate_limit_window = last_n_lines(capture, 50);

    let (rate_limited, wait_seconds) = detect_rate_limit(&rate_limit_window);
    let error_detail = matches_error(kind, &error_window);
    let idle = matches_idle(capture);

    let mut confidence = 1.0_f64;
    let mut sub_check_failed = false;

    let state = if error_detail.is_some() {
        ActivityStateKind::Error
    } else if idle {
        ActivityStateKind::Idle
    } else if velocity_cps == 0.0 && time_since_last_activity > stall_threshold {
        ActivityStateKind::Stalled
    } else if velocity_cps == 0.0 && time_since_last_activity > Duration::ZERO {
        // Zero velocity but not yet past the stall window: still uncertain.
        let stall_confidence = (time_since_last_activity.as_secs_f64()
            / stall_threshold.as_secs_f64().max(1.0))
        .clamp(0.0, 1.0);
        if stall_confidence < 0.7 {
            confidence *= stall_confidence.max(0.1);
        }
        sub_check_failed = true;
        ActivityStateKind::Waiting
    } else if velocity_cps > 0.0 {
        ActivityStateKind::Working
    } else {
        sub_check_failed = true;
        ActivityStateKind::Unknown
    };

    if sub_check_failed {
        confidence *= 0.8;
    }

    let state_since = match prior {
        Some((prev_state, since)) if prev_state == state => since,
        _ => now,
    };

    ActivityState {
        state,
        velocity_cps,
        confidence,
        state_since,
        last_observed: now,
        context_remaining: extract_context_remaining(kind, capture),
        rate_limited,
        wait_seconds,
        error_detail,
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
