// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite pane health check: process liveness (from the Probe Engine)
//! plus stall/idle and error signals (from the State Classifier) folded
//! into one prioritized `health_state`, feeding the `diagnose` command.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::classify::{ActivityState, ActivityStateKind, DEFAULT_STALL_THRESHOLD};

/// Combined health verdict, most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Unhealthy,
    RateLimited,
    Degraded,
    Healthy,
}

/// A single diagnose-command result: the three raw signals plus the
/// combined verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthCheck {
    pub process: bool,
    pub stall: bool,
    pub error: bool,
    pub health_state: HealthState,
    pub confidence: f64,
    pub reason: String,
    pub checked_at: SystemTime,
}

/// Combine a classifier result, an idle duration, and a probe's
/// responsiveness verdict into one [`HealthCheck`].
///
/// Priority, highest first: a crashed process is always unhealthy
/// regardless of what the classifier saw; an explicit non-rate-limit
/// error is unhealthy; a rate limit is its own state distinct from a
/// generic error; a stall (classifier) or an idle gap past the stall
/// threshold is degraded; otherwise healthy.
pub fn health_check(
    state: &ActivityState,
    time_since_last_activity: Duration,
    process: bool,
    now: SystemTime,
) -> HealthCheck {
    let stall = state.state == ActivityStateKind::Stalled || time_since_last_activity > DEFAULT_STALL_THRESHOLD;
    let error = state.state == ActivityStateKind::Error && !state.rate_limited;

    let (health_state, reason) = if !process {
        (HealthState::Unhealthy, "pane process crashed")
    } else if error {
        (HealthState::Unhealthy, "agent reported an explicit error")
    } else if state.rate_limited {
        (HealthState::RateLimited, "agent is rate-limited")
    } else if stall {
        (HealthState::Degraded, "agent stalled or idle past the 5-minute threshold")
    } else {
        (HealthState::Healthy, "agent responding normally")
    };

    HealthCheck {
        process,
        stall,
        error,
        health_state,
        confidence: state.confidence,
        reason: reason.to_owned(),
        checked_at: now,
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
