// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Smart Restart Decision Engine: pre-check → decision matrix → exit
//! protocol → respawn protocol → optional prompt re-injection, with
//! per-pane failure isolation so one pane's trouble never stalls a batch.

use std::time::{Duration, SystemTime};

use tokio_util::sync::CancellationToken;

use crate::agent_type;
use crate::capture::{self, Capture};
use crate::classify::{self, ActivityStateKind, ClassifyInput, DEFAULT_STALL_THRESHOLD};
use crate::config::AgentKind;
use crate::error::CoreError;
use crate::patterns::IDLE_PROMPT_SUFFIXES;
use crate::tm::{PaneTarget, TmAdapter};

/// Tunables for the exit/respawn protocol. Defaults follow the orders of
/// magnitude named in the decision protocol: short gaps between signals,
/// seconds-scale settle waits.
#[derive(Debug, Clone, Copy)]
pub struct RestartConfig {
    pub capture_lines: usize,
    pub context_low_threshold: f64,
    pub exit_signal_gap: Duration,
    pub post_exit_wait: Duration,
    pub shell_confirm_retries: u32,
    pub respawn_init_wait: Duration,
    pub prompt_settle_delay: Duration,
    pub min_detector_confidence: f64,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            capture_lines: 100,
            context_low_threshold: 25.0,
            exit_signal_gap: Duration::from_millis(100),
            post_exit_wait: Duration::from_secs(3),
            shell_confirm_retries: 3,
            respawn_init_wait: Duration::from_secs(6),
            prompt_settle_delay: Duration::from_secs(1),
            min_detector_confidence: 0.7,
        }
    }
}

/// What the pre-check concluded about a pane, independent of any
/// restart decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneWorkStatus {
    pub is_working: bool,
    pub is_idle: bool,
    pub is_rate_limited: bool,
    pub is_context_low: bool,
    pub context_remaining: Option<f64>,
    pub recommendation: Recommendation,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    DoNotInterrupt,
    SafeToRestart,
    ContextLowContinue,
    RateLimitedWait,
    ErrorState,
    Unknown,
}

/// Derive a [`PaneWorkStatus`] from a classifier result.
pub fn derive_work_status(state: &classify::ActivityState, context_low_threshold: f64) -> PaneWorkStatus {
    let is_working = matches!(
        state.state,
        ActivityStateKind::Working | ActivityStateKind::Generating | ActivityStateKind::Active
    );
    let is_idle = state.state == ActivityStateKind::Idle;
    let is_rate_limited = state.rate_limited;
    let is_context_low = state.context_remaining.is_some_and(|c| c < context_low_threshold);

    let recommendation = if state.state == ActivityStateKind::Error {
        Recommendation::ErrorState
    } else if is_rate_limited {
        Recommendation::RateLimitedWait
    } else if is_working {
        Recommendation::DoNotInterrupt
    } else if is_idle && is_context_low {
        Recommendation::ContextLowContinue
    } else if is_idle {
        Recommendation::SafeToRestart
    } else {
        Recommendation::Unknown
    };

    PaneWorkStatus {
        is_working,
        is_idle,
        is_rate_limited,
        is_context_low,
        context_remaining: state.context_remaining,
        recommendation,
        confidence: state.confidence,
    }
}

/// The decision the engine reaches before taking any action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Restart,
    Skip,
    Wait,
}

/// Run the decision matrix in §4.9: a pane's recommendation fully
/// partitions the nine documented rows, so each arm below corresponds
/// to exactly one row (or the force-variant of one).
pub fn decide(status: &PaneWorkStatus, force: bool) -> (Decision, &'static str) {
    match status.recommendation {
        Recommendation::DoNotInterrupt => {
            if force {
                (Decision::Restart, "forced restart while pane is actively working")
            } else {
                (Decision::Skip, "actively working")
            }
        }
        Recommendation::RateLimitedWait => {
            if force {
                (Decision::Restart, "forced restart during rate limit")
            } else {
                (Decision::Wait, "rate-limited")
            }
        }
        Recommendation::ContextLowContinue => (Decision::Restart, "low context"),
        Recommendation::SafeToRestart => (Decision::Restart, "idle, optional restart"),
        Recommendation::ErrorState => (Decision::Restart, "pane in error state"),
        Recommendation::Unknown => {
            if force {
                (Decision::Restart, "forced restart despite unknown state")
            } else {
                (Decision::Skip, "needs inspection")
            }
        }
    }
}

/// Populated when the decision is [`Decision::Wait`].
#[derive(Debug, Clone)]
pub struct WaitInfo {
    pub resets_at: Option<String>,
    pub wait_seconds: Option<u64>,
    pub suggestion: String,
}

/// The outcome of processing one pane through the engine.
#[derive(Debug, Clone)]
pub enum PaneOutcome {
    Restarted { prompt_sent: bool },
    Skipped { reason: String },
    Waiting { info: WaitInfo },
    WouldRestart { reason: String },
    Failed { reason: String },
}

/// One pane's result in a batch run.
#[derive(Debug, Clone)]
pub struct PaneRestartResult {
    pub target: PaneTarget,
    pub outcome: PaneOutcome,
}

/// Aggregated counts for a batch restart run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub restarted: usize,
    pub skipped: usize,
    pub waiting: usize,
    pub failed: usize,
    pub would_restart: usize,
}

fn is_shell_prompt(capture: &Capture) -> bool {
    capture.last_non_empty_line().is_some_and(|line| IDLE_PROMPT_SUFFIXES.iter().any(|suf| line.ends_with(suf)))
}

async fn wait_for_shell_prompt(
    adapter: &dyn TmAdapter,
    target: &PaneTarget,
    config: &RestartConfig,
    cancel: &CancellationToken,
) -> Result<bool, CoreError> {
    for attempt in 0..=config.shell_confirm_retries {
        if attempt > 0 {
            adapter.send_interrupt(target, cancel).await?;
        }
        tokio::time::sleep(config.post_exit_wait).await;
        let cap = capture::capture_for_status(adapter, target, cancel).await?;
        if is_shell_prompt(&cap) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Interrupt the pane's running agent and confirm it returns to a shell
/// prompt, sending a second interrupt if the first does not converge.
async fn exit_protocol(
    adapter: &dyn TmAdapter,
    target: &PaneTarget,
    config: &RestartConfig,
    cancel: &CancellationToken,
) -> Result<(), CoreError> {
    adapter.send_interrupt(target, cancel).await?;
    tokio::time::sleep(config.exit_signal_gap).await;

    if wait_for_shell_prompt(adapter, target, config, cancel).await? {
        return Ok(());
    }
    Err(CoreError::timeout("pane did not return to a shell prompt after interrupt"))
}

/// Kill and restart the pane's process, then confirm the agent type
/// detector recognizes the same (or aliased) agent kind with sufficient
/// confidence.
async fn respawn_protocol(
    adapter: &dyn TmAdapter,
    target: &PaneTarget,
    expected: AgentKind,
    config: &RestartConfig,
    cancel: &CancellationToken,
) -> Result<(), CoreError> {
    adapter.respawn_pane(target, true, cancel).await?;
    tokio::time::sleep(config.respawn_init_wait).await;

    let cap = capture::capture(adapter, target, config.capture_lines, cancel).await?;
    let title = crate::tm::pane_title(adapter, target, cancel).await;
    let detection = agent_type::detect(&title, Some(&cap.text), target.pane, false);

    if detection.kind == expected && detection.confidence >= config.min_detector_confidence {
        Ok(())
    } else {
        Err(CoreError::new(
            crate::error::ErrorCode::InternalError,
            format!("post-restart agent type check failed: expected {expected}, saw {}", detection.kind),
        ))
    }
}

fn build_wait_info(state: &classify::ActivityState) -> WaitInfo {
    let suggestion =
        if state.wait_seconds.is_some() { "wait for reset".to_owned() } else { "consider account switch".to_owned() };
    WaitInfo { resets_at: None, wait_seconds: state.wait_seconds, suggestion }
}

/// Run the full pre-check → decide → act protocol for one pane.
pub async fn restart_pane(
    adapter: &dyn TmAdapter,
    target: &PaneTarget,
    force: bool,
    dry_run: bool,
    follow_up: Option<&str>,
    config: &RestartConfig,
    cancel: &CancellationToken,
) -> PaneOutcome {
    let precheck = async {
        let cap = capture::capture(adapter, target, config.capture_lines, cancel).await?;
        let title = crate::tm::pane_title(adapter, target, cancel).await;
        let detection = agent_type::detect(&title, Some(&cap.text), target.pane, false);
        let state = classify::classify(ClassifyInput {
            capture: &cap,
            kind: detection.kind,
            velocity_cps: 0.0,
            stall_threshold: DEFAULT_STALL_THRESHOLD,
            time_since_last_activity: Duration::ZERO,
            prior: None,
            now: SystemTime::now(),
        });
        Ok::<_, CoreError>((detection.kind, state))
    };

    let (expected_kind, state) = match precheck.await {
        Ok(v) => v,
        Err(e) => return PaneOutcome::Failed { reason: e.to_string() },
    };

    let status = derive_work_status(&state, config.context_low_threshold);
    let (decision, reason) = decide(&status, force);

    if dry_run && decision == Decision::Restart {
        return PaneOutcome::WouldRestart { reason: reason.to_owned() };
    }

    match decision {
        Decision::Skip => PaneOutcome::Skipped { reason: reason.to_owned() },
        Decision::Wait => PaneOutcome::Waiting { info: build_wait_info(&state) },
        Decision::Restart => {
            if let Err(e) = exit_protocol(adapter, target, config, cancel).await {
                return PaneOutcome::Failed { reason: e.to_string() };
            }
            if let Err(e) = respawn_protocol(adapter, target, expected_kind, config, cancel).await {
                return PaneOutcome::Failed { reason: e.to_string() };
            }

            let mut prompt_sent = false;
            if let Some(message) = follow_up {
                tokio::time::sleep(config.prompt_settle_delay).await;
                if adapter.send_keys(target, message, true, cancel).await.is_ok() {
                    prompt_sent = true;
                }
            }
            PaneOutcome::Restarted { prompt_sent }
        }
    }
}

fn tally(summary: &mut BatchSummary, outcome: &PaneOutcome) {
    match outcome {
        PaneOutcome::Restarted { .. } => summary.restarted += 1,
        PaneOutcome::Skipped { .. } => summary.skipped += 1,
        PaneOutcome::Waiting { .. } => summary.waiting += 1,
        PaneOutcome::WouldRestart { .. } => summary.would_restart += 1,
        PaneOutcome::Failed { .. } => summary.failed += 1,
    }
}

/// Process a batch of panes sequentially, preserving input order.
pub async fn restart_batch_sequential(
    adapter: &dyn TmAdapter,
    targets: &[PaneTarget],
    force: bool,
    dry_run: bool,
    follow_up: Option<&str>,
    config: &RestartConfig,
    cancel: &CancellationToken,
) -> (BatchSummary, Vec<PaneRestartResult>) {
    let mut summary = BatchSummary::default();
    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        let outcome = restart_pane(adapter, target, force, dry_run, follow_up, config, cancel).await;
        tally(&mut summary, &outcome);
        results.push(PaneRestartResult { target: target.clone(), outcome });
    }
    (summary, results)
}

/// Process a batch of panes in parallel. No ordering guarantee exists
/// between panes, but each pane's own pipeline runs start-to-finish
/// without interleaving with another pane's writes.
pub async fn restart_batch_parallel(
    adapter: &dyn TmAdapter,
    targets: &[PaneTarget],
    force: bool,
    dry_run: bool,
    follow_up: Option<&str>,
    config: &RestartConfig,
    cancel: &CancellationToken,
) -> (BatchSummary, Vec<PaneRestartResult>) {
    let futures = targets.iter().map(|target| async move {
        let outcome = restart_pane(adapter, target, force, dry_run, follow_up, config, cancel).await;
        PaneRestartResult { target: target.clone(), outcome }
    });
    let results: Vec<PaneRestartResult> = futures_util::future::join_all(futures).await;
    let mut summary = BatchSummary::default();
    for result in &results {
        tally(&mut summary, &result.outcome);
    }
    (summary, results)
}

#[cfg(test)]
#[path = "restart_tests.rs"]
mod tests;
