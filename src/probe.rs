// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Probe Engine: actively tests pane responsiveness by sending a
//! small stimulus and polling for a content change, on a short fixed
//! interval rather than a blocking read — the same cooperative-polling
//! shape used for other bounded-wait conditions in this codebase.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::baseline::{compare, Baseline};
use crate::capture::{self, Capture};
use crate::config::ProbeMethod;
use crate::error::CoreError;
use crate::tm::{PaneTarget, TmAdapter};

/// Interval between polls while waiting for a pane to react to a probe.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Healthy,
    LikelyStuck,
    DefinitelyStuck,
}

/// Result of a single probe invocation.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub responsive: bool,
    pub confidence: Confidence,
    pub recommendation: Recommendation,
    pub reasoning: String,
    pub latency_ms: u64,
}

async fn poll_for_change(
    adapter: &dyn TmAdapter,
    target: &PaneTarget,
    baseline: &Baseline,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<(bool, u64), CoreError> {
    let start = Instant::now();
    loop {
        if cancel.is_cancelled() {
            return Ok((false, start.elapsed().as_millis() as u64));
        }
        let current = capture::capture_for_status(adapter, target, cancel).await?;
        let now = std::time::SystemTime::now();
        let current_baseline = Baseline::from_capture(&current, now);
        if compare(Some(baseline), Some(&current_baseline)).changed {
            return Ok((true, start.elapsed().as_millis() as u64));
        }
        if start.elapsed() >= timeout {
            return Ok((false, start.elapsed().as_millis() as u64));
        }
        tokio::select! {
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
            _ = cancel.cancelled() => return Ok((false, start.elapsed().as_millis() as u64)),
        }
    }
}

fn outcome(responsive: bool, method: ProbeMethod) -> (Confidence, Recommendation) {
    match (responsive, method) {
        (true, _) => (Confidence::High, Recommendation::Healthy),
        (false, ProbeMethod::InterruptTest) => (Confidence::High, Recommendation::DefinitelyStuck),
        (false, ProbeMethod::KeystrokeEcho) => (Confidence::Medium, Recommendation::LikelyStuck),
    }
}

async fn run_keystroke_echo(
    adapter: &dyn TmAdapter,
    target: &PaneTarget,
    baseline: &Baseline,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<(bool, u64), CoreError> {
    adapter.send_keys(target, " ", false, cancel).await?;
    adapter.send_keys(target, "\x7f", false, cancel).await?;
    poll_for_change(adapter, target, baseline, timeout, cancel).await
}

async fn run_interrupt_test(
    adapter: &dyn TmAdapter,
    target: &PaneTarget,
    baseline: &Baseline,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<(bool, u64), CoreError> {
    adapter.send_interrupt(target, cancel).await?;
    poll_for_change(adapter, target, baseline, timeout, cancel).await
}

/// Run a probe of `method` against `target`. `timeout` must already be
/// validated into `[100, 60000]` ms, and `aggressive`/`method` into a
/// valid combination, by the caller (CLI parsing, out of scope here).
/// `aggressive` escalates a negative keystroke-echo result to an
/// interrupt-test; it is only meaningful with `KeystrokeEcho`.
pub async fn probe(
    adapter: &dyn TmAdapter,
    target: &PaneTarget,
    method: ProbeMethod,
    timeout: Duration,
    aggressive: bool,
    cancel: &CancellationToken,
) -> Result<ProbeResult, CoreError> {
    let initial: Capture = capture::capture_for_status(adapter, target, cancel).await?;
    let baseline = Baseline::from_capture(&initial, std::time::SystemTime::now());

    let (responsive, latency_ms) = match method {
        ProbeMethod::KeystrokeEcho => run_keystroke_echo(adapter, target, &baseline, timeout, cancel).await?,
        ProbeMethod::InterruptTest => run_interrupt_test(adapter, target, &baseline, timeout, cancel).await?,
    };

    if !responsive && aggressive && method == ProbeMethod::KeystrokeEcho {
        let (escalated_responsive, escalated_latency) =
            run_interrupt_test(adapter, target, &baseline, timeout, cancel).await?;
        let (confidence, recommendation) = outcome(escalated_responsive, ProbeMethod::InterruptTest);
        return Ok(ProbeResult {
            responsive: escalated_responsive,
            confidence,
            recommendation,
            reasoning: "escalated from keystroke_echo".to_owned(),
            latency_ms: escalated_latency,
        });
    }

    let (confidence, recommendation) = outcome(responsive, method);
    let reasoning = if responsive {
        "pane content changed after probe stimulus".to_owned()
    } else {
        format!("no content change within {}ms", timeout.as_millis())
    };

    Ok(ProbeResult { responsive, confidence, recommendation, reasoning, latency_ms })
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
