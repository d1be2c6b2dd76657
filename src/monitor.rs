// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Monitor Loop: the one component allowed to observe the Classifier,
//! Activity Engine, and Trend Tracker together, breaking what would
//! otherwise be a cyclic dependency between them. Data flows one way per
//! tick: capture → classify → trend → emit.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::activity::ActivityTracker;
use crate::agent_type;
use crate::capture;
use crate::classify::{self, ActivityStateKind, ClassifyInput, DEFAULT_STALL_THRESHOLD};
use crate::config::{AgentKind, ProbeMethod};
use crate::credential::CredentialService;
use crate::error::CoreError;
use crate::health::{self, HealthCheck};
use crate::probe;
use crate::tm::{PaneTarget, TmAdapter};
use crate::trend::{TrendSample, TrendTracker};
use crate::warning::{get_level, Level, Thresholds, Warning, WarningSink};

/// Tunables for one Monitor instance. Argument parsing that produces
/// these values is an external concern; this struct is the validated
/// result.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub session: Option<String>,
    pub interval: Duration,
    pub provider_refresh: Duration,
    pub capture_lines: usize,
    pub sample_window: usize,
    pub thresholds: Thresholds,
    pub stall_threshold: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            session: None,
            interval: Duration::from_secs(30),
            provider_refresh: Duration::from_secs(120),
            capture_lines: 100,
            sample_window: 10,
            thresholds: Thresholds::default(),
            stall_threshold: DEFAULT_STALL_THRESHOLD,
        }
    }
}

/// Orchestrates the capture → classify → trend → emit pipeline on a
/// ticker. One-shot commands (`diagnose`, `probe`, `smart-restart`) reuse
/// [`observe_pane`] directly instead of driving the ticker.
pub struct Monitor {
    adapter: Arc<dyn TmAdapter>,
    credentials: Arc<dyn CredentialService>,
    sink: Arc<WarningSink>,
    activity: ActivityTracker,
    trend: TrendTracker,
    config: MonitorConfig,
    last_provider_refresh: Mutex<Option<Instant>>,
    provider_usage: Mutex<HashMap<String, f64>>,
}

/// Outcome of observing one pane for a single tick.
#[derive(Debug, Clone)]
pub struct PaneObservation {
    pub target: PaneTarget,
    pub kind: AgentKind,
    pub state: classify::ActivityState,
}

impl Monitor {
    pub fn new(
        adapter: Arc<dyn TmAdapter>,
        credentials: Arc<dyn CredentialService>,
        sink: Arc<WarningSink>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            adapter,
            credentials,
            sink,
            activity: ActivityTracker::new(),
            trend: TrendTracker::new(config.sample_window),
            config,
            last_provider_refresh: Mutex::new(None),
            provider_usage: Mutex::new(HashMap::new()),
        }
    }

    /// Run the ticker until `cancel` fires. Returns promptly after the
    /// in-flight tick finishes any writes; never leaves a partial JSONL
    /// record behind.
    pub async fn run(&self, cancel: &CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.interval.max(Duration::from_secs(1)));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(cancel).await;
                }
                _ = cancel.cancelled() => return,
            }
            if cancel.is_cancelled() {
                return;
            }
        }
    }

    /// One full pass over target panes: enumerate, refresh provider usage
    /// if due, observe each pane, emit warnings.
    pub async fn tick(&self, cancel: &CancellationToken) {
        let targets = match self.enumerate_targets(cancel).await {
            Ok(t) => t,
            Err(e) => {
                self.emit_error_alert("monitor", "0:0.0", &e);
                return;
            }
        };

        self.maybe_refresh_providers(cancel).await;

        for (target, title) in targets {
            if cancel.is_cancelled() {
                return;
            }
            match self.observe_pane_titled(&target, &title, cancel).await {
                Ok(observation) => self.emit_for_observation(&observation),
                Err(e) => self.emit_error_alert(&target.session, &target.to_string(), &e),
            }
        }
    }

    async fn enumerate_targets(&self, cancel: &CancellationToken) -> Result<Vec<(PaneTarget, String)>, CoreError> {
        let sessions = match &self.config.session {
            Some(name) => vec![name.clone()],
            None => self.adapter.list_sessions(cancel).await?.into_iter().map(|s| s.name).collect(),
        };

        let mut targets = Vec::new();
        for session in sessions {
            let panes = self.adapter.list_panes(&session, cancel).await?;
            for pane in panes {
                let target = PaneTarget { session: session.clone(), window: 0, pane: pane.index };
                targets.push((target, pane.title));
            }
        }
        Ok(targets)
    }

    async fn maybe_refresh_providers(&self, _cancel: &CancellationToken) {
        let due = {
            let mut last = self.last_provider_refresh.lock();
            let due = match *last {
                None => true,
                Some(t) => t.elapsed() >= self.config.provider_refresh,
            };
            if due {
                *last = Some(Instant::now());
            }
            due
        };
        if !due {
            return;
        }
        for provider in self.credentials.supported_providers() {
            if let Ok(usage) = self.credentials.get_provider_usage(&provider).await {
                if let Some(pct) = usage.used_percent {
                    self.provider_usage.lock().insert(provider.clone(), pct);
                    if pct >= self.config.thresholds.alert {
                        let mut warning =
                            Warning::new(Level::Alert, "*", "*", AgentKind::Unknown, "Provider usage threshold reached");
                        warning.provider = Some(provider);
                        warning.provider_used_pct = Some(pct);
                        let _ = self.sink.emit(&warning);
                    }
                }
            }
        }
    }

    /// Capture, detect agent type, classify, and record activity/trend
    /// bookkeeping for a single pane. Used by one-shot commands
    /// (`diagnose`) that only have a [`PaneTarget`] in hand; looks the
    /// pane's title up via `list_panes` before detecting. The ticker uses
    /// [`Self::observe_pane_titled`] directly since it already has the
    /// title from its own enumeration pass.
    pub async fn observe_pane(
        &self,
        target: &PaneTarget,
        cancel: &CancellationToken,
    ) -> Result<PaneObservation, CoreError> {
        let title = crate::tm::pane_title(self.adapter.as_ref(), target, cancel).await;
        self.observe_pane_titled(target, &title, cancel).await
    }

    /// Same as [`Self::observe_pane`] but takes the pane's title directly
    /// instead of looking it up, so the ticker doesn't re-list panes it
    /// already enumerated this tick.
    async fn observe_pane_titled(
        &self,
        target: &PaneTarget,
        title: &str,
        cancel: &CancellationToken,
    ) -> Result<PaneObservation, CoreError> {
        let now = SystemTime::now();
        let pane_id = target.to_string();

        let cap = capture::capture(self.adapter.as_ref(), target, self.config.capture_lines, cancel).await?;
        let (_, _lines_delta) = self.activity.update_activity(&pane_id, &cap.text, now);
        let velocity_cps = self.activity.velocity_cps(&pane_id).unwrap_or(0.0);
        let time_since_last_activity =
            self.activity.time_since_last_activity(&pane_id, now).unwrap_or_default();

        let detection = agent_type::detect(title, Some(&cap.text), target.pane, target.pane == 0);
        let kind = detection.kind;

        let state = classify::classify(ClassifyInput {
            capture: &cap,
            kind,
            velocity_cps,
            stall_threshold: self.config.stall_threshold,
            time_since_last_activity,
            prior: None,
            now,
        });

        self.trend.add_sample(&pane_id, TrendSample { timestamp: now, context_remaining: state.context_remaining });

        Ok(PaneObservation { target: target.clone(), kind, state })
    }

    /// One-shot `diagnose` pipeline: an [`Self::observe_pane`] pass for the
    /// activity/classifier signals, plus an active keystroke-echo probe
    /// for process liveness, combined into one [`HealthCheck`].
    pub async fn diagnose_pane(
        &self,
        target: &PaneTarget,
        probe_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<HealthCheck, CoreError> {
        let observation = self.observe_pane(target, cancel).await?;
        let pane_id = target.to_string();
        let now = SystemTime::now();
        let time_since_last_activity = self.activity.time_since_last_activity(&pane_id, now).unwrap_or_default();

        let probe_result = probe::probe(
            self.adapter.as_ref(),
            target,
            ProbeMethod::KeystrokeEcho,
            probe_timeout,
            false,
            cancel,
        )
        .await?;

        Ok(health::health_check(&observation.state, time_since_last_activity, probe_result.responsive, now))
    }

    fn emit_for_observation(&self, observation: &PaneObservation) {
        let pane_id = observation.target.to_string();
        let state = &observation.state;

        if let Some(pct) = state.context_remaining {
            if let Some(level) = get_level(pct, &self.config.thresholds) {
                let info = self.trend.get_trend_info(&pane_id);
                let mut warning = Warning::new(
                    level,
                    &observation.target.session,
                    &pane_id,
                    observation.kind,
                    "Agent context window running low",
                );
                warning.context_remaining = Some(pct);
                warning.context_trend = Some(info.trend);
                warning.trend_samples = Some(info.sample_count);
                let _ = self.sink.emit(&warning);
            }
        }

        if state.rate_limited {
            let warning = Warning::new(
                Level::Alert,
                &observation.target.session,
                &pane_id,
                observation.kind,
                "Agent hit rate limit",
            );
            let _ = self.sink.emit(&warning);
        }

        if state.state == ActivityStateKind::Error {
            let detail = state.error_detail.clone().unwrap_or_default();
            let warning = Warning::new(
                Level::Alert,
                &observation.target.session,
                &pane_id,
                observation.kind,
                format!("Agent entered error state: {detail}"),
            );
            let _ = self.sink.emit(&warning);
        }
    }

    fn emit_error_alert(&self, session: &str, pane: &str, err: &CoreError) {
        let warning = Warning::new(Level::Alert, session, pane, AgentKind::Unknown, err.to_string());
        let _ = self.sink.emit(&warning);
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
