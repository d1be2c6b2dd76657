// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Trend Tracker: a bounded per-pane ring of context-remaining
//! samples, classified into declining/stable/rising by the average of
//! consecutive deltas — the same ring-buffer discipline used for bounded
//! event history elsewhere in this codebase.

use std::collections::HashMap;
use std::time::SystemTime;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Default sample capacity per pane.
pub const DEFAULT_MAX_SAMPLES: usize = 10;
/// Minimum enforced capacity regardless of configuration.
pub const MIN_MAX_SAMPLES: usize = 2;

const DECLINE_THRESHOLD: f64 = -2.0;
const RISE_THRESHOLD: f64 = 2.0;

/// One observation of a pane's remaining context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSample {
    pub timestamp: SystemTime,
    pub context_remaining: Option<f64>,
}

/// Direction of context-remaining movement across recent samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Declining,
    Stable,
    Rising,
    Unknown,
}

/// Derived trend summary for one pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendInfo {
    pub trend: Trend,
    pub sample_count: usize,
    pub avg_delta: f64,
    pub last_value: Option<f64>,
    pub last_update: Option<SystemTime>,
}

struct Ring {
    capacity: usize,
    samples: Vec<TrendSample>,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(MIN_MAX_SAMPLES), samples: Vec::new() }
    }

    fn push(&mut self, sample: TrendSample) {
        self.samples.push(sample);
        if self.samples.len() > self.capacity {
            let excess = self.samples.len() - self.capacity;
            self.samples.drain(0..excess);
        }
    }
}

/// Process-wide, per-pane trend sample store guarded by a read/write lock.
pub struct TrendTracker {
    capacity: usize,
    panes: RwLock<HashMap<String, Ring>>,
}

impl TrendTracker {
    /// `max_samples` is clamped to at least [`MIN_MAX_SAMPLES`].
    pub fn new(max_samples: usize) -> Self {
        Self { capacity: max_samples.max(MIN_MAX_SAMPLES), panes: RwLock::new(HashMap::new()) }
    }

    pub fn add_sample(&self, pane_id: &str, sample: TrendSample) {
        let mut panes = self.panes.write();
        panes.entry(pane_id.to_owned()).or_insert_with(|| Ring::new(self.capacity)).push(sample);
    }

    pub fn get_last_sample(&self, pane_id: &str) -> Option<TrendSample> {
        let panes = self.panes.read();
        panes.get(pane_id)?.samples.last().copied()
    }

    /// Classify trend direction only, from the average consecutive delta
    /// of `context_remaining` values (samples lacking a value are ignored).
    pub fn get_trend(&self, pane_id: &str) -> Trend {
        self.get_trend_info(pane_id).trend
    }

    pub fn get_trend_info(&self, pane_id: &str) -> TrendInfo {
        let panes = self.panes.read();
        let Some(ring) = panes.get(pane_id) else {
            return TrendInfo { trend: Trend::Unknown, sample_count: 0, avg_delta: 0.0, last_value: None, last_update: None };
        };

        let values: Vec<f64> = ring.samples.iter().filter_map(|s| s.context_remaining).collect();
        let last_update = ring.samples.last().map(|s| s.timestamp);
        let last_value = values.last().copied();

        if values.len() < 2 {
            return TrendInfo { trend: Trend::Unknown, sample_count: values.len(), avg_delta: 0.0, last_value, last_update };
        }

        let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
        let avg_delta = deltas.iter().sum::<f64>() / deltas.len() as f64;

        let trend = if avg_delta < DECLINE_THRESHOLD {
            Trend::Declining
        } else if avg_delta > RISE_THRESHOLD {
            Trend::Rising
        } else {
            Trend::Stable
        };

        TrendInfo { trend, sample_count: values.len(), avg_delta, last_value, last_update }
    }

    pub fn clear_pane(&self, pane_id: &str) {
        self.panes.write().remove(pane_id);
    }

    pub fn clear_all(&self) {
        self.panes.write().clear();
    }

    /// Pane identifiers currently classified as declining.
    pub fn get_declining_panes(&self) -> Vec<String> {
        let ids: Vec<String> = self.panes.read().keys().cloned().collect();
        ids.into_iter().filter(|id| self.get_trend(id) == Trend::Declining).collect()
    }
}

#[cfg(test)]
#[path = "trend_tests.rs"]
mod tests;
