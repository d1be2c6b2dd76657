// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Activity Engine: a process-wide map of per-pane last-activity
//! timestamps and output velocity, guarded by one lock with short
//! critical sections — mirroring the single-map-single-lock shape the
//! session aggregator uses for its pane registry.

use std::collections::HashMap;
use std::time::SystemTime;

use parking_lot::Mutex;

/// Rolling window size for velocity derivation: the last N captures.
pub const VELOCITY_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy)]
struct Sample {
    at: SystemTime,
    char_count: usize,
}

/// Per-pane bookkeeping the engine maintains between captures.
#[derive(Debug, Clone)]
struct PaneActivity {
    last_activity_ts: SystemTime,
    last_line_count: usize,
    last_content_hash: u64,
    samples: Vec<Sample>,
}

/// The result of one `update_activity` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityUpdate {
    pub last_output_timestamp_millis_since: u128,
    pub lines_delta: i64,
}

fn fnv1a(data: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Process-wide pane activity tracker, one lock for the whole map.
pub struct ActivityTracker {
    panes: Mutex<HashMap<String, PaneActivity>>,
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self { panes: Mutex::new(HashMap::new()) }
    }

    /// Update activity bookkeeping for `pane_id` given sanitized `content`.
    /// Returns the current last-activity timestamp and the line-count
    /// delta that triggered it (`0` when nothing changed).
    ///
    /// `last_activity_ts` advances only when the line count changes or the
    /// content changes while the count stays equal. A line count drop
    /// (buffer wrap) always counts as activity, with `delta` set to the
    /// new line count.
    pub fn update_activity(&self, pane_id: &str, content: &str, now: SystemTime) -> (SystemTime, i64) {
        let line_count = content.lines().count();
        let hash = fnv1a(content.as_bytes());
        let char_count = content.chars().count();

        let mut panes = self.panes.lock();
        let entry = panes.entry(pane_id.to_owned());
        match entry {
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(PaneActivity {
                    last_activity_ts: now,
                    last_line_count: line_count,
                    last_content_hash: hash,
                    samples: vec![Sample { at: now, char_count }],
                });
                (now, line_count as i64)
            }
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                let state = slot.get_mut();
                let delta = if line_count < state.last_line_count {
                    // Buffer wrap: treated as activity, delta = new count.
                    state.last_activity_ts = now;
                    line_count as i64
                } else if line_count > state.last_line_count {
                    let d = (line_count - state.last_line_count) as i64;
                    state.last_activity_ts = now;
                    d
                } else if hash != state.last_content_hash {
                    state.last_activity_ts = now;
                    1
                } else {
                    0
                };

                state.last_line_count = line_count;
                state.last_content_hash = hash;
                if delta != 0 || state.samples.is_empty() {
                    state.samples.push(Sample { at: now, char_count });
                    if state.samples.len() > VELOCITY_WINDOW {
                        let excess = state.samples.len() - VELOCITY_WINDOW;
                        state.samples.drain(0..excess);
                    }
                }
                (state.last_activity_ts, delta)
            }
        }
    }

    /// Characters per second derived from the last [`VELOCITY_WINDOW`]
    /// recorded samples. `None` if fewer than two samples are on record.
    pub fn velocity_cps(&self, pane_id: &str) -> Option<f64> {
        let panes = self.panes.lock();
        let state = panes.get(pane_id)?;
        if state.samples.len() < 2 {
            return Some(0.0);
        }
        let first = state.samples.first()?;
        let last = state.samples.last()?;
        let elapsed = last.at.duration_since(first.at).ok()?.as_secs_f64();
        if elapsed <= 0.0 {
            return Some(0.0);
        }
        let chars = last.char_count.saturating_sub(first.char_count) as f64;
        Some((chars / elapsed).max(0.0))
    }

    /// Time elapsed since the pane's last recorded activity, relative to
    /// `now`. `None` if the pane has never been observed.
    pub fn time_since_last_activity(&self, pane_id: &str, now: SystemTime) -> Option<std::time::Duration> {
        let panes = self.panes.lock();
        let state = panes.get(pane_id)?;
        Some(now.duration_since(state.last_activity_ts).unwrap_or_default())
    }

    /// Drop all bookkeeping for `pane_id`.
    pub fn clear_pane(&self, pane_id: &str) {
        self.panes.lock().remove(pane_id);
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
