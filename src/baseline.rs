// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pane baseline snapshots and change detection.
//!
//! A [`Baseline`] is a cheap, disposable snapshot — hash-compared first so
//! two identical captures never pay for a line-by-line diff, the same
//! short-circuit the screen layer uses before re-rendering on an
//! unchanged sequence number.

use std::time::SystemTime;

use crate::capture::Capture;

/// FNV-1a 64-bit hash, used only for change detection (not security).
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

/// A snapshot of pane content at a point in time.
#[derive(Debug, Clone)]
pub struct Baseline {
    pub content: String,
    pub content_hash: u64,
    pub line_count: usize,
    pub captured_at: SystemTime,
}

impl Baseline {
    /// Build a baseline from a sanitized capture. `line_count` counts only
    /// lines containing at least one non-whitespace rune.
    pub fn from_capture(capture: &Capture, captured_at: SystemTime) -> Self {
        Self {
            content: capture.text.clone(),
            content_hash: fnv1a(capture.text.as_bytes()),
            line_count: capture.non_empty_line_count(),
            captured_at,
        }
    }
}

/// The result of comparing two baselines (or a baseline against itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneChange {
    pub changed: bool,
    pub lines_delta: i64,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub latency_ms: i64,
}

/// Compare `baseline` against `current`. A `None` on either side always
/// yields `changed = true`. Hash equality short-circuits to
/// `changed = false` without comparing line counts.
pub fn compare(baseline: Option<&Baseline>, current: Option<&Baseline>) -> PaneChange {
    let (Some(baseline), Some(current)) = (baseline, current) else {
        return PaneChange { changed: true, lines_delta: 0, lines_added: 0, lines_removed: 0, latency_ms: 0 };
    };

    let latency_ms = current
        .captured_at
        .duration_since(baseline.captured_at)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    if baseline.content_hash == current.content_hash {
        return PaneChange { changed: false, lines_delta: 0, lines_added: 0, lines_removed: 0, latency_ms };
    }

    let delta = current.line_count as i64 - baseline.line_count as i64;
    PaneChange {
        changed: true,
        lines_delta: delta,
        lines_added: delta.max(0) as u64,
        lines_removed: (-delta).max(0) as u64,
        latency_ms,
    }
}

#[cfg(test)]
#[path = "baseline_tests.rs"]
mod tests;
