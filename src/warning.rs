// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Warning Emitter: threshold-driven level selection and a JSONL
//! stream sink, one record per line, serialized writes only — the same
//! append-only event-log discipline this codebase uses for its other
//! durable JSONL streams.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::AgentKind;
use crate::envelope::now_rfc3339;
use crate::trend::Trend;

/// Severity, from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Info,
    Warning,
    Critical,
    Alert,
}

impl Level {
    pub fn suggested_action(&self) -> &'static str {
        match self {
            Self::Critical => "Restart agent soon",
            Self::Warning => "Prepare restart, let current task finish",
            Self::Info => "Monitor context usage",
            Self::Alert => "Consider caam account switch",
        }
    }
}

/// Percentage thresholds that select a [`Level`] for context-remaining
/// warnings. Lower remaining-context percentages are more severe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub info: f64,
    pub warning: f64,
    pub critical: f64,
    pub alert: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { info: 40.0, warning: 25.0, critical: 15.0, alert: 80.0 }
    }
}

/// Select a context-remaining warning level, or `None` if above every
/// threshold. Non-increasing in severity as `percent` increases.
pub fn get_level(percent: f64, thresholds: &Thresholds) -> Option<Level> {
    if percent < thresholds.critical {
        Some(Level::Critical)
    } else if percent < thresholds.warning {
        Some(Level::Warning)
    } else if percent < thresholds.info {
        Some(Level::Info)
    } else {
        None
    }
}

/// One JSONL warning record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub level: Level,
    pub timestamp: String,
    pub session: String,
    pub pane: String,
    pub agent_type: AgentKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_remaining: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_trend: Option<Trend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_samples: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_used_pct: Option<f64>,
    pub suggested_action: String,
}

impl Warning {
    pub fn new(level: Level, session: impl Into<String>, pane: impl Into<String>, agent_type: AgentKind, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: now_rfc3339(),
            session: session.into(),
            pane: pane.into(),
            agent_type,
            message: message.into(),
            context_remaining: None,
            context_trend: None,
            trend_samples: None,
            provider: None,
            provider_used_pct: None,
            suggested_action: level.suggested_action().to_owned(),
        }
    }
}

/// Where the JSONL warning stream is written.
enum Sink {
    Stdout,
    File(File),
}

/// Serializes writes so warnings for a pane are emitted in timestamp
/// order, one JSON object per line.
pub struct WarningSink {
    sink: Mutex<Sink>,
}

impl WarningSink {
    pub fn stdout() -> Self {
        Self { sink: Mutex::new(Sink::Stdout) }
    }

    pub fn to_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { sink: Mutex::new(Sink::File(file)) })
    }

    /// Serialize and append `warning` as one newline-terminated JSON line.
    pub fn emit(&self, warning: &Warning) -> io::Result<()> {
        let line = serde_json::to_string(warning).map_err(io::Error::other)?;
        let mut sink = self.sink.lock();
        match &mut *sink {
            Sink::Stdout => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                writeln!(handle, "{line}")
            }
            Sink::File(file) => writeln!(file, "{line}"),
        }
    }
}

#[cfg(test)]
#[path = "warning_tests.rs"]
mod tests;
