// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI surface and shared configuration.
//!
//! Argument parsing itself is an external concern this crate merely wires
//! up via `clap`; the validation and defaulting rules below are the part
//! that belongs to the core (duration/percentage bounds, the closed method
//! set for probes, etc).

use std::fmt;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Known agent kinds a pane may be running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Claude,
    Codex,
    Gemini,
    Cursor,
    Windsurf,
    Aider,
    User,
    Unknown,
}

impl AgentKind {
    /// Resolve a free-form token (title text, `--agent` flag, alias) to a
    /// kind. Case-insensitive; recognizes the short aliases `cc`, `cod`,
    /// `gmi` alongside the full names.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "claude" | "cc" => Some(Self::Claude),
            "codex" | "cod" => Some(Self::Codex),
            "gemini" | "gmi" => Some(Self::Gemini),
            "cursor" => Some(Self::Cursor),
            "windsurf" => Some(Self::Windsurf),
            "aider" => Some(Self::Aider),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
            Self::Cursor => "cursor",
            Self::Windsurf => "windsurf",
            Self::Aider => "aider",
            Self::User => "user",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level CLI surface. The orchestration core consumes the parsed,
/// validated values; the argument grammar itself is not part of the core.
#[derive(Debug, Parser)]
#[command(name = "paneward", version, about = "Orchestration layer for TM-hosted coding agents.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Run the proactive monitor loop over a set of panes.
    Monitor(MonitorArgs),
    /// One-shot: classify a pane's current state.
    Diagnose(TargetArgs),
    /// One-shot: probe a pane for responsiveness.
    Probe(ProbeArgs),
    /// One-shot or batch: run the smart restart protocol.
    SmartRestart(RestartArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct TargetArgs {
    /// Pane target, `session:window.pane`.
    pub target: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct MonitorArgs {
    /// Session to monitor; all non-control panes if omitted.
    #[arg(long)]
    pub session: Option<String>,
    /// Poll interval, e.g. `30s`, `2m`.
    #[arg(long, default_value = "30s", value_parser = parse_duration_flag)]
    pub interval: Duration,
    /// Provider usage refresh interval.
    #[arg(long, default_value = "2m", value_parser = parse_duration_flag)]
    pub provider_refresh: Duration,
    /// Lines of scrollback to capture per tick.
    #[arg(long, default_value_t = 100)]
    pub capture_lines: usize,
    /// Rolling sample window size per pane.
    #[arg(long, default_value_t = 10)]
    pub sample_window: usize,
    /// Write JSONL warnings to this file instead of stdout.
    #[arg(long)]
    pub out_file: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum, PartialEq, Eq)]
pub enum ProbeMethod {
    KeystrokeEcho,
    InterruptTest,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ProbeArgs {
    pub target: String,
    #[arg(long, value_enum, default_value = "keystroke-echo")]
    pub method: ProbeMethod,
    #[arg(long, default_value = "5000", value_parser = parse_probe_timeout_flag)]
    pub timeout_ms: u64,
    /// Escalate to interrupt-test if keystroke-echo is negative.
    /// Only valid with `--method keystroke-echo`.
    #[arg(long)]
    pub aggressive: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RestartArgs {
    pub targets: Vec<String>,
    #[arg(long)]
    pub force: bool,
    #[arg(long)]
    pub dry_run: bool,
    #[arg(long)]
    pub parallel: bool,
    /// Message to send after a successful restart.
    #[arg(long)]
    pub follow_up: Option<String>,
}

/// Parse a `<number><unit>` duration string (`ms`, `s`, `m`, `h`).
pub fn parse_duration(raw: &str) -> Result<Duration, CoreError> {
    let raw = raw.trim();
    let split_at = raw.find(|c: char| !c.is_ascii_digit()).ok_or_else(|| {
        CoreError::invalid_flag(format!("duration `{raw}` is missing a unit"))
    })?;
    let (num, unit) = raw.split_at(split_at);
    let value: u64 = num
        .parse()
        .map_err(|_| CoreError::invalid_flag(format!("duration `{raw}` has an invalid number")))?;
    let duration = match unit {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value * 60),
        "h" => Duration::from_secs(value * 3600),
        other => {
            return Err(CoreError::invalid_flag(format!("unknown duration unit `{other}`")))
        }
    };
    Ok(duration)
}

fn parse_duration_flag(raw: &str) -> Result<Duration, String> {
    parse_duration(raw).map_err(|e| e.to_string())
}

/// Validate a percentage flag is within `[0, 100]`.
pub fn parse_percentage(raw: &str) -> Result<f64, CoreError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| CoreError::invalid_flag(format!("`{raw}` is not a number")))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(CoreError::invalid_flag(format!("percentage `{raw}` out of range [0, 100]")));
    }
    Ok(value)
}

/// Validate a probe timeout is within `[100, 60000]` ms.
pub fn parse_probe_timeout(raw: &str) -> Result<u64, CoreError> {
    let value: u64 = raw
        .parse()
        .map_err(|_| CoreError::invalid_flag(format!("`{raw}` is not a valid timeout")))?;
    if !(100..=60_000).contains(&value) {
        return Err(CoreError::invalid_flag(format!(
            "probe timeout {value}ms out of range [100, 60000]"
        )));
    }
    Ok(value)
}

fn parse_probe_timeout_flag(raw: &str) -> Result<u64, String> {
    parse_probe_timeout(raw).map_err(|e| e.to_string())
}

/// Validate flag combinations `clap`'s grammar can't express on its own.
/// `--aggressive` only means anything alongside keystroke-echo — paired
/// with `--method interrupt-test` it would silently no-op, so reject it
/// up front instead.
pub fn validate_probe_args(args: &ProbeArgs) -> Result<(), CoreError> {
    if args.aggressive && args.method != ProbeMethod::KeystrokeEcho {
        return Err(CoreError::invalid_flag("--aggressive is only valid with --method keystroke-echo"));
    }
    Ok(())
}

/// Minimum effective monitor interval — `parse_duration` may return
/// anything, but monitor loops clamp below this up to it.
pub const MIN_MONITOR_INTERVAL: Duration = Duration::from_secs(1);

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
