// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named pattern tables keyed by agent kind.
//!
//! Mirrors the screen-pattern compilation approach used for the
//! JSON-configurable detector (prompt/working/error regex sets): each
//! table here is data, not control flow, so a new agent kind or a
//! tuned idle suffix is a table edit, never a branch.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::AgentKind;

/// Suffixes on the last non-empty capture line that indicate a shell or
/// REPL prompt waiting for input. Intentionally permissive — tune as new
/// idle patterns are observed across shells.
pub const IDLE_PROMPT_SUFFIXES: &[&str] = &[
    "$ ", "% ", "> ", ">>> ", "... ", "# ", "❯ ", "→ ",
];

/// Vendor banner/prompt tokens recognized in pane output, used by the
/// agent type detector's method=output fallback.
pub fn output_banner_tokens(kind: AgentKind) -> &'static [&'static str] {
    match kind {
        AgentKind::Claude => &["claude>", "Claude Code"],
        AgentKind::Codex => &["Codex>", "codex>"],
        AgentKind::Gemini => &["gemini>", "Gemini>"],
        AgentKind::Cursor => &["cursor>"],
        AgentKind::Windsurf => &["windsurf>"],
        AgentKind::Aider => &["aider>", "aider chat"],
        AgentKind::User | AgentKind::Unknown => &[],
    }
}

/// Title tokens (case-insensitive) recognized by the agent type detector's
/// method=title match, including the documented short aliases.
pub fn title_tokens(kind: AgentKind) -> &'static [&'static str] {
    match kind {
        AgentKind::Claude => &["claude", "cc"],
        AgentKind::Codex => &["codex", "cod"],
        AgentKind::Gemini => &["gemini", "gmi"],
        AgentKind::Cursor => &["cursor"],
        AgentKind::Windsurf => &["windsurf"],
        AgentKind::Aider => &["aider"],
        AgentKind::User | AgentKind::Unknown => &[],
    }
}

/// Case-insensitive substrings in the last 20 lines that classify a
/// capture as an error state, regardless of agent kind.
pub const COMMON_ERROR_SUBSTRINGS: &[&str] =
    &["error:", "panic:", "fatal", "segmentation fault", "stack trace", "failed:"];

/// Agent-specific additional error substrings. For agents whose CLI wraps
/// a rate-limit condition in error-looking text, those phrases are
/// included here too, so the error check and the rate-limit check agree.
pub fn agent_error_substrings(kind: AgentKind) -> &'static [&'static str] {
    match kind {
        AgentKind::Claude => &["api error", "overloaded_error"],
        AgentKind::Codex => &["openai error"],
        AgentKind::Gemini => &["resource_exhausted"],
        _ => &[],
    }
}

/// Universal rate-limit phrases (case-insensitive substring match).
pub const RATE_LIMIT_SUBSTRINGS: &[&str] = &[
    "rate limit",
    "429",
    "too many requests",
    "resource exhausted",
    "quota exceeded",
    "you've hit your limit",
];

fn rate_limit_reset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)resets\s+\d+\s*(am|pm)").unwrap_or_else(|_| Regex::new("$^").unwrap()))
}

/// Whether `text` contains the wall-clock reset phrasing (`"resets 6am"`).
/// Exposed separately from [`RATE_LIMIT_SUBSTRINGS`] because it needs a
/// regex, not a plain substring.
pub fn has_rate_limit_reset_phrase(text: &str) -> bool {
    rate_limit_reset_re().is_match(text)
}

fn wait_seconds_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:wait\s+(\d+)\s*(?:second|sec|s)\b|retry\s+(?:in|after)\s+(\d+)|try again in\s+(\d+)\s*(?:second|sec|s)?|(\d+)\s*(?:second|sec|s)\s*(?:cooldown|delay))",
        )
        .unwrap_or_else(|_| Regex::new("$^").unwrap())
    })
}

/// Extract a "wait N seconds" hint from rate-limit text, bounded to
/// `(0, 3600]`. Returns `None` if no pattern matches or the value is
/// out of range.
pub fn extract_wait_seconds(text: &str) -> Option<u64> {
    let caps = wait_seconds_re().captures(text)?;
    let value = caps
        .iter()
        .skip(1)
        .flatten()
        .find_map(|m| m.as_str().parse::<u64>().ok())?;
    if value > 0 && value <= 3600 {
        Some(value)
    } else {
        None
    }
}

/// Per-agent context-remaining extractors. Each regex must have exactly
/// one capture group yielding a percentage in `[0, 100]`.
pub fn context_remaining_patterns(kind: AgentKind) -> &'static [&'static str] {
    match kind {
        AgentKind::Claude => &[
            r"(?i)context left until.*?(\d+)%",
            r"(?i)(\d+)%\s*context\s*remaining",
            r"(?i)context:\s*(\d+)%\s*remaining",
        ],
        AgentKind::Codex => &[r"(?i)(\d+)%\s*of context window remaining", r"(?i)context remaining:\s*(\d+)%"],
        AgentKind::Gemini => &[r"(?i)(\d+)%\s*context\s*left", r"(?i)context budget:\s*(\d+)%"],
        _ => &[r"(?i)(\d+)%\s*context\s*(?:remaining|left)"],
    }
}

#[cfg(test)]
#[path = "patterns_tests.rs"]
mod tests;
