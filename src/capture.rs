// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pane capture and sanitization.
//!
//! Wraps the external [`TmAdapter`](crate::tm::TmAdapter) capture call and
//! normalizes its output: ANSI escape sequences stripped, line endings
//! normalized to `LF`. Capture failures are never treated as "pane
//! unchanged" — callers get a [`CoreError`] and must decide whether to
//! retry.

use regex::Regex;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::tm::{PaneTarget, TmAdapter};

fn ansi_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // ESC up to and including the next ASCII letter terminator.
        Regex::new("\x1b[^A-Za-z]*[A-Za-z]").unwrap_or_else(|_| Regex::new("$^").unwrap())
    })
}

/// Remove every ANSI escape sequence from `text`.
///
/// Invariant upheld by this function: the result contains no `ESC` byte.
pub fn strip_ansi(text: &str) -> String {
    ansi_re().replace_all(text, "").into_owned()
}

/// Split `text` into lines, normalizing `CRLF`/`CR` to `LF` and dropping a
/// trailing empty line produced by a final newline.
pub fn split_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = normalized.split('\n').map(str::to_owned).collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// A sanitized pane capture ready for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub text: String,
    pub lines: Vec<String>,
}

impl Capture {
    fn from_raw(raw: &str) -> Self {
        let sanitized = strip_ansi(raw);
        let lines = split_lines(&sanitized);
        Self { text: sanitized, lines }
    }

    /// The last line containing at least one non-whitespace rune.
    pub fn last_non_empty_line(&self) -> Option<&str> {
        self.lines.iter().rev().map(String::as_str).find(|l| !l.trim().is_empty())
    }

    /// Lines that contain at least one non-whitespace rune.
    pub fn non_empty_line_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.trim().is_empty()).count()
    }
}

/// Capture up to `lines` rows of scrollback from `target` and sanitize it.
pub async fn capture(
    adapter: &dyn TmAdapter,
    target: &PaneTarget,
    lines: usize,
    cancel: &CancellationToken,
) -> Result<Capture, CoreError> {
    let raw = adapter.capture_pane(target, lines, cancel).await?;
    Ok(Capture::from_raw(&raw))
}

/// Capture using the adapter's fast status-detection default.
pub async fn capture_for_status(
    adapter: &dyn TmAdapter,
    target: &PaneTarget,
    cancel: &CancellationToken,
) -> Result<Capture, CoreError> {
    let raw = adapter.capture_for_status_detection(target, cancel).await?;
    Ok(Capture::from_raw(&raw))
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
