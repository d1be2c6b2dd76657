// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Closed-set error taxonomy shared by every one-shot command response.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable error codes surfaced in command envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    SessionNotFound,
    PaneNotFound,
    InvalidFlag,
    Timeout,
    NotImplemented,
    DependencyMissing,
    InternalError,
    PermissionDenied,
    ResourceBusy,
    TmuxError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::PaneNotFound => "PANE_NOT_FOUND",
            Self::InvalidFlag => "INVALID_FLAG",
            Self::Timeout => "TIMEOUT",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::DependencyMissing => "DEPENDENCY_MISSING",
            Self::InternalError => "INTERNAL_ERROR",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceBusy => "RESOURCE_BUSY",
            Self::TmuxError => "TMUX_ERROR",
        }
    }

    /// Discovery hint surfaced alongside target-missing errors.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::SessionNotFound => Some("run `list-sessions` to see available sessions"),
            Self::PaneNotFound => Some("run `list-panes` to see available panes"),
            Self::InvalidFlag => Some("check the flag's valid set or range"),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured failure carrying both a code and a human-readable reason.
#[derive(Debug, Clone)]
pub struct CoreError {
    pub code: ErrorCode,
    pub reason: String,
}

impl CoreError {
    pub fn new(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self { code, reason: reason.into() }
    }

    pub fn session_not_found(session: &str) -> Self {
        Self::new(ErrorCode::SessionNotFound, format!("session not found: {session}"))
    }

    pub fn pane_not_found(pane: &str) -> Self {
        Self::new(ErrorCode::PaneNotFound, format!("pane not found: {pane}"))
    }

    pub fn invalid_flag(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFlag, reason)
    }

    pub fn timeout(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, reason)
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.reason)
    }
}

impl std::error::Error for CoreError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
