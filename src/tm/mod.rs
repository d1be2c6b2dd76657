// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The terminal-multiplexer control surface.
//!
//! Everything in this module is an external collaborator: the core never
//! implements `send-keys`/`capture-pane`/`respawn-pane` against a real
//! multiplexer process itself. [`TmAdapter`] is the narrow, mockable
//! boundary every other component calls through, mirroring how upstream
//! sessions are addressed only through a thin client in this codebase's
//! own mux-registration layer.

pub mod mock;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use tokio_util::sync::CancellationToken;

use crate::error::CoreError;

/// A pane address, `session:window.pane`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaneTarget {
    pub session: String,
    pub window: u32,
    pub pane: u32,
}

impl fmt::Display for PaneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.session, self.window, self.pane)
    }
}

impl FromStr for PaneTarget {
    type Err = CoreError;

    /// Parse `session:window.pane`. `window` defaults to 0 and `pane`
    /// defaults to 0 when omitted (`session` alone, or `session:window`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (session, rest) = match s.split_once(':') {
            Some((s, r)) => (s, r),
            None => (s, "0.0"),
        };
        if session.is_empty() {
            return Err(CoreError::invalid_flag("pane target has an empty session name"));
        }
        let (window, pane) = match rest.split_once('.') {
            Some((w, p)) => (w, p),
            None => (rest, "0"),
        };
        let window: u32 = window
            .parse()
            .map_err(|_| CoreError::invalid_flag(format!("invalid window index `{window}`")))?;
        let pane: u32 = pane
            .parse()
            .map_err(|_| CoreError::invalid_flag(format!("invalid pane index `{pane}`")))?;
        Ok(PaneTarget { session: session.to_owned(), window, pane })
    }
}

/// Metadata about a single pane, as reported by `list-panes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneInfo {
    pub id: String,
    pub index: u32,
    pub title: String,
    pub active: bool,
}

/// Metadata about a session, as reported by `list-sessions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub name: String,
    pub attached: bool,
    pub windows: u32,
}

/// Future type returned by every [`TmAdapter`] method — boxed so the trait
/// stays object-safe for use as `Arc<dyn TmAdapter>`.
pub type TmFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CoreError>> + Send + 'a>>;

/// The terminal-multiplexer control API. Every call must be cancellable
/// and must surface failures as a [`CoreError`] with a reason string —
/// never silently treated as "nothing changed".
pub trait TmAdapter: Send + Sync {
    fn session_exists<'a>(&'a self, session: &'a str, cancel: &'a CancellationToken) -> TmFuture<'a, bool>;

    fn list_sessions<'a>(&'a self, cancel: &'a CancellationToken) -> TmFuture<'a, Vec<SessionInfo>>;

    fn list_panes<'a>(
        &'a self,
        session: &'a str,
        cancel: &'a CancellationToken,
    ) -> TmFuture<'a, Vec<PaneInfo>>;

    fn pane_activity_time<'a>(
        &'a self,
        target: &'a PaneTarget,
        cancel: &'a CancellationToken,
    ) -> TmFuture<'a, Option<std::time::SystemTime>>;

    fn capture_pane<'a>(
        &'a self,
        target: &'a PaneTarget,
        lines: usize,
        cancel: &'a CancellationToken,
    ) -> TmFuture<'a, String>;

    /// Fast, small capture used only for status detection (the adapter
    /// chooses its own line count).
    fn capture_for_status_detection<'a>(
        &'a self,
        target: &'a PaneTarget,
        cancel: &'a CancellationToken,
    ) -> TmFuture<'a, String>;

    fn send_keys<'a>(
        &'a self,
        target: &'a PaneTarget,
        text: &'a str,
        submit: bool,
        cancel: &'a CancellationToken,
    ) -> TmFuture<'a, ()>;

    fn send_interrupt<'a>(&'a self, target: &'a PaneTarget, cancel: &'a CancellationToken) -> TmFuture<'a, ()>;

    fn respawn_pane<'a>(
        &'a self,
        target: &'a PaneTarget,
        kill: bool,
        cancel: &'a CancellationToken,
    ) -> TmFuture<'a, ()>;
}

/// Look up a pane's title via `list_panes`, matching on pane index.
/// Callers that already hold a fresh `list_panes` result (the Monitor's
/// per-tick enumeration) should read the title off that instead of
/// calling this — it exists for one-shot commands that only have a
/// [`PaneTarget`] in hand. Returns an empty string if the pane can't be
/// found in the listing, letting title-based detection fall through to
/// weaker methods rather than fail outright.
pub async fn pane_title<'a>(
    adapter: &'a dyn TmAdapter,
    target: &'a PaneTarget,
    cancel: &'a CancellationToken,
) -> String {
    match adapter.list_panes(&target.session, cancel).await {
        Ok(panes) => panes.into_iter().find(|p| p.index == target.pane).map(|p| p.title).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
