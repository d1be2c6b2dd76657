// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`TmAdapter`] used by unit tests and by callers wiring up the
//! core without a real multiplexer attached yet.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;

use tokio_util::sync::CancellationToken;

use super::{PaneInfo, PaneTarget, SessionInfo, TmAdapter, TmFuture};
use crate::error::CoreError;

#[derive(Debug, Clone, Default)]
struct PaneState {
    content: String,
    title: String,
    last_activity: Option<SystemTime>,
    sent_keys: Vec<String>,
    interrupts: usize,
    respawns: usize,
}

/// Scriptable fake multiplexer. Panes are addressed by [`PaneTarget`]
/// `Display` form (`session:window.pane`); missing panes surface
/// `PANE_NOT_FOUND` the same way a real adapter would.
#[derive(Default)]
pub struct MockAdapter {
    panes: Mutex<HashMap<String, PaneState>>,
    sessions: Mutex<Vec<SessionInfo>>,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pane with initial content and title.
    pub fn set_pane(&self, target: &PaneTarget, content: impl Into<String>, title: impl Into<String>) {
        let mut panes = self.panes.lock().unwrap_or_else(|e| e.into_inner());
        panes.insert(
            target.to_string(),
            PaneState {
                content: content.into(),
                title: title.into(),
                last_activity: Some(SystemTime::now()),
                ..Default::default()
            },
        );
    }

    /// Replace a pane's content, simulating new output arriving.
    pub fn push_output(&self, target: &PaneTarget, content: impl Into<String>) {
        let mut panes = self.panes.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = panes.get_mut(&target.to_string()) {
            state.content = content.into();
            state.last_activity = Some(SystemTime::now());
        }
    }

    /// Set a pane's title, simulating a freshly (re)spawned agent
    /// announcing itself after `respawn_pane` clears the previous title.
    pub fn push_title(&self, target: &PaneTarget, title: impl Into<String>) {
        let mut panes = self.panes.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = panes.get_mut(&target.to_string()) {
            state.title = title.into();
        }
    }

    pub fn set_session(&self, name: impl Into<String>, attached: bool, windows: u32) {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).push(SessionInfo {
            name: name.into(),
            attached,
            windows,
        });
    }

    pub fn sent_keys(&self, target: &PaneTarget) -> Vec<String> {
        self.panes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&target.to_string())
            .map(|s| s.sent_keys.clone())
            .unwrap_or_default()
    }

    pub fn interrupt_count(&self, target: &PaneTarget) -> usize {
        self.panes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&target.to_string())
            .map(|s| s.interrupts)
            .unwrap_or(0)
    }

    pub fn respawn_count(&self, target: &PaneTarget) -> usize {
        self.panes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&target.to_string())
            .map(|s| s.respawns)
            .unwrap_or(0)
    }
}

impl TmAdapter for MockAdapter {
    fn session_exists<'a>(&'a self, session: &'a str, _cancel: &'a CancellationToken) -> TmFuture<'a, bool> {
        let found = self.sessions.lock().unwrap_or_else(|e| e.into_inner()).iter().any(|s| s.name == session);
        Box::pin(async move { Ok(found) })
    }

    fn list_sessions<'a>(&'a self, _cancel: &'a CancellationToken) -> TmFuture<'a, Vec<SessionInfo>> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner()).clone();
        Box::pin(async move { Ok(sessions) })
    }

    fn list_panes<'a>(
        &'a self,
        session: &'a str,
        _cancel: &'a CancellationToken,
    ) -> TmFuture<'a, Vec<PaneInfo>> {
        let panes = self.panes.lock().unwrap_or_else(|e| e.into_inner());
        let mut out = vec![];
        for (key, state) in panes.iter() {
            if let Ok(target) = key.parse::<PaneTarget>() {
                if target.session == session {
                    out.push(PaneInfo {
                        id: key.clone(),
                        index: target.pane,
                        title: state.title.clone(),
                        active: true,
                    });
                }
            }
        }
        out.sort_by_key(|p| p.index);
        Box::pin(async move { Ok(out) })
    }

    fn pane_activity_time<'a>(
        &'a self,
        target: &'a PaneTarget,
        _cancel: &'a CancellationToken,
    ) -> TmFuture<'a, Option<SystemTime>> {
        let ts = self
            .panes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&target.to_string())
            .and_then(|s| s.last_activity);
        Box::pin(async move { Ok(ts) })
    }

    fn capture_pane<'a>(
        &'a self,
        target: &'a PaneTarget,
        _lines: usize,
        _cancel: &'a CancellationToken,
    ) -> TmFuture<'a, String> {
        let result = self
            .panes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&target.to_string())
            .map(|s| s.content.clone())
            .ok_or_else(|| CoreError::pane_not_found(&target.to_string()));
        Box::pin(async move { result })
    }

    fn capture_for_status_detection<'a>(
        &'a self,
        target: &'a PaneTarget,
        cancel: &'a CancellationToken,
    ) -> TmFuture<'a, String> {
        self.capture_pane(target, 50, cancel)
    }

    fn send_keys<'a>(
        &'a self,
        target: &'a PaneTarget,
        text: &'a str,
        _submit: bool,
        _cancel: &'a CancellationToken,
    ) -> TmFuture<'a, ()> {
        let mut panes = self.panes.lock().unwrap_or_else(|e| e.into_inner());
        let result = match panes.get_mut(&target.to_string()) {
            Some(state) => {
                state.sent_keys.push(text.to_owned());
                Ok(())
            }
            None => Err(CoreError::pane_not_found(&target.to_string())),
        };
        Box::pin(async move { result })
    }

    fn send_interrupt<'a>(&'a self, target: &'a PaneTarget, _cancel: &'a CancellationToken) -> TmFuture<'a, ()> {
        let mut panes = self.panes.lock().unwrap_or_else(|e| e.into_inner());
        let result = match panes.get_mut(&target.to_string()) {
            Some(state) => {
                state.interrupts += 1;
                Ok(())
            }
            None => Err(CoreError::pane_not_found(&target.to_string())),
        };
        Box::pin(async move { result })
    }

    fn respawn_pane<'a>(
        &'a self,
        target: &'a PaneTarget,
        _kill: bool,
        _cancel: &'a CancellationToken,
    ) -> TmFuture<'a, ()> {
        let mut panes = self.panes.lock().unwrap_or_else(|e| e.into_inner());
        let result = match panes.get_mut(&target.to_string()) {
            Some(state) => {
                state.respawns += 1;
                state.content.clear();
                // A killed pane's process owned its title; the fresh shell
                // that replaces it has none until the new agent announces
                // itself, same as a real respawn.
                state.title.clear();
                Ok(())
            }
            None => Err(CoreError::pane_not_found(&target.to_string())),
        };
        Box::pin(async move { result })
    }
}

#[cfg(test)]
#[path = "mock_tests.rs"]
mod tests;
