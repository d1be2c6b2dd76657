// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent type detection: pane title + captured output + pane index →
//! a typed guess with a confidence and the method that produced it.

use serde::{Deserialize, Serialize};

use crate::config::AgentKind;
use crate::patterns::{output_banner_tokens, title_tokens};

/// How an [`AgentTypeDetection`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Title,
    Output,
    Fallback,
}

/// Result of classifying a pane's agent kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTypeDetection {
    pub kind: AgentKind,
    pub confidence: f64,
    pub method: DetectionMethod,
}

const ALL_KINDS: &[AgentKind] = &[
    AgentKind::Claude,
    AgentKind::Codex,
    AgentKind::Gemini,
    AgentKind::Cursor,
    AgentKind::Windsurf,
    AgentKind::Aider,
];

/// Classify a pane's agent kind. Deterministic, first match wins:
/// 1. Title contains a known vendor token → confidence 0.9, method=title.
/// 2. Output contains a distinctive banner/prompt → confidence 0.75, method=output.
/// 3. Pane index 0 with no match and a user-role hint → `user`, confidence 0.8.
/// 4. Otherwise → `unknown`, confidence 0.2, method=fallback.
pub fn detect(title: &str, output: Option<&str>, pane_index: u32, user_role_hint: bool) -> AgentTypeDetection {
    let title_lower = title.to_ascii_lowercase();
    for &kind in ALL_KINDS {
        if title_tokens(kind).iter().any(|tok| title_lower.contains(&tok.to_ascii_lowercase())) {
            return AgentTypeDetection { kind, confidence: 0.9, method: DetectionMethod::Title };
        }
    }

    if let Some(output) = output {
        let output_lower = output.to_ascii_lowercase();
        for &kind in ALL_KINDS {
            if output_banner_tokens(kind).iter().any(|tok| output_lower.contains(&tok.to_ascii_lowercase())) {
                return AgentTypeDetection { kind, confidence: 0.75, method: DetectionMethod::Output };
            }
        }
    }

    if pane_index == 0 && user_role_hint {
        return AgentTypeDetection { kind: AgentKind::User, confidence: 0.8, method: DetectionMethod::Fallback };
    }

    AgentTypeDetection { kind: AgentKind::Unknown, confidence: 0.2, method: DetectionMethod::Fallback }
}

#[cfg(test)]
#[path = "agent_type_tests.rs"]
mod tests;
