// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Success/error response envelope shared by every one-shot command.
//!
//! This mirrors the wire contract owned by the response-rendering layer
//! (out of scope for this crate); `Envelope` is the shape the core hands
//! that layer, not a rendering implementation.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ErrorCode;

/// Common envelope wrapping every one-shot command's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            timestamp: now_rfc3339(),
            data: Some(data),
            error: None,
            error_code: None,
            hint: None,
        }
    }

    pub fn err(code: ErrorCode, reason: impl Into<String>) -> Self {
        let hint = code.default_hint().map(str::to_owned);
        Self {
            success: false,
            timestamp: now_rfc3339(),
            data: None,
            error: Some(reason.into()),
            error_code: Some(code),
            hint,
        }
    }

    pub fn err_with_hint(code: ErrorCode, reason: impl Into<String>, hint: impl Into<String>) -> Self {
        let mut env = Self::err(code, reason);
        env.hint = Some(hint.into());
        env
    }
}

/// Current wall-clock time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Hand-rolled to avoid pulling in a full calendar crate for a single
/// UTC-only formatting need; see [`rfc3339_from_millis`] for the inverse
/// direction used by tests.
pub fn now_rfc3339() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;
    rfc3339_from_millis(millis)
}

/// Format a Unix epoch-millis timestamp as RFC 3339 UTC.
pub fn rfc3339_from_millis(millis: i64) -> String {
    let secs = millis.div_euclid(1000);
    let ms = millis.rem_euclid(1000);
    let days = secs.div_euclid(86_400);
    let day_secs = secs.rem_euclid(86_400);

    let (year, month, day) = civil_from_days(days);
    let hour = day_secs / 3600;
    let min = (day_secs % 3600) / 60;
    let sec = day_secs % 60;

    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{min:02}:{sec:02}.{ms:03}Z")
}

fn is_leap(y: i64) -> bool {
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}

/// Convert a day count since the Unix epoch into a (year, month, day) triple.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let days_in_month = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut year = 1970i64;
    let mut remaining = days;

    loop {
        let year_len = if is_leap(year) { 366 } else { 365 };
        if remaining >= year_len {
            remaining -= year_len;
            year += 1;
        } else if remaining < 0 {
            year -= 1;
            remaining += if is_leap(year) { 366 } else { 365 };
        } else {
            break;
        }
    }

    let mut month = 1u32;
    for (idx, &len) in days_in_month.iter().enumerate() {
        let len = if idx == 1 && is_leap(year) { len + 1 } else { len };
        if remaining < len as i64 {
            month = idx as u32 + 1;
            break;
        }
        remaining -= len as i64;
    }

    (year, month, remaining as u32 + 1)
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
