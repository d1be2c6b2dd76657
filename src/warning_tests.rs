// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use proptest::prelude::*;

use super::*;

#[test]
fn level_selection_matches_documented_scenarios() {
    let t = Thresholds::default();
    assert_eq!(get_level(14.0, &t), Some(Level::Critical));
    assert_eq!(get_level(24.0, &t), Some(Level::Warning));
    assert_eq!(get_level(39.0, &t), Some(Level::Info));
    assert_eq!(get_level(50.0, &t), None);
}

proptest! {
    /// Lower remaining-context percentages never select a less severe
    /// level than a higher percentage does — severity only moves one way
    /// as context drains.
    #[test]
    fn level_is_non_increasing_in_severity_as_percent_rises(lower in 0.0f64..=100.0, delta in 0.0f64..=100.0) {
        let t = Thresholds::default();
        let higher = (lower + delta).min(100.0);

        let lower_level = get_level(lower, &t);
        let higher_level = get_level(higher, &t);

        match (lower_level, higher_level) {
            (Some(l), Some(h)) => prop_assert!(h <= l),
            (None, Some(_)) => prop_assert!(false, "higher percent produced a level the lower one didn't"),
            _ => {}
        }
    }
}

#[test]
fn suggested_action_table_is_closed() {
    assert_eq!(Level::Critical.suggested_action(), "Restart agent soon");
    assert_eq!(Level::Warning.suggested_action(), "Prepare restart, let current task finish");
    assert_eq!(Level::Info.suggested_action(), "Monitor context usage");
    assert_eq!(Level::Alert.suggested_action(), "Consider caam account switch");
}

#[test]
fn warning_emits_one_jsonl_line_to_a_file() {
    let dir = std::env::temp_dir().join(format!("paneward-warning-test-{:?}", std::thread::current().id()));
    std::fs::create_dir_all(&dir).expect("tempdir");
    let path = dir.join("warnings.jsonl");
    let _ = std::fs::remove_file(&path);

    let sink = WarningSink::to_file(&path).expect("sink");
    let warning = Warning::new(Level::Warning, "main", "0:0.0", AgentKind::Claude, "context getting low");
    sink.emit(&warning).expect("emit");

    let content = std::fs::read_to_string(&path).expect("read warnings");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    let parsed: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json");
    assert_eq!(parsed["level"], "WARNING");
    assert_eq!(parsed["suggested_action"], "Prepare restart, let current task finish");

    let _ = std::fs::remove_file(&path);
}
