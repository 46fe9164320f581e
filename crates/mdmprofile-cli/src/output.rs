//! Output formatting utilities.

use mdmprofile_canonical::SuppressionOutcome;
use serde::Serialize;

/// Formats any serializable value as pretty JSON.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Prints one row per compared substructure.
#[allow(clippy::print_literal)]
pub fn print_decisions(outcome: &SuppressionOutcome) {
    println!("{:<16} {:<10} {}", "NAME", "ACTION", "DECISION");
    println!("{}", "-".repeat(60));
    for (name, decision) in &outcome.decisions {
        let action = if outcome.suppressed.contains(name) {
            "suppress"
        } else {
            "keep-new"
        };
        println!("{:<16} {:<10} {}", truncate(name, 16), action, decision);
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
