//! JSON output formatting.

use serde::Serialize;

/// Format a value as JSON.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Format a batch report as JSON lines, one outcome per line.
pub fn format_json_lines<T: Serialize>(items: &[T]) -> String {
    items
        .iter()
        .map(format_json)
        .collect::<Vec<_>>()
        .join("\n")
}
