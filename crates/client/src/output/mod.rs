//! Output formatting functions.

pub mod json;
pub mod pretty;

use serde::Serialize;

use crate::cli::OutputFormat;

/// Render a value: JSON as-is, pretty through `pretty`.
pub fn render<T: Serialize + ?Sized>(
    value: &T,
    format: OutputFormat,
    pretty: impl FnOnce(&T) -> String,
) -> String {
    match format {
        OutputFormat::Json => json::format_json(value),
        OutputFormat::Pretty => pretty(value),
    }
}

/// Render a batch report. JSON output has one outcome per line.
pub fn render_batch<T: Serialize>(
    items: &[T],
    format: OutputFormat,
    pretty: impl FnOnce(&[T]) -> String,
) -> String {
    match format {
        OutputFormat::Json => json::format_json_lines(items),
        OutputFormat::Pretty => pretty(items),
    }
}
