//! Label strings and their begin marker.

use super::BEGIN_PREFIX;

/// Whether the label opens a new span.
pub fn is_begin(label: &str) -> bool {
    label.starts_with(BEGIN_PREFIX)
}

/// Label without its begin marker.
pub fn base_label(label: &str) -> &str {
    label.strip_prefix(BEGIN_PREFIX).unwrap_or(label)
}

/// Begin form of `label`, e.g. `I-<table>`.
pub fn to_begin(label: &str) -> String {
    format!("{}{}", BEGIN_PREFIX, base_label(label))
}

/// Continuation form of `label`, e.g. `<table>`.
pub fn to_continuation(label: &str) -> String {
    base_label(label).to_string()
}
