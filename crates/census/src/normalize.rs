//! Coded-value cleanup: `"01 - 2 - Papua"` becomes `"Papua"`.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::Field;

fn coded_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d+\s*-\s*\d+\s*[–-]\s*(.+)$").expect("coded prefix pattern is valid")
    })
}

/// Strip a `<digits> - <digits> - ` prefix. Text without the prefix is returned as-is.
pub fn normalize(value: &str) -> &str {
    match coded_prefix().captures(value).and_then(|c| c.get(1)) {
        Some(description) => description.as_str().trim(),
        None => value,
    }
}

/// [`normalize`] over an optional field. Absent stays absent.
pub fn normalize_field(value: Field) -> Field {
    value.map(|v| normalize(&v).to_string())
}
