//! Display helpers for terminal output.

use chrono::{DateTime, NaiveDateTime};

/// `1536` -> `1.5 KB`
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exp = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);

    // Two decimals at most, trailing zeros dropped
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exp])
}

/// `2026-01-05T14:30:00Z` -> `Jan 5, 2026, 02:30 PM`. Unparseable input is returned as is.
pub fn format_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %-d, %Y, %I:%M %p").to_string();
    }

    // Backend timestamps without an offset
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%b %-d, %Y, %I:%M %p").to_string();
        }
    }

    raw.to_string()
}

/// `Option<String>` timestamp for tables
pub fn format_optional_date(raw: Option<&str>) -> String {
    raw.map(format_date).unwrap_or_else(|| "-".to_string())
}
