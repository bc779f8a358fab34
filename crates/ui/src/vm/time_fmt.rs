use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// `m:ss`, with minutes growing past 59.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    format!("Time: {}", format_clock(seconds))
}
