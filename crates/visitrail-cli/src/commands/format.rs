//! Text helpers for terminal output.

use chrono::{DateTime, Local, Utc};
use visitrail_core::visit::{DomainRecord, bare_domain_url};

/// Width of the longest bar in the top-sites chart.
pub const BAR_WIDTH: usize = 30;

/// Describes how long ago `timestamp` was, relative to `now`.
///
/// Anything older than a week is shown as a local date instead.
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{} ago", plural(minutes, "minute"))
    } else if hours < 24 {
        format!("{} ago", plural(hours, "hour"))
    } else if days < 7 {
        format!("{} ago", plural(days, "day"))
    } else {
        timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Shortens `text` to at most `max` characters, ending in `...` when cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Label for a history row: the display URL without its scheme, or just the
/// domain when nothing better than the bare link is known.
pub fn display_text(record: &DomainRecord) -> String {
    let url = record.display_url();
    if url == bare_domain_url(&record.domain) {
        return record.domain.clone();
    }
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(&url)
        .to_string()
}

/// A bar proportional to `value / max`, never empty for a non-zero value.
pub fn bar(value: u64, max: u64, width: usize) -> String {
    if value == 0 || max == 0 {
        return String::new();
    }
    let filled = ((value as u128 * width as u128) / max as u128) as usize;
    "█".repeat(filled.clamp(1, width))
}
