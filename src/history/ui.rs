//! Plain-text formatting for entries and statistics.
//!
//! Used for log lines and by the probe binary; rich rendering belongs to
//! whatever presentation layer subscribes to the recorder.

use super::stats::NetworkStats;
use crate::models::{Entry, StatusClass};
use chrono::{DateTime, Local, Utc};

/// Formats a single entry on one line.
///
/// Format: `METHOD URL - STATUS (duration)`, with `[repeat]` appended for
/// replayed entries. Example: `GET https://api.example.com/users - 200 (87ms)`.
pub fn format_entry(entry: &Entry) -> String {
    let status = match (entry.is_pending(), entry.status_code()) {
        (true, _) => "pending".to_string(),
        (false, 0) => match &entry.error {
            Some(error) => format!("failed: {}", error),
            None => "no response".to_string(),
        },
        (false, code) => code.to_string(),
    };

    let duration = entry
        .duration_ms
        .map(|ms| format!("{}ms", ms))
        .unwrap_or_else(|| "…".to_string());

    let mut line = format!("{} {} - {} ({})", entry.method, entry.url, status, duration);
    if entry.is_repeated {
        line.push_str(" [repeat]");
    }
    line
}

/// Formats a list of entries, one line each, prefixed with the local start time.
pub fn format_entry_list(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| format!("{} {}", format_timestamp(&entry.started_at), format_entry(entry)))
        .collect()
}

/// Formats aggregate statistics.
///
/// Example: `Total: 3 | Completed: 2 | Success: 50.0% | Avg: 200ms | Failed: 1 | Pending: 1`
pub fn format_stats(stats: &NetworkStats) -> String {
    format!(
        "Total: {} | Completed: {} | Success: {}% | Avg: {}ms | Failed: {} | Pending: {}",
        stats.total_requests,
        stats.completed_requests,
        stats.success_rate,
        stats.average_response_time,
        stats.failed_requests,
        stats.pending_requests
    )
}

/// Short label for an entry's status class.
pub fn status_label(entry: &Entry) -> &'static str {
    match entry.status_class() {
        StatusClass::Pending if !entry.is_pending() => "failed",
        class => class.as_str(),
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    let local: DateTime<Local> = timestamp.with_timezone(&Local);
    local.format("%H:%M:%S").to_string()
}
