//! Aggregate statistics over the full history.

use crate::models::Entry;
use serde::{Deserialize, Serialize};

/// Aggregate view over every entry in history, regardless of any filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub total_requests: usize,

    /// Entries with a non-zero status.
    pub completed_requests: usize,

    /// Percentage of completed entries with a 2xx status, formatted with
    /// exactly one decimal place (`"0.0"` when nothing has completed).
    pub success_rate: String,

    /// Mean duration in milliseconds over completed entries, rounded.
    pub average_response_time: u64,

    /// Entries with status >= 400.
    pub failed_requests: usize,

    /// `total_requests - completed_requests`.
    pub pending_requests: usize,
}

/// Computes statistics in a single pass. Returns `None` for an empty history.
pub fn compute_stats<'a, I>(entries: I) -> Option<NetworkStats>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut total = 0usize;
    let mut completed = 0usize;
    let mut successful = 0usize;
    let mut failed = 0usize;
    let mut total_duration = 0u64;

    for entry in entries {
        total += 1;
        let status = entry.status_code();
        if status != 0 {
            completed += 1;
            total_duration += entry.duration_ms.unwrap_or(0);
        }
        if (200..300).contains(&status) {
            successful += 1;
        }
        if status >= 400 {
            failed += 1;
        }
    }

    if total == 0 {
        return None;
    }

    let (success_rate, average_response_time) = if completed > 0 {
        (
            (successful as f64 / completed as f64) * 100.0,
            (total_duration as f64 / completed as f64).round() as u64,
        )
    } else {
        (0.0, 0)
    };

    Some(NetworkStats {
        total_requests: total,
        completed_requests: completed,
        success_rate: format!("{:.1}", success_rate),
        average_response_time,
        failed_requests: failed,
        pending_requests: total - completed,
    })
}
