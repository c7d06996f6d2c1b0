//! Filtering for recorded entries.
//!
//! Filters combine a case-insensitive URL substring with a set of status
//! buckets. Both parts must pass; within the bucket set, matching any one
//! bucket is enough.

use crate::models::Entry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Status bucket used by the status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBucket {
    /// Status in [200, 300).
    Success,
    /// Status >= 400.
    Error,
    /// Status 0 or absent.
    Pending,
}

impl StatusBucket {
    pub fn matches(&self, entry: &Entry) -> bool {
        let status = entry.status_code();
        match self {
            StatusBucket::Success => (200..300).contains(&status),
            StatusBucket::Error => status >= 400,
            StatusBucket::Pending => status == 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusBucket::Success => "success",
            StatusBucket::Error => "error",
            StatusBucket::Pending => "pending",
        }
    }
}

impl FromStr for StatusBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(StatusBucket::Success),
            "error" => Ok(StatusBucket::Error),
            "pending" => Ok(StatusBucket::Pending),
            other => Err(format!("Unknown status filter: {}", other)),
        }
    }
}

impl std::fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Criteria for [`filter_entries`]. The default filter passes everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFilter {
    /// URL substring, matched case-insensitively. Empty matches all.
    #[serde(default)]
    pub url_query: String,

    /// Requested buckets. Empty means no status filtering.
    #[serde(default)]
    pub status_filter: BTreeSet<StatusBucket>,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, query: impl Into<String>) -> Self {
        self.url_query = query.into();
        self
    }

    pub fn status(mut self, bucket: StatusBucket) -> Self {
        self.status_filter.insert(bucket);
        self
    }

    pub fn statuses<I: IntoIterator<Item = StatusBucket>>(mut self, buckets: I) -> Self {
        self.status_filter.extend(buckets);
        self
    }

    /// Checks a single entry against the filter.
    pub fn matches(&self, entry: &Entry) -> bool {
        self.matches_url(&entry.url, &self.url_query.to_lowercase()) && self.matches_status(entry)
    }

    fn matches_url(&self, url: &str, query_lower: &str) -> bool {
        query_lower.is_empty() || url.to_lowercase().contains(query_lower)
    }

    fn matches_status(&self, entry: &Entry) -> bool {
        self.status_filter.is_empty() || self.status_filter.iter().any(|b| b.matches(entry))
    }
}

/// Returns the entries that pass `filter`, in their original order.
///
/// # Example
///
/// ```
/// use netlog::history::{filter_entries, EntryFilter, StatusBucket};
///
/// let filter = EntryFilter::new().url("/users").status(StatusBucket::Error);
/// let failing_user_calls = filter_entries(&[], &filter);
/// assert!(failing_user_calls.is_empty());
/// ```
pub fn filter_entries(entries: &[Entry], filter: &EntryFilter) -> Vec<Entry> {
    let query_lower = filter.url_query.to_lowercase();

    entries
        .iter()
        .filter(|entry| filter.matches_url(&entry.url, &query_lower) && filter.matches_status(entry))
        .cloned()
        .collect()
}
