//! Request history and the query engine over it.
//!
//! This module provides the bounded in-memory history of recorded entries and
//! the pure functions that derive views from it.
//!
//! # Features
//!
//! - Most-recent-first ordering with oldest-first eviction at capacity
//! - In-place replacement for replayed entries
//! - URL substring and status bucket filtering
//! - Aggregate statistics computed in one pass
//!
//! # Example
//!
//! ```
//! use netlog::history::{compute_stats, filter_entries, EntryFilter, HistoryStore, StatusBucket};
//!
//! let store = HistoryStore::new(100);
//! let entries = store.list();
//! let errors = filter_entries(&entries, &EntryFilter::new().status(StatusBucket::Error));
//! assert!(errors.is_empty());
//! assert!(compute_stats(&entries).is_none());
//! ```

pub mod search;
pub mod stats;
pub mod store;
pub mod ui;

pub use search::{filter_entries, EntryFilter, StatusBucket};
pub use stats::{compute_stats, NetworkStats};
pub use store::{HistoryStore, DEFAULT_MAX_ENTRIES};
pub use ui::{format_entry, format_entry_list, format_stats, status_label};
