//! Process-wide default recorder.
//!
//! Libraries that cannot have a recorder passed to them share this instance.
//! It is created on first use from the global configuration (see
//! [`crate::config::get_config`]), or from an explicit configuration passed
//! to [`init_default_recorder`] before anything else touches it.

use super::{NetworkRecorder, Snapshot, Subscription};
use crate::config::{self, RecorderConfig};
use crate::history::{EntryFilter, NetworkStats};
use crate::models::Entry;
use once_cell::sync::OnceCell;

static DEFAULT_RECORDER: OnceCell<NetworkRecorder> = OnceCell::new();

/// Returns the process-wide recorder, creating it on first access.
pub fn default_recorder() -> &'static NetworkRecorder {
    DEFAULT_RECORDER.get_or_init(|| NetworkRecorder::new(config::get_config()))
}

/// Creates the process-wide recorder from `config`.
///
/// # Returns
///
/// `Err` if the default recorder already exists or `config` is invalid.
pub fn init_default_recorder(config: RecorderConfig) -> Result<&'static NetworkRecorder, String> {
    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    let mut created = false;
    let recorder = DEFAULT_RECORDER.get_or_init(|| {
        created = true;
        NetworkRecorder::new(config)
    });

    if created {
        Ok(recorder)
    } else {
        Err("Default network recorder is already initialized".to_string())
    }
}

/// Subscribes to the default recorder.
pub fn subscribe<F>(observer: F) -> Subscription
where
    F: Fn(Snapshot) + Send + Sync + 'static,
{
    default_recorder().subscribe(observer)
}

/// History of the default recorder.
pub fn entries() -> Vec<Entry> {
    default_recorder().entries()
}

pub fn clear() {
    default_recorder().clear()
}

pub fn stats() -> Option<NetworkStats> {
    default_recorder().stats()
}

pub fn filter(filter: &EntryFilter) -> Vec<Entry> {
    default_recorder().filter(filter)
}

/// Replays `entry` through the default recorder.
pub async fn repeat(entry: &Entry) -> Entry {
    default_recorder().repeat(entry).await
}
