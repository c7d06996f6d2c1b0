//! Re-issuing recorded calls.
//!
//! A replay is recorded as its own entry. The pending placeholder is
//! published before the call is sent and is then replaced in place by the
//! settled value, so it keeps its position in history.

use crate::interceptor::fetch::outcome_of;
use crate::models::{Entry, Outcome};
use crate::recorder::{generate_id, NetworkRecorder};
use crate::transport::FetchRequest;
use chrono::Utc;
use log::{debug, warn};
use std::time::Instant;

/// Prefix of every replay identifier.
pub const REPLAY_ID_PREFIX: &str = "repeat-";

/// Builds the identifier for a replay of `original_id`.
pub fn replay_id(original_id: &str) -> String {
    format!("{}{}-{}", REPLAY_ID_PREFIX, original_id, generate_id())
}

/// Whether `id` was produced by [`replay_id`].
pub fn is_replay_id(id: &str) -> bool {
    id.starts_with(REPLAY_ID_PREFIX)
}

/// Settles a replay placeholder as cancelled if the replay is abandoned.
struct ReplayGuard<'a> {
    recorder: &'a NetworkRecorder,
    placeholder: Entry,
    started: Instant,
    settled: bool,
}

impl ReplayGuard<'_> {
    fn settle(&mut self, outcome: Outcome) -> Entry {
        self.settled = true;
        let duration_ms = self.started.elapsed().as_millis() as u64;
        let settled = self.placeholder.settle(outcome, Utc::now(), duration_ms);
        self.recorder.finish_replay(settled.clone());
        settled
    }
}

impl Drop for ReplayGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let cancelled = self.settle(Outcome::cancelled());
            debug!("Replay {} dropped before it settled", cancelled.id);
        }
    }
}

/// Replays `original` through the recorder's own transport.
///
/// Never fails: transport errors end up in the returned entry as status 0
/// and an error message. The call bypasses interception, so exactly one
/// new entry is recorded. Dropping the future before it completes settles
/// that entry as cancelled.
pub async fn repeat(recorder: &NetworkRecorder, original: &Entry) -> Entry {
    let (placeholder, started) = recorder.begin_replay(original);

    let request = FetchRequest {
        url: placeholder.url.clone(),
        method: placeholder.method.clone(),
        headers: placeholder.headers.clone(),
        body: placeholder.body.clone(),
    };
    let mut guard = ReplayGuard {
        recorder,
        placeholder,
        started,
        settled: false,
    };

    let result = recorder.transport().fetch(request).await;
    if let Err(e) = &result {
        warn!("Replay of {} failed: {}", original.id, e);
    }
    let outcome = outcome_of(&result, recorder.config().enable_body_logging);

    let settled = guard.settle(outcome);
    debug!(
        "Replay {} settled with status {}",
        settled.id,
        settled.status_code()
    );
    settled
}
