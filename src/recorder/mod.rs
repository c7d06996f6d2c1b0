//! The network recorder.
//!
//! A [`NetworkRecorder`] correlates intercepted calls with their outcomes,
//! keeps the bounded history, and notifies observers whenever the history
//! changes. Recorders are cheap to clone; clones share the same state.
//!
//! History, pending table and observer list live behind one mutex. Observers
//! are never invoked while it is held, so an observer may call back into the
//! recorder. Snapshots reach observers in the order the history changed; a
//! change made from inside an observer is delivered after it returns.
//!
//! # Example
//!
//! ```
//! use netlog::{NetworkRecorder, Outcome, RecorderConfig, RequestDescriptor, RuntimeEnvironment};
//!
//! let config = RecorderConfig::default().with_environment(RuntimeEnvironment::Development);
//! let recorder = NetworkRecorder::new(config);
//! let id = recorder
//!     .open(RequestDescriptor::new("https://api.example.com/users").method("get"))
//!     .expect("tracked");
//! recorder.close(&id, Outcome::response(200, Some("ok".into())));
//!
//! let entries = recorder.entries();
//! assert_eq!(entries.len(), 1);
//! assert_eq!(entries[0].method, "GET");
//! ```

pub mod correlator;
pub mod global;
pub mod publisher;

pub use correlator::{generate_id, TrackingPolicy};
pub use global::{default_recorder, init_default_recorder};
pub use publisher::{Observer, Snapshot};

use crate::config::{RecorderConfig, RuntimeEnvironment};
use crate::history::{compute_stats, filter_entries, EntryFilter, HistoryStore, NetworkStats};
use crate::models::{normalize_method, Entry, Outcome, RequestDescriptor};
use crate::transport::{default_transport, Fetch};
use chrono::Utc;
use correlator::PendingTable;
use log::{debug, trace, warn};
use publisher::Publisher;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

/// Shared recorder handle.
#[derive(Clone)]
pub struct NetworkRecorder {
    inner: Arc<Inner>,
}

struct Inner {
    config: RecorderConfig,
    policy: TrackingPolicy,
    transport: Arc<dyn Fetch>,
    state: Mutex<State>,
}

struct State {
    history: HistoryStore,
    pending: PendingTable,
    publisher: Publisher,
}

impl State {
    fn snapshot(&self) -> Snapshot {
        self.history.iter().cloned().collect::<Vec<_>>().into()
    }

    fn is_known(&self, id: &str) -> bool {
        self.pending.contains(id) || self.history.contains(id)
    }

    /// Queues the current history for every observer.
    fn publish(&mut self) -> bool {
        if self.publisher.is_empty() {
            return false;
        }
        let snapshot = self.snapshot();
        self.publisher.publish(snapshot)
    }

    fn fresh_id(&self, make: impl Fn() -> String) -> String {
        let mut id = make();
        while self.is_known(&id) {
            id = make();
        }
        id
    }
}

impl NetworkRecorder {
    /// Creates a recorder using the default transport for replay.
    pub fn new(config: RecorderConfig) -> Self {
        let transport = default_transport(&config.transport);
        Self::with_transport(config, transport)
    }

    /// Creates a recorder that replays through `transport`.
    ///
    /// The transport must not itself be intercepted by this recorder,
    /// otherwise replays are recorded twice.
    pub fn with_transport(config: RecorderConfig, transport: Arc<dyn Fetch>) -> Self {
        if let Err(e) = config.validate() {
            warn!("Network recorder created with invalid configuration: {}", e);
        }

        let environment = config.resolved_environment();
        let policy = TrackingPolicy::new(&config, environment);
        let state = State {
            history: HistoryStore::new(config.max_entries),
            pending: PendingTable::default(),
            publisher: Publisher::default(),
        };

        Self {
            inner: Arc::new(Inner {
                config,
                policy,
                transport,
                state: Mutex::new(state),
            }),
        }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.inner.config
    }

    pub fn environment(&self) -> RuntimeEnvironment {
        self.inner.policy.environment()
    }

    /// The raw transport used for replay.
    pub fn transport(&self) -> Arc<dyn Fetch> {
        Arc::clone(&self.inner.transport)
    }

    /// Whether a call to `url` would be tracked.
    pub fn should_log_request(&self, url: &str) -> bool {
        self.inner.policy.should_track(url)
    }

    /// Opens a call.
    ///
    /// # Returns
    ///
    /// The new entry's identifier, or `None` when the call is not tracked
    /// (no URL, or the tracking policy rejects it).
    pub fn open(&self, descriptor: RequestDescriptor) -> Option<String> {
        let url = match descriptor.url {
            Some(url) if !url.is_empty() => url,
            _ => {
                trace!("Not tracking a call without URL");
                return None;
            }
        };

        if !self.should_log_request(&url) {
            return None;
        }

        let method = normalize_method(descriptor.method.as_deref());
        let headers = descriptor.headers.unwrap_or_default();
        let body = if self.inner.config.enable_body_logging {
            descriptor.body
        } else {
            None
        };

        let mut state = self.lock();
        let id = state.fresh_id(generate_id);
        debug!("Opened {} {} as {}", method, url, id);

        let entry = Entry::pending(id.clone(), url, method, headers, body, Utc::now());
        state.pending.insert(entry, Instant::now());
        Some(id)
    }

    /// Opens a call and returns a guard that settles it.
    ///
    /// If the guard is dropped before [`PendingCall::close`], for example
    /// because the caller's future was cancelled, the call is closed with
    /// [`Outcome::cancelled`] so it never lingers in the pending table.
    pub fn track(&self, descriptor: RequestDescriptor) -> PendingCall {
        PendingCall {
            id: self.open(descriptor),
            recorder: self.clone(),
        }
    }

    /// Settles the pending call `id` with `outcome`.
    ///
    /// Unknown identifiers, including calls already settled or dropped by
    /// [`clear`](Self::clear), are ignored.
    pub fn close(&self, id: &str, mut outcome: Outcome) {
        if !self.inner.config.enable_body_logging {
            outcome.response = None;
        }

        self.commit(|state| {
            let pending = match state.pending.remove(id) {
                Some(pending) => pending,
                None => {
                    trace!("Ignoring outcome for unknown request {}", id);
                    return false;
                }
            };

            let duration_ms = pending.started.elapsed().as_millis() as u64;
            let settled = pending.entry.settle(outcome, Utc::now(), duration_ms);
            debug!(
                "Closed {} with status {} after {}ms",
                settled.id,
                settled.status_code(),
                duration_ms
            );
            state.history.append(settled);
            true
        });
    }

    /// Registers an observer.
    ///
    /// The observer first receives the current history, then a fresh
    /// snapshot after every change until the returned handle unsubscribes.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(Snapshot) + Send + Sync + 'static,
    {
        let (id, drain) = {
            let mut state = self.lock();
            let id = state.publisher.register(Arc::new(observer));
            let snapshot = state.snapshot();
            (id, state.publisher.publish_to(id, snapshot))
        };

        if drain {
            self.drain();
        }

        Subscription {
            recorder: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Copy of the history, newest first.
    pub fn entries(&self) -> Vec<Entry> {
        self.lock().history.list()
    }

    /// Shared immutable view of the history, newest first.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    /// Looks up an entry in history.
    pub fn entry(&self, id: &str) -> Option<Entry> {
        self.lock().history.get(id).cloned()
    }

    /// Number of calls opened but not yet settled.
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().publisher.len()
    }

    /// Drops the history and every pending call.
    ///
    /// Calls still in flight settle into nothing.
    pub fn clear(&self) {
        self.commit(|state| {
            debug!(
                "Clearing {} entries and {} pending requests",
                state.history.len(),
                state.pending.len()
            );
            state.history.clear();
            state.pending.clear();
            true
        });
    }

    /// Aggregate statistics over the full history, `None` when it is empty.
    pub fn stats(&self) -> Option<NetworkStats> {
        compute_stats(self.lock().history.iter())
    }

    /// History entries passing `filter`, newest first.
    pub fn filter(&self, filter: &EntryFilter) -> Vec<Entry> {
        filter_entries(&self.entries(), filter)
    }

    /// Re-issues the call recorded in `entry`.
    ///
    /// See [`crate::replay::repeat`].
    pub async fn repeat(&self, entry: &Entry) -> Entry {
        crate::replay::repeat(self, entry).await
    }

    /// Appends a pending replay entry derived from `original` and publishes it.
    pub(crate) fn begin_replay(&self, original: &Entry) -> (Entry, Instant) {
        let (placeholder, drain) = {
            let mut state = self.lock();
            let id = state.fresh_id(|| crate::replay::replay_id(&original.id));
            let mut placeholder = Entry::pending(
                id,
                original.url.clone(),
                original.method.clone(),
                original.headers.clone(),
                original.body.clone(),
                Utc::now(),
            );
            placeholder.is_repeated = true;
            debug!("Replaying {} as {}", original.id, placeholder.id);

            state.history.append(placeholder.clone());
            let drain = state.publish();
            (placeholder, drain)
        };

        if drain {
            self.drain();
        }
        (placeholder, Instant::now())
    }

    /// Replaces a replay placeholder with its settled value and publishes.
    pub(crate) fn finish_replay(&self, settled: Entry) {
        self.commit(|state| {
            let id = settled.id.clone();
            if state.history.replace(&id, settled) {
                true
            } else {
                debug!("Replay {} settled after leaving history", id);
                false
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `mutate` under the lock and, if it reports a change, queues the
    /// resulting snapshot and delivers it after the lock is released.
    fn commit<F>(&self, mutate: F)
    where
        F: FnOnce(&mut State) -> bool,
    {
        let drain = {
            let mut state = self.lock();
            if !mutate(&mut state) {
                return;
            }
            state.publish()
        };

        if drain {
            self.drain();
        }
    }

    /// Delivers queued snapshots until the queue is empty.
    ///
    /// Only the thread that became the deliverer calls this; commits made
    /// meanwhile by other threads, or by observers, are picked up here.
    fn drain(&self) {
        loop {
            let next = self.lock().publisher.next_delivery();
            match next {
                Some((observers, snapshot)) => publisher::deliver(&observers, &snapshot),
                None => break,
            }
        }
    }
}

impl std::fmt::Debug for NetworkRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("NetworkRecorder")
            .field("environment", &self.environment())
            .field("entries", &state.history.len())
            .field("pending", &state.pending.len())
            .field("subscribers", &state.publisher.len())
            .finish()
    }
}

/// An open call that is closed exactly once.
///
/// Returned by [`NetworkRecorder::track`]. Dropping it unsettled records the
/// call as cancelled.
#[must_use = "dropping a PendingCall records the call as cancelled"]
#[derive(Debug)]
pub struct PendingCall {
    recorder: NetworkRecorder,
    id: Option<String>,
}

impl PendingCall {
    /// Identifier of the entry, `None` when the call is not tracked.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_tracked(&self) -> bool {
        self.id.is_some()
    }

    /// Settles the call with `outcome`. A no-op for untracked calls.
    pub fn close(mut self, outcome: Outcome) {
        if let Some(id) = self.id.take() {
            self.recorder.close(&id, outcome);
        }
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            debug!("Request {} dropped before it settled", id);
            self.recorder.close(&id, Outcome::cancelled());
        }
    }
}

/// Handle returned by [`NetworkRecorder::subscribe`].
///
/// Dropping the handle keeps the observer registered; call
/// [`unsubscribe`](Self::unsubscribe) to stop notifications.
#[derive(Debug, Clone)]
pub struct Subscription {
    recorder: Weak<Inner>,
    id: u64,
}

impl Subscription {
    /// Stops notifications. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.recorder.upgrade() {
            let mut state = inner.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.publisher.unregister(self.id) {
                trace!("Observer {} unsubscribed", self.id);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.recorder
            .upgrade()
            .map(|inner| {
                inner
                    .state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .publisher
                    .is_registered(self.id)
            })
            .unwrap_or(false)
    }
}
