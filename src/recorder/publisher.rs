//! Observer registry and snapshot fan-out.
//!
//! Snapshots are queued under the recorder lock in commit order and handed
//! out by one deliverer at a time, so every observer sees them in the order
//! the history changed, even when several threads commit at once.

use crate::models::Entry;
use log::warn;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Immutable view of the history, newest first.
pub type Snapshot = Arc<[Entry]>;

/// Callback receiving a fresh snapshot after every history change.
pub type Observer = Arc<dyn Fn(Snapshot) + Send + Sync>;

struct Delivery {
    observers: Vec<(u64, Observer)>,
    snapshot: Snapshot,
}

/// Registered observers in registration order, plus the queue of snapshots
/// not yet delivered.
#[derive(Default)]
pub(crate) struct Publisher {
    next_id: u64,
    observers: Vec<(u64, Observer)>,
    queue: VecDeque<Delivery>,
    delivering: bool,
}

impl Publisher {
    pub fn register(&mut self, observer: Observer) -> u64 {
        self.next_id += 1;
        self.observers.push((self.next_id, observer));
        self.next_id
    }

    /// Removes an observer. Unknown ids are ignored.
    ///
    /// Snapshots already queued are not delivered to it.
    pub fn unregister(&mut self, id: u64) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    pub fn is_registered(&self, id: u64) -> bool {
        self.observers.iter().any(|(observer_id, _)| *observer_id == id)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Queues `snapshot` for every registered observer.
    ///
    /// # Returns
    ///
    /// `true` when the caller became the deliverer and must drain the queue
    /// with [`next_delivery`](Self::next_delivery) once the lock is released.
    pub fn publish(&mut self, snapshot: Snapshot) -> bool {
        let observers = self.observers.clone();
        self.enqueue(observers, snapshot)
    }

    /// Queues `snapshot` for the single observer `id`.
    pub fn publish_to(&mut self, id: u64, snapshot: Snapshot) -> bool {
        let observers = self
            .observers
            .iter()
            .filter(|(observer_id, _)| *observer_id == id)
            .cloned()
            .collect();
        self.enqueue(observers, snapshot)
    }

    fn enqueue(&mut self, observers: Vec<(u64, Observer)>, snapshot: Snapshot) -> bool {
        if observers.is_empty() {
            return false;
        }
        self.queue.push_back(Delivery {
            observers,
            snapshot,
        });
        if self.delivering {
            false
        } else {
            self.delivering = true;
            true
        }
    }

    /// Takes the oldest queued snapshot and the observers still registered
    /// to receive it.
    ///
    /// Returns `None` and gives up the deliverer role once the queue is empty.
    pub fn next_delivery(&mut self) -> Option<(Vec<Observer>, Snapshot)> {
        while let Some(delivery) = self.queue.pop_front() {
            let observers: Vec<Observer> = delivery
                .observers
                .into_iter()
                .filter(|(id, _)| self.is_registered(*id))
                .map(|(_, observer)| observer)
                .collect();
            if !observers.is_empty() {
                return Some((observers, delivery.snapshot));
            }
        }
        self.delivering = false;
        None
    }
}

/// Delivers `snapshot` to each observer in order.
///
/// A panicking observer is logged and skipped; the remaining observers still
/// receive the snapshot.
pub(crate) fn deliver(observers: &[Observer], snapshot: &Snapshot) {
    for (index, observer) in observers.iter().enumerate() {
        let snapshot = Arc::clone(snapshot);
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| observer(snapshot))) {
            warn!(
                "Network log observer #{} panicked: {}",
                index,
                panic_message(panic.as_ref())
            );
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
