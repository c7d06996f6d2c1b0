//! Bounded, most-recent-first storage for recorded entries.
//!
//! The store is a plain ring over a `VecDeque`: the newest entry sits at the
//! front and appends beyond capacity drop entries from the back. Nothing is
//! persisted; entries older than the capacity window are lost.

use crate::models::Entry;
use log::debug;
use std::collections::VecDeque;

/// Default maximum number of entries kept in history.
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// In-memory history of recorded entries, newest first.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    capacity: usize,
    entries: VecDeque<Entry>,
}

impl HistoryStore {
    /// Creates an empty store. A zero capacity is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_MAX_ENTRIES)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts at the front, evicting from the back while over capacity.
    ///
    /// # Returns
    ///
    /// The evicted entries, oldest last.
    pub fn append(&mut self, entry: Entry) -> Vec<Entry> {
        self.entries.push_front(entry);

        let mut evicted = Vec::new();
        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.entries.pop_back() {
                debug!("Evicting history entry {} ({})", oldest.id, oldest.url);
                evicted.push(oldest);
            }
        }
        evicted
    }

    /// Replaces the entry with the given id in place, keeping its position.
    ///
    /// # Returns
    ///
    /// `true` if an entry with that id was found.
    pub fn replace(&mut self, id: &str, entry: Entry) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Returns a copy of the entries in current order.
    pub fn list(&self) -> Vec<Entry> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;
    use chrono::Utc;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn entry(id: &str) -> Entry {
        Entry::pending(
            id.to_string(),
            format!("https://api.example.com/{}", id),
            "GET".to_string(),
            HashMap::new(),
            None,
            Utc::now(),
        )
    }

    fn ids(store: &HistoryStore) -> Vec<String> {
        store.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_append_is_newest_first() {
        let mut store = HistoryStore::new(10);
        store.append(entry("a"));
        store.append(entry("b"));
        store.append(entry("c"));
        assert_eq!(ids(&store), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_append_evicts_oldest() {
        let mut store = HistoryStore::new(2);
        store.append(entry("a"));
        store.append(entry("b"));
        let evicted = store.append(entry("c"));

        assert_eq!(store.len(), 2);
        assert_eq!(ids(&store), vec!["c", "b"]);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, "a");
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut store = HistoryStore::new(0);
        store.append(entry("a"));
        store.append(entry("b"));
        assert_eq!(store.capacity(), 1);
        assert_eq!(ids(&store), vec!["b"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut store = HistoryStore::new(10);
        store.append(entry("a"));
        store.append(entry("b"));
        store.append(entry("c"));

        let settled = entry("b").settle(Outcome::response(200, None), Utc::now(), 4);
        assert!(store.replace("b", settled));

        assert_eq!(ids(&store), vec!["c", "b", "a"]);
        assert_eq!(store.get("b").unwrap().status, Some(200));
    }

    #[test]
    fn test_replace_missing_id() {
        let mut store = HistoryStore::new(10);
        store.append(entry("a"));
        assert!(!store.replace("zzz", entry("zzz")));
        assert_eq!(ids(&store), vec!["a"]);
    }

    #[test]
    fn test_list_is_a_copy() {
        let mut store = HistoryStore::new(10);
        store.append(entry("a"));

        let mut listed = store.list();
        listed.clear();
        listed.push(entry("intruder"));

        assert_eq!(ids(&store), vec!["a"]);
    }

    #[test]
    fn test_clear() {
        let mut store = HistoryStore::new(10);
        store.append(entry("a"));
        store.clear();
        assert!(store.is_empty());
    }

    proptest! {
        #[test]
        fn prop_length_never_exceeds_capacity(capacity in 1usize..20, appends in 0usize..60) {
            let mut store = HistoryStore::new(capacity);
            for i in 0..appends {
                store.append(entry(&i.to_string()));
                prop_assert!(store.len() <= capacity);
            }
            prop_assert_eq!(store.len(), appends.min(capacity));
        }

        #[test]
        fn prop_overflow_evicts_exactly_the_oldest(capacity in 1usize..20) {
            let mut store = HistoryStore::new(capacity);
            for i in 0..capacity {
                store.append(entry(&i.to_string()));
            }
            let evicted = store.append(entry("overflow"));
            prop_assert_eq!(evicted.len(), 1);
            prop_assert_eq!(evicted[0].id.clone(), "0".to_string());
            prop_assert_eq!(store.iter().next().map(|e| e.id.clone()), Some("overflow".to_string()));
        }
    }
}
