use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::likes::LikeKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CounterError {
    #[error("counter not found: {0}")]
    NotFound(String),
    #[error("counter already exists: {0}")]
    AlreadyExists(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(i64),
    Updated(i64),
}

impl UpsertOutcome {
    pub fn value(&self) -> i64 {
        match self {
            UpsertOutcome::Created(value) | UpsertOutcome::Updated(value) => *value,
        }
    }

    pub fn created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

/// In-memory like counters keyed by entity id. Values are never clamped:
/// a decrement past zero goes negative so drift stays observable.
#[derive(Debug, Default)]
pub struct CounterStore {
    entries: Mutex<HashMap<String, i64>>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, i64>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, id: &str) -> Option<i64> {
        self.entries().get(id).copied()
    }

    pub fn create(&self, id: &str, initial: i64) -> Result<(), CounterError> {
        let mut entries = self.entries();
        if entries.contains_key(id) {
            return Err(CounterError::AlreadyExists(id.to_string()));
        }
        entries.insert(id.to_string(), initial);
        Ok(())
    }

    pub fn increment_by(&self, id: &str, delta: i64) -> Result<i64, CounterError> {
        let mut entries = self.entries();
        match entries.get_mut(id) {
            Some(value) => {
                *value += delta;
                Ok(*value)
            }
            None => Err(CounterError::NotFound(id.to_string())),
        }
    }

    /// Increment an existing counter or seed a missing one with `delta`,
    /// under a single lock acquisition so concurrent first touches of a
    /// cold key cannot lose an update.
    pub fn upsert(&self, id: &str, delta: i64) -> UpsertOutcome {
        let mut entries = self.entries();
        match entries.get_mut(id) {
            Some(value) => {
                *value += delta;
                UpsertOutcome::Updated(*value)
            }
            None => {
                entries.insert(id.to_string(), delta);
                UpsertOutcome::Created(delta)
            }
        }
    }

    pub fn snapshot(&self) -> HashMap<String, i64> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// One counter store per likeable kind, passed around explicitly instead
/// of living in process globals.
#[derive(Debug, Default)]
pub struct LikeCounters {
    events: CounterStore,
    rooms: CounterStore,
}

impl LikeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, kind: LikeKind) -> &CounterStore {
        match kind {
            LikeKind::Event => &self.events,
            LikeKind::Room => &self.rooms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_existing_key() {
        let store = CounterStore::new();
        store.create("ev-1", 3).expect("first create");
        assert_eq!(
            store.create("ev-1", 9),
            Err(CounterError::AlreadyExists("ev-1".to_string()))
        );
        assert_eq!(store.get("ev-1"), Some(3));
    }

    #[test]
    fn increment_requires_existing_key() {
        let store = CounterStore::new();
        assert_eq!(
            store.increment_by("missing", 1),
            Err(CounterError::NotFound("missing".to_string()))
        );
        store.create("ev-1", 0).expect("create");
        assert_eq!(store.increment_by("ev-1", 1), Ok(1));
    }

    #[test]
    fn upsert_reports_created_versus_updated() {
        let store = CounterStore::new();
        assert_eq!(store.upsert("ev-1", 1), UpsertOutcome::Created(1));
        assert_eq!(store.upsert("ev-1", 1), UpsertOutcome::Updated(2));
    }

    #[test]
    fn decrement_is_not_clamped_at_zero() {
        let store = CounterStore::new();
        store.create("ev-1", 0).expect("create");
        assert_eq!(store.increment_by("ev-1", -1), Ok(-1));
    }

    #[test]
    fn snapshot_is_detached_from_live_entries() {
        let store = CounterStore::new();
        store.create("ev-1", 2).expect("create");
        let snapshot = store.snapshot();
        store.upsert("ev-1", 1);
        assert_eq!(snapshot.get("ev-1"), Some(&2));
        assert_eq!(store.get("ev-1"), Some(3));
    }

    #[test]
    fn like_counters_keep_kinds_separate() {
        let counters = LikeCounters::new();
        counters.store(LikeKind::Event).upsert("shared-id", 1);
        assert_eq!(counters.store(LikeKind::Room).get("shared-id"), None);
    }
}
