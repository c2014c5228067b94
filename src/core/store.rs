//! Copy-on-write record store
//!
//! A [`RecordStore`] never mutates records in place. Readers take an O(1)
//! handle to the current [`Snapshot`]; writers build a complete new snapshot
//! and install it with a single assignment, so no reader can observe a
//! partially applied write.

use crate::core::error::StoreError;
use crate::core::record::Record;
use std::collections::HashSet;
use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock};

/// Immutable view of a store at one instant
#[derive(Debug)]
pub struct Snapshot<R> {
    records: Arc<[R]>,
    version: u64,
}

impl<R> Clone for Snapshot<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            version: self.version,
        }
    }
}

impl<R: Record> Snapshot<R> {
    /// Number of swaps the store had seen when this snapshot was installed
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Find a record by id
    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Position of a record by id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Copy the records out, for building the next snapshot
    pub fn to_vec(&self) -> Vec<R> {
        self.records.to_vec()
    }
}

impl<R> Deref for Snapshot<R> {
    type Target = [R];

    fn deref(&self) -> &[R] {
        &self.records
    }
}

/// In-memory ordered store of records of one shape
///
/// Cloning yields another handle to the same store. Insertion order is the
/// iteration order.
pub struct RecordStore<R> {
    current: Arc<RwLock<Snapshot<R>>>,
}

impl<R> Clone for RecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<R: Record> RecordStore<R> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(Snapshot {
                records: Arc::from(Vec::new()),
                version: 0,
            })),
        }
    }

    /// Create a store seeded with records
    pub fn with_records(records: Vec<R>) -> Result<Self, StoreError> {
        let store = Self::new();
        store.replace(records)?;
        Ok(store)
    }

    /// Handle to the current snapshot
    pub fn snapshot(&self) -> Snapshot<R> {
        // The critical section is a single assignment, so a poisoned lock
        // still guards a whole snapshot.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically install a new snapshot
    ///
    /// Fails with [`StoreError::DuplicateIdentifier`] if two records share an
    /// id, in which case the store is left unchanged.
    pub fn replace(&self, records: Vec<R>) -> Result<Snapshot<R>, StoreError> {
        check_unique(&records)?;

        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let next = Snapshot {
            records: Arc::from(records),
            version: current.version + 1,
        };
        *current = next.clone();
        drop(current);

        tracing::debug!(
            collection = R::collection(),
            version = next.version,
            len = next.len(),
            "snapshot replaced"
        );
        Ok(next)
    }

    /// Get a record by id from the current snapshot
    pub fn get(&self, id: &str) -> Option<R> {
        self.snapshot().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Version of the current snapshot
    pub fn version(&self) -> u64 {
        self.snapshot().version
    }
}

impl<R: Record> Default for RecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn check_unique<R: Record>(records: &[R]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(StoreError::DuplicateIdentifier {
                collection: R::collection().to_string(),
                id: record.id().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldValue;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        name: String,
    }

    impl Record for Item {
        fn collection() -> &'static str {
            "items"
        }

        fn id(&self) -> &str {
            &self.id
        }

        fn fields() -> &'static [&'static str] {
            &["id", "name"]
        }

        fn searchable_fields() -> &'static [&'static str] {
            &["name"]
        }

        fn field_value(&self, field: &str) -> Option<FieldValue> {
            match field {
                "id" => Some(self.id.as_str().into()),
                "name" => Some(self.name.as_str().into()),
                _ => None,
            }
        }
    }

    fn item(id: &str, name: &str) -> Item {
        Item {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store: RecordStore<Item> = RecordStore::new();
        assert!(store.is_empty());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn test_with_records_keeps_insertion_order() {
        let store = RecordStore::with_records(vec![item("2", "b"), item("1", "a")]).unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].id, "2");
        assert_eq!(snapshot[1].id, "1");
        assert_eq!(snapshot.version(), 1);
    }

    #[test]
    fn test_replace_rejects_duplicates() {
        let store = RecordStore::with_records(vec![item("1", "a")]).unwrap();
        let err = store
            .replace(vec![item("1", "a"), item("1", "b")])
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateIdentifier {
                collection: "items".to_string(),
                id: "1".to_string(),
            }
        );
        // Unchanged
        assert_eq!(store.len(), 1);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_old_snapshot_survives_replace() {
        let store = RecordStore::with_records(vec![item("1", "a")]).unwrap();
        let before = store.snapshot();

        store.replace(vec![item("1", "a"), item("2", "b")]).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
        assert!(store.snapshot().version() > before.version());
    }

    #[test]
    fn test_clone_shares_state() {
        let store = RecordStore::<Item>::new();
        let handle = store.clone();
        store.replace(vec![item("1", "a")]).unwrap();
        assert_eq!(handle.get("1"), Some(item("1", "a")));
        assert!(handle.snapshot().contains("1"));
        assert_eq!(handle.snapshot().position("1"), Some(0));
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let store = RecordStore::<Item>::new();
        let writer = store.clone();

        let handle = std::thread::spawn(move || {
            for n in 1..=50 {
                let records = (0..n).map(|i| item(&i.to_string(), "x")).collect();
                writer.replace(records).unwrap();
            }
        });

        for _ in 0..200 {
            let snapshot = store.snapshot();
            // A snapshot at version v always holds exactly v records
            assert_eq!(snapshot.len() as u64, snapshot.version());
        }
        handle.join().unwrap();
        assert_eq!(store.len(), 50);
    }
}
