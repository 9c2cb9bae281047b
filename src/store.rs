//! Ordered per-Object instance storage
//!
//! Each Object owns one [`InstanceStore`] holding its Instances in strictly
//! ascending IID order. Lookups and inserts are linear scans; per-Object
//! instance counts are small, so O(n) is fine. Snapshots are deep copies
//! with no aliasing into live data, so a restore fully reverts content.

use crate::error::{DmError, Result};
use crate::path::Iid;

/// Ordered container of Instances keyed by IID
#[derive(Debug, Clone, Default)]
pub struct InstanceStore<T> {
    entries: Vec<(Iid, T)>,
}

impl<T> InstanceStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Iterate IIDs, always in strictly ascending order
    pub fn list(&self) -> impl Iterator<Item = Iid> + '_ {
        self.entries.iter().map(|(iid, _)| *iid)
    }

    /// Iterate (IID, instance) pairs in ascending IID order
    pub fn iter(&self) -> impl Iterator<Item = (Iid, &T)> {
        self.entries.iter().map(|(iid, inst)| (*iid, inst))
    }

    /// Number of instances
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the store holds no instances
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an instance by IID
    pub fn find(&self, iid: Iid) -> Option<&T> {
        for (entry_iid, instance) in &self.entries {
            if *entry_iid == iid {
                return Some(instance);
            } else if *entry_iid > iid {
                break;
            }
        }
        None
    }

    /// Look up an instance by IID, mutably
    pub fn find_mut(&mut self, iid: Iid) -> Option<&mut T> {
        for (entry_iid, instance) in &mut self.entries {
            if *entry_iid == iid {
                return Some(instance);
            } else if *entry_iid > iid {
                break;
            }
        }
        None
    }

    /// Insert a new instance, keeping ascending IID order. Rejects a
    /// duplicate IID with `Internal` and leaves the store unchanged.
    pub fn insert(&mut self, iid: Iid, instance: T) -> Result<()> {
        let mut at = self.entries.len();
        for (i, (entry_iid, _)) in self.entries.iter().enumerate() {
            if *entry_iid == iid {
                return Err(DmError::Internal(format!("duplicate IID {}", iid)));
            } else if *entry_iid > iid {
                at = i;
                break;
            }
        }
        self.entries.insert(at, (iid, instance));
        Ok(())
    }

    /// Remove an instance by IID; `NotFound` if absent
    pub fn remove(&mut self, iid: Iid) -> Result<T> {
        for (i, (entry_iid, _)) in self.entries.iter().enumerate() {
            if *entry_iid == iid {
                return Ok(self.entries.remove(i).1);
            } else if *entry_iid > iid {
                break;
            }
        }
        Err(DmError::NotFound(format!("IID {}", iid)))
    }
}

impl<T: Default> InstanceStore<T> {
    /// Clear an Instance back to its default state without changing its IID
    /// or position; `NotFound` if absent
    pub fn reset(&mut self, iid: Iid) -> Result<()> {
        match self.find_mut(iid) {
            Some(instance) => {
                *instance = T::default();
                Ok(())
            }
            None => Err(DmError::NotFound(format!("IID {}", iid))),
        }
    }
}

impl<T: Clone> InstanceStore<T> {
    /// Take a deep, independent copy of the whole store for transaction
    /// rollback
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Replace the live state with a previously taken snapshot
    pub fn restore(&mut self, snapshot: Self) {
        *self = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_ascending_order() {
        let mut store = InstanceStore::new();
        store.insert(5, "e").unwrap();
        store.insert(1, "a").unwrap();
        store.insert(3, "c").unwrap();

        let iids: Vec<_> = store.list().collect();
        assert_eq!(iids, vec![1, 3, 5]);
    }

    #[test]
    fn test_insert_duplicate_rejected() {
        let mut store = InstanceStore::new();
        store.insert(2, "b").unwrap();
        assert!(store.insert(2, "bb").is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(store.find(2), Some(&"b"));
    }

    #[test]
    fn test_remove_absent_is_not_found() {
        let mut store: InstanceStore<&str> = InstanceStore::new();
        store.insert(1, "a").unwrap();
        assert!(matches!(store.remove(9), Err(DmError::NotFound(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut store = InstanceStore::new();
        store.insert(0, String::from("populated")).unwrap();

        store.reset(0).unwrap();
        let once = store.find(0).cloned();
        store.reset(0).unwrap();
        let twice = store.find(0).cloned();

        assert_eq!(once, Some(String::new()));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_snapshot_restore_is_deep() {
        let mut store = InstanceStore::new();
        store.insert(0, String::from("before")).unwrap();

        let snapshot = store.snapshot();
        *store.find_mut(0).unwrap() = String::from("after");
        store.insert(7, String::from("new")).unwrap();

        store.restore(snapshot);
        assert_eq!(store.find(0), Some(&String::from("before")));
        assert!(store.find(7).is_none());
    }
}
