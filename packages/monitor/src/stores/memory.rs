//! In-memory snapshot store for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::traits::store::SnapshotStore;
use crate::types::Snapshot;

/// In-memory snapshot storage, keyed by keyword.
///
/// Useful for tests and development. Not suitable for production as
/// data is lost on restart.
#[derive(Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<String, Snapshot>>,
}

impl MemorySnapshotStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keywords with stored state.
    pub fn keyword_count(&self) -> usize {
        self.snapshots.read().unwrap().len()
    }

    /// Drop all stored state.
    pub fn clear(&self) {
        self.snapshots.write().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, keyword: &str) -> StoreResult<Snapshot> {
        Ok(self
            .snapshots
            .read()
            .unwrap()
            .get(keyword)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, keyword: &str, snapshot: &Snapshot) -> StoreResult<()> {
        self.snapshots
            .write()
            .unwrap()
            .insert(keyword.to_string(), snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Listing;

    #[tokio::test]
    async fn absent_keyword_loads_empty() {
        let store = MemorySnapshotStore::new();
        let snapshot = store.load("missing").await.unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn save_replaces_previous_state() {
        let store = MemorySnapshotStore::new();

        let first = Snapshot::from_listings([Listing::new("m1")]);
        store.save("kw", &first).await.unwrap();

        let second = Snapshot::from_listings([Listing::new("m2")]);
        store.save("kw", &second).await.unwrap();

        let loaded = store.load("kw").await.unwrap();
        assert!(!loaded.contains("m1"));
        assert!(loaded.contains("m2"));
    }
}
