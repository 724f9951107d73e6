//! InMemoryStore - volatile store for tests and embedding.

use std::sync::{Arc, RwLock};

use crate::error::{RecordError, Result};
use crate::value::Fields;

use super::{RecordStore, SnapshotMap};

/// Store whose "durable" content lives in shared memory.
///
/// Clones share the saved content, so a clone taken before handing the store
/// to a manager can [`reopen`](InMemoryStore::reopen) it later and observe
/// exactly what was saved.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    working: SnapshotMap,
    saved: Arc<RwLock<SnapshotMap>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose saved and working content start as `data`.
    pub fn with_data(data: SnapshotMap) -> Self {
        InMemoryStore {
            working: data.clone(),
            saved: Arc::new(RwLock::new(data)),
        }
    }

    /// A fresh working copy loaded from the saved content.
    pub fn reopen(&self) -> Result<Self> {
        let saved = self
            .saved
            .read()
            .map_err(|_| RecordError::LockPoisoned("store read"))?;
        Ok(InMemoryStore {
            working: saved.clone(),
            saved: Arc::clone(&self.saved),
        })
    }

    /// A copy of the last saved content.
    pub fn saved(&self) -> Result<SnapshotMap> {
        let saved = self
            .saved
            .read()
            .map_err(|_| RecordError::LockPoisoned("store read"))?;
        Ok(saved.clone())
    }
}

impl RecordStore for InMemoryStore {
    fn get(&self, entity_type: &str, key: &str) -> Option<&Fields> {
        self.working.get(entity_type, key)
    }

    fn put(&mut self, entity_type: &str, key: &str, snapshot: Fields) {
        self.working.put(entity_type, key, snapshot);
    }

    fn remove(&mut self, entity_type: &str, key: &str) -> bool {
        self.working.remove(entity_type, key)
    }

    fn list_entity_types(&self) -> Vec<String> {
        self.working.entity_types()
    }

    fn list_keys(&self, entity_type: &str) -> Vec<String> {
        self.working.keys(entity_type)
    }

    fn save(&mut self) -> Result<()> {
        let mut saved = self
            .saved
            .write()
            .map_err(|_| RecordError::PersistFailed("in-memory store lock poisoned".into()))?;
        *saved = self.working.clone();
        Ok(())
    }
}
