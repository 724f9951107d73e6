use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Fields;

/// Nested entity type -> primary key -> snapshot mapping shared by the store
/// implementations. Empty entity types are pruned on removal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotMap {
    entries: BTreeMap<String, BTreeMap<String, Fields>>,
}

impl SnapshotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity_type: &str, key: &str) -> Option<&Fields> {
        self.entries.get(entity_type)?.get(key)
    }

    pub fn put(&mut self, entity_type: &str, key: &str, snapshot: Fields) {
        self.entries
            .entry(entity_type.to_string())
            .or_default()
            .insert(key.to_string(), snapshot);
    }

    pub fn remove(&mut self, entity_type: &str, key: &str) -> bool {
        let Some(keys) = self.entries.get_mut(entity_type) else {
            return false;
        };
        let removed = keys.remove(key).is_some();
        if keys.is_empty() {
            self.entries.remove(entity_type);
        }
        removed
    }

    pub fn entity_types(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn keys(&self, entity_type: &str) -> Vec<String> {
        self.entries
            .get(entity_type)
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Total number of stored snapshots across all entity types.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
