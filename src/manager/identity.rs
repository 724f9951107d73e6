use std::collections::HashMap;

use crate::record::RecordId;

/// Durable identity of a live record: entity type plus primary key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrimaryKey {
    pub entity_type: &'static str,
    pub key: String,
}

impl PrimaryKey {
    pub fn new(entity_type: &'static str, key: impl Into<String>) -> Self {
        PrimaryKey {
            entity_type,
            key: key.into(),
        }
    }
}

/// Bidirectional runtime id <-> primary key map. Both directions change together.
#[derive(Debug, Default)]
pub(crate) struct IdentityMap {
    id_to_primary: HashMap<RecordId, PrimaryKey>,
    primary_to_id: HashMap<PrimaryKey, RecordId>,
}

impl IdentityMap {
    /// Registers `id` under `primary`. Returns the current owner if the key is taken.
    pub fn insert(&mut self, id: RecordId, primary: PrimaryKey) -> Result<(), RecordId> {
        if let Some(owner) = self.primary_to_id.get(&primary) {
            return Err(*owner);
        }
        self.primary_to_id.insert(primary.clone(), id);
        self.id_to_primary.insert(id, primary);
        Ok(())
    }

    /// Moves `id` to `primary`, returning its previous key.
    pub fn rekey(&mut self, id: RecordId, primary: PrimaryKey) -> Result<Option<PrimaryKey>, RecordId> {
        match self.primary_to_id.get(&primary) {
            Some(owner) if *owner == id => return Ok(Some(primary)),
            Some(owner) => return Err(*owner),
            None => {}
        }
        let previous = self.remove(id);
        self.primary_to_id.insert(primary.clone(), id);
        self.id_to_primary.insert(id, primary);
        Ok(previous)
    }

    pub fn remove(&mut self, id: RecordId) -> Option<PrimaryKey> {
        let primary = self.id_to_primary.remove(&id)?;
        self.primary_to_id.remove(&primary);
        Some(primary)
    }

    pub fn primary_of(&self, id: RecordId) -> Option<&PrimaryKey> {
        self.id_to_primary.get(&id)
    }

    pub fn lookup(&self, primary: &PrimaryKey) -> Option<RecordId> {
        self.primary_to_id.get(primary).copied()
    }

    pub fn len(&self) -> usize {
        self.id_to_primary.len()
    }

    /// True when both directions are exact inverses of each other.
    pub fn is_consistent(&self) -> bool {
        self.id_to_primary.len() == self.primary_to_id.len()
            && self
                .id_to_primary
                .iter()
                .all(|(id, primary)| self.primary_to_id.get(primary) == Some(id))
    }
}
