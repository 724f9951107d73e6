//! EntityRepository - typed access to the records of one entity type.

use std::marker::PhantomData;

use crate::error::Result;
use crate::record::Entity;
use crate::value::Fields;

use super::manager::RecordManager;

/// Typed view of a [`RecordManager`] for entity type `E`.
pub struct EntityRepository<'a, E> {
    manager: &'a RecordManager,
    _marker: PhantomData<E>,
}

impl<'a, E: Entity> EntityRepository<'a, E> {
    pub fn new(manager: &'a RecordManager) -> Self {
        Self {
            manager,
            _marker: PhantomData,
        }
    }

    /// Create a fresh entity from a complete snapshot.
    pub fn create(&self, fields: Fields) -> Result<E> {
        self.manager
            .create(E::SCHEMA.name(), fields)
            .map(E::from_record)
    }

    /// Find a live entity by primary key.
    pub fn find(&self, key: &str) -> Result<Option<E>> {
        Ok(self
            .manager
            .find_by_primary_key(E::SCHEMA.name(), key)?
            .map(E::from_record))
    }

    /// All live entities, in creation order.
    pub fn all(&self) -> Result<Vec<E>> {
        Ok(self
            .manager
            .records(E::SCHEMA.name())?
            .into_iter()
            .map(E::from_record)
            .collect())
    }

    pub fn delete(&self, entity: E) -> Result<()> {
        self.manager.delete(entity.into_record())
    }
}

impl RecordManager {
    /// Typed repository for entity type `E`. The type's schema must be registered.
    pub fn entities<E: Entity>(&self) -> EntityRepository<'_, E> {
        EntityRepository::new(self)
    }
}
