use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};

use crate::error::{RecordError, Result};
use crate::notify::{NotificationHub, Observer, Route, UpdateEvent};
use crate::record::{Record, RecordId, Schema, SchemaRegistry};
use crate::store::RecordStore;
use crate::value::Fields;

use super::builder::{ManagerBuilder, ManagerConfig};
use super::identity::{IdentityMap, PrimaryKey};

/// Whether a created record is new or was read back from the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Not yet durable; pending save until the next flush.
    Fresh,
    /// Already durable; not pending save.
    Store,
}

struct LiveRecord {
    schema: &'static Schema,
    fields: Fields,
}

struct ManagerState {
    store: Box<dyn RecordStore>,
    records: HashMap<RecordId, LiveRecord>,
    identity: IdentityMap,
    pending_save: BTreeSet<RecordId>,
    next_id: u64,
    last_update: Option<UpdateEvent>,
}

pub(crate) struct Shared {
    state: RwLock<ManagerState>,
    hub: NotificationHub,
    schemas: SchemaRegistry,
    threshold: f64,
}

/// Owns the live record set: the identity map, the pending-save set and the
/// observer hub.
///
/// All state sits behind one lock, so create/update/delete/flush are
/// serialized and the store's load-modify-save cycle has a single writer.
/// The lock is released before observers run; observers may call back into
/// the manager.
#[derive(Clone)]
pub struct RecordManager {
    shared: Arc<Shared>,
}

impl RecordManager {
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    /// Open a manager over the JSON file store at `path`.
    pub fn open(path: impl AsRef<Path>, schemas: &[&'static Schema]) -> Result<Self> {
        Self::builder()
            .path(path.as_ref())
            .schemas(schemas)
            .open()
    }

    /// A manager over a fresh in-memory store.
    pub fn in_memory(schemas: &[&'static Schema]) -> Result<Self> {
        Self::builder().schemas(schemas).open()
    }

    /// Build a manager over `store` and rehydrate everything it holds.
    pub fn with_store(config: ManagerConfig, store: Box<dyn RecordStore>) -> Result<Self> {
        let state = ManagerState {
            store,
            records: HashMap::new(),
            identity: IdentityMap::default(),
            pending_save: BTreeSet::new(),
            next_id: 1,
            last_update: None,
        };

        let manager = RecordManager {
            shared: Arc::new(Shared {
                state: RwLock::new(state),
                hub: NotificationHub::new(),
                schemas: config.schemas,
                threshold: config.threshold,
            }),
        };
        manager.rehydrate()?;
        Ok(manager)
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        RecordManager { shared }
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, ManagerState>> {
        self.shared
            .state
            .read()
            .map_err(|_| RecordError::LockPoisoned(operation))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, ManagerState>> {
        self.shared
            .state
            .write()
            .map_err(|_| RecordError::LockPoisoned(operation))
    }

    fn rehydrate(&self) -> Result<()> {
        let mut state = self.write("rehydrate")?;

        for entity_type in state.store.list_entity_types() {
            let schema = self.shared.schemas.require(&entity_type)?;
            for key in state.store.list_keys(&entity_type) {
                let Some(snapshot) = state.store.get(&entity_type, &key).cloned() else {
                    continue;
                };
                let record = self.create_locked(&mut state, schema, snapshot, Origin::Store)?;

                // An entry filed under a stale key moves to its primary key on the next flush.
                let primary = state.identity.primary_of(record.id()).map(|p| p.key.clone());
                if let Some(primary) = primary.filter(|primary| *primary != key) {
                    warn!(
                        "{} stored under `{}` has primary key `{}`; re-keying",
                        entity_type, key, primary
                    );
                    state.store.remove(&entity_type, &key);
                    state.pending_save.insert(record.id());
                }
            }
        }

        info!("rehydrated {} records", state.identity.len());
        Ok(())
    }

    fn create_locked(
        &self,
        state: &mut ManagerState,
        schema: &'static Schema,
        fields: Fields,
        origin: Origin,
    ) -> Result<Record> {
        let fields = schema.normalize(fields)?;
        let primary = PrimaryKey::new(schema.name(), schema.key_of(&fields));

        let id = RecordId::new(state.next_id);
        state
            .identity
            .insert(id, primary.clone())
            .map_err(|_| RecordError::DuplicateKey {
                entity_type: schema.name().to_string(),
                key: primary.key.clone(),
            })?;
        state.next_id += 1;

        state.records.insert(id, LiveRecord { schema, fields });
        if origin == Origin::Fresh {
            state.pending_save.insert(id);
        }

        debug!(
            "created {} {} as {} ({:?})",
            schema.name(),
            primary.key,
            id,
            origin
        );
        Ok(Record::bind(id, schema, Arc::downgrade(&self.shared)))
    }

    fn check_live(&self, state: &ManagerState, record: &Record) -> Result<()> {
        let id = record.id();
        if !record.belongs_to(&self.shared) {
            return Err(RecordError::UnknownRecord(id));
        }
        if state.records.contains_key(&id) {
            return Ok(());
        }
        // Ids are never reused, so an issued id that is no longer live was deleted.
        if id.raw() < state.next_id {
            return Err(RecordError::RecordRetired(id));
        }
        Err(RecordError::UnknownRecord(id))
    }

    /// Create a fresh record of `entity_type`. It is pending save until the next flush.
    pub fn create(&self, entity_type: &str, fields: Fields) -> Result<Record> {
        self.create_as(entity_type, fields, Origin::Fresh)
    }

    /// Create a record, marking it pending save unless it came from the store.
    pub fn create_as(&self, entity_type: &str, fields: Fields, origin: Origin) -> Result<Record> {
        let schema = self.shared.schemas.require(entity_type)?;
        let mut state = self.write("create")?;
        self.create_locked(&mut state, schema, fields, origin)
    }

    /// Replace a record's whole snapshot.
    ///
    /// An equal snapshot is a no-op: nothing is marked dirty and nothing is
    /// dispatched. Otherwise the record is marked pending save, re-keyed if its
    /// primary key changed, and the resulting event is dispatched.
    pub fn update(&self, record: &Record, fields: Fields) -> Result<Record> {
        let event = {
            let mut guard = self.write("update")?;
            self.check_live(&guard, record)?;

            let state = &mut *guard;
            let id = record.id();
            let schema = record.schema();
            let fields = schema.normalize(fields)?;

            let live = state
                .records
                .get_mut(&id)
                .ok_or(RecordError::UnknownRecord(id))?;
            if live.fields == fields {
                return Ok(record.clone());
            }

            let primary = PrimaryKey::new(schema.name(), schema.key_of(&fields));
            if state.identity.primary_of(id) != Some(&primary) {
                let previous = state.identity.rekey(id, primary.clone()).map_err(|_| {
                    RecordError::DuplicateKey {
                        entity_type: schema.name().to_string(),
                        key: primary.key.clone(),
                    }
                })?;
                if let Some(previous) = previous {
                    state.store.remove(previous.entity_type, &previous.key);
                    debug!(
                        "re-keyed {} {} from {} to {}",
                        schema.name(),
                        id,
                        previous.key,
                        primary.key
                    );
                }
            }

            let route = Route::classify(schema, &live.fields, &fields, self.shared.threshold);
            let previous = std::mem::replace(&mut live.fields, fields.clone());
            state.pending_save.insert(id);

            let event = UpdateEvent::new(record.clone(), primary.key, previous, fields, route);
            state.last_update = Some(event.clone());
            debug_assert!(state.identity.is_consistent());
            event
        };

        self.shared.hub.dispatch(&event);
        Ok(record.clone())
    }

    /// Delete a record: retire its runtime id, drop it from the identity map
    /// and remove its snapshot from the store.
    pub fn delete(&self, record: Record) -> Result<()> {
        let mut guard = self.write("delete")?;
        self.check_live(&guard, &record)?;

        let state = &mut *guard;
        let id = record.id();
        state.records.remove(&id);
        state.pending_save.remove(&id);
        if let Some(primary) = state.identity.remove(id) {
            state.store.remove(primary.entity_type, &primary.key);
            debug!("deleted {} {} ({})", primary.entity_type, primary.key, id);
        }
        Ok(())
    }

    /// The live record of `entity_type` keyed by `key`, if any.
    pub fn find_by_primary_key(&self, entity_type: &str, key: &str) -> Result<Option<Record>> {
        let schema = self.shared.schemas.require(entity_type)?;
        let state = self.read("find")?;
        let primary = PrimaryKey::new(schema.name(), key);

        Ok(state
            .identity
            .lookup(&primary)
            .filter(|id| state.records.contains_key(id))
            .map(|id| Record::bind(id, schema, Arc::downgrade(&self.shared))))
    }

    /// Write every pending snapshot into the store and save it.
    ///
    /// The pending set is cleared only after the save succeeds, so a failed
    /// flush can simply be retried. Returns the number of records written.
    pub fn flush(&self) -> Result<usize> {
        let mut guard = self.write("flush")?;
        let ManagerState {
            store,
            records,
            identity,
            pending_save,
            ..
        } = &mut *guard;

        for id in pending_save.iter() {
            let (Some(live), Some(primary)) = (records.get(id), identity.primary_of(*id)) else {
                continue;
            };
            store.put(primary.entity_type, &primary.key, live.fields.clone());
        }
        store.save()?;

        let flushed = pending_save.len();
        pending_save.clear();
        info!("flushed {} records", flushed);
        Ok(flushed)
    }

    pub fn attach(&self, observer: Arc<dyn Observer>) -> bool {
        self.shared.hub.attach(observer)
    }

    pub fn detach<O: Observer + ?Sized>(&self, observer: &Arc<O>) -> bool {
        self.shared.hub.detach(observer)
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.shared.hub
    }

    /// A copy of the record's current snapshot.
    pub fn snapshot_of(&self, record: &Record) -> Result<Fields> {
        let state = self.read("snapshot")?;
        self.check_live(&state, record)?;
        state
            .records
            .get(&record.id())
            .map(|live| live.fields.clone())
            .ok_or(RecordError::UnknownRecord(record.id()))
    }

    pub fn is_live(&self, record: &Record) -> bool {
        self.read("is_live")
            .map(|state| self.check_live(&state, record).is_ok())
            .unwrap_or(false)
    }

    /// True if the record changed since the last successful flush.
    pub fn is_pending(&self, record: &Record) -> bool {
        self.read("is_pending")
            .map(|state| record.belongs_to(&self.shared) && state.pending_save.contains(&record.id()))
            .unwrap_or(false)
    }

    pub fn pending_len(&self) -> usize {
        self.read("pending_len")
            .map(|state| state.pending_save.len())
            .unwrap_or(0)
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.read("len").map(|state| state.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live records of `entity_type`, in creation order.
    pub fn records(&self, entity_type: &str) -> Result<Vec<Record>> {
        let schema = self.shared.schemas.require(entity_type)?;
        let state = self.read("records")?;
        let mut ids: Vec<RecordId> = state
            .records
            .iter()
            .filter(|(_, live)| live.schema.name() == schema.name())
            .map(|(id, _)| *id)
            .collect();
        ids.sort();

        Ok(ids
            .into_iter()
            .map(|id| Record::bind(id, schema, Arc::downgrade(&self.shared)))
            .collect())
    }

    /// The most recent applied update.
    pub fn last_update(&self) -> Result<Option<UpdateEvent>> {
        Ok(self.read("last_update")?.last_update.clone())
    }

    pub fn threshold(&self) -> f64 {
        self.shared.threshold
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.shared.schemas
    }

    #[cfg(test)]
    fn identity_is_consistent(&self) -> bool {
        let state = self.read("identity").unwrap();
        state.identity.is_consistent() && state.identity.len() == state.records.len()
    }
}
