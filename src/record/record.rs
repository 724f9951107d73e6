use std::fmt;
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

use crate::error::{RecordError, Result};
use crate::manager::{RecordManager, Shared};
use crate::value::{Fields, Value};

use super::schema::Schema;

/// Process-local record identity. Assigned monotonically, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(u64);

impl RecordId {
    pub(crate) fn new(raw: u64) -> Self {
        RecordId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to one live record held by a [`RecordManager`].
///
/// The handle is cheap to clone. Field state lives in the manager; every read
/// goes through it and every write is routed through [`RecordManager::update`]
/// so dirty tracking and notification always apply.
#[derive(Clone)]
pub struct Record {
    id: RecordId,
    schema: &'static Schema,
    manager: Weak<Shared>,
}

impl Record {
    pub(crate) fn bind(id: RecordId, schema: &'static Schema, manager: Weak<Shared>) -> Self {
        Record {
            id,
            schema,
            manager,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn entity_type(&self) -> &'static str {
        self.schema.name()
    }

    /// The owning manager, if it is still alive.
    pub fn manager(&self) -> Result<RecordManager> {
        self.manager
            .upgrade()
            .map(RecordManager::from_shared)
            .ok_or(RecordError::ManagerClosed(self.id))
    }

    pub(crate) fn belongs_to(&self, shared: &Arc<Shared>) -> bool {
        std::ptr::eq(self.manager.as_ptr(), Arc::as_ptr(shared))
    }

    /// Reads a declared member (case-insensitive), or one of the record-level
    /// attributes `entity_type`, `primary_key` and `id`.
    pub fn get(&self, field: &str) -> Result<Value> {
        let fields = self.snapshot()?;
        if let Some(member) = self.schema.member(field) {
            return Ok(fields.get(member).cloned().unwrap_or(Value::Null));
        }

        match field.to_ascii_lowercase().as_str() {
            "entity_type" => Ok(Value::from(self.entity_type())),
            "primary_key" => Ok(Value::from(self.schema.key_of(&fields))),
            "id" => Ok(Value::Int(self.id.raw() as i64)),
            _ => Err(self.schema.unknown_member(field)),
        }
    }

    /// Replaces one declared member by issuing a full-snapshot update.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> Result<Record> {
        let member = self
            .schema
            .member(field)
            .ok_or_else(|| self.schema.unknown_member(field))?;
        let mut fields = self.snapshot()?;
        fields.insert(member.to_string(), value.into());
        self.update(fields)
    }

    /// Replaces the whole field snapshot.
    pub fn update(&self, fields: Fields) -> Result<Record> {
        self.manager()?.update(self, fields)
    }

    /// A copy of the current field snapshot.
    pub fn snapshot(&self) -> Result<Fields> {
        self.manager()?.snapshot_of(self)
    }

    pub fn primary_key(&self) -> Result<String> {
        Ok(self.schema.key_of(&self.snapshot()?))
    }

    pub fn is_live(&self) -> bool {
        self.manager()
            .map(|manager| manager.is_live(self))
            .unwrap_or(false)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Weak::ptr_eq(&self.manager, &other.manager)
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("entity_type", &self.schema.name())
            .finish()
    }
}
