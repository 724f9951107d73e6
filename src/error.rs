use std::path::PathBuf;

use thiserror::Error;

use crate::record::RecordId;

/// Errors raised by records, the manager and the persistent store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Field is not in the entity type's declared member set.
    #[error("{entity_type} has no member `{member}`")]
    UnknownMember { entity_type: String, member: String },

    /// A field snapshot is missing a declared member.
    #[error("{entity_type} snapshot is missing member `{member}`")]
    MissingMember { entity_type: String, member: String },

    /// A snapshot names the same member twice under different spellings.
    #[error("{entity_type} snapshot sets member `{member}` more than once")]
    DuplicateMember { entity_type: String, member: String },

    /// A float member holds NaN or an infinity, which no codec round-trips.
    #[error("{entity_type} member `{member}` is not a finite number")]
    NonFiniteValue { entity_type: String, member: String },

    /// The record was deleted; its runtime id is retired.
    #[error("record {0} has been deleted")]
    RecordRetired(RecordId),

    /// The record is not live in this manager.
    #[error("record {0} is not known to this manager")]
    UnknownRecord(RecordId),

    /// The record handle outlived the manager that created it.
    #[error("record {0} belongs to a manager that has been dropped")]
    ManagerClosed(RecordId),

    /// Another live record of the same type already owns the primary key.
    #[error("{entity_type} with primary key `{key}` already exists")]
    DuplicateKey { entity_type: String, key: String },

    /// No schema is registered under this entity type name.
    #[error("entity type `{0}` is not registered")]
    UnknownEntityType(String),

    /// The backing resource cannot be created, read or written.
    #[error("store at {} is unavailable: {reason}", .path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    /// The backing resource exists but could not be decoded.
    #[error("store at {} is corrupt: {reason}", .path.display())]
    CorruptStore { path: PathBuf, reason: String },

    /// Writing the snapshot to the backing resource failed.
    #[error("failed to persist store: {0}")]
    PersistFailed(String),

    #[error("manager lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

pub type Result<T> = std::result::Result<T, RecordError>;
