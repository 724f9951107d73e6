mod error;
mod manager;
mod notify;
mod record;
mod store;
mod value;

pub use error::{RecordError, Result};
pub use manager::{
    EntityRepository, ManagerBuilder, ManagerConfig, Origin, PrimaryKey, RecordManager,
    DEFAULT_THRESHOLD,
};
#[cfg(feature = "emitter")]
pub use notify::{EmitterObserver, RECORD_UPDATED, THRESHOLD_CROSSED};
pub use notify::{
    DispatchReport, LogObserver, NotificationHub, Observer, ObserverCategory, ObserverError,
    Route, UpdateEvent,
};
pub use record::{Entity, Record, RecordId, Schema, SchemaRegistry};
pub use store::{Codec, FileStore, InMemoryStore, RecordStore, SnapshotMap};
pub use value::{Fields, Value};

// Re-export the EventEmitter so relay subscribers need no extra dependency
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
