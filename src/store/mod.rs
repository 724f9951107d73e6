//! Persistent store - the durable entity type -> primary key -> snapshot mapping.
//!
//! A store is loaded wholesale when opened and written back wholesale on
//! [`RecordStore::save`]. Between saves the in-memory mapping is the working
//! copy; there is no incremental persistence.
//!
//! ## Example
//!
//! ```ignore
//! use record_keeper::{fields, Codec, FileStore, RecordStore};
//!
//! let mut store = FileStore::open("inventory.json", Codec::Json)?;
//! store.put("product", "A-1", fields! { "sku" => "A-1", "quantity" => 3 });
//! store.save()?;
//! ```

mod file;
mod in_memory;
mod snapshot_map;

use crate::error::Result;
use crate::value::Fields;

pub use file::{Codec, FileStore};
pub use in_memory::InMemoryStore;
pub use snapshot_map::SnapshotMap;

/// Storage backing a [`RecordManager`](crate::RecordManager).
///
/// At most one snapshot is held per (entity type, primary key) pair.
pub trait RecordStore: Send + Sync {
    /// The snapshot stored under the pair, if any.
    fn get(&self, entity_type: &str, key: &str) -> Option<&Fields>;

    /// Insert or replace the snapshot for the pair.
    fn put(&mut self, entity_type: &str, key: &str, snapshot: Fields);

    /// Remove the snapshot for the pair. Returns true if one existed.
    fn remove(&mut self, entity_type: &str, key: &str) -> bool;

    /// Entity types with at least one stored snapshot.
    fn list_entity_types(&self) -> Vec<String>;

    /// Primary keys stored for an entity type.
    fn list_keys(&self, entity_type: &str) -> Vec<String>;

    /// Replace the durable content with the whole working mapping.
    fn save(&mut self) -> Result<()>;
}
