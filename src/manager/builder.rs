use std::path::PathBuf;

use crate::error::Result;
use crate::record::{Schema, SchemaRegistry};
use crate::store::{Codec, FileStore, InMemoryStore, RecordStore};

use super::manager::RecordManager;

/// Quantity below which an update counts as a threshold crossing.
pub const DEFAULT_THRESHOLD: f64 = 5.0;

/// Settings a [`RecordManager`] is opened with.
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    pub path: Option<PathBuf>,
    pub codec: Codec,
    pub threshold: f64,
    pub schemas: SchemaRegistry,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            path: None,
            codec: Codec::default(),
            threshold: DEFAULT_THRESHOLD,
            schemas: SchemaRegistry::new(),
        }
    }
}

/// Builder for [`RecordManager`].
///
/// ```ignore
/// let manager = RecordManager::builder()
///     .path("inventory.json")
///     .schema(&PRODUCT)
///     .threshold(5.0)
///     .open()?;
/// ```
#[derive(Default)]
pub struct ManagerBuilder {
    config: ManagerConfig,
    store: Option<Box<dyn RecordStore>>,
}

impl ManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back the manager with a [`FileStore`] at `path`.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = Some(path.into());
        self
    }

    pub fn codec(mut self, codec: Codec) -> Self {
        self.config.codec = codec;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.threshold = threshold;
        self
    }

    pub fn schema(mut self, schema: &'static Schema) -> Self {
        self.config.schemas.register(schema);
        self
    }

    pub fn schemas(mut self, schemas: &[&'static Schema]) -> Self {
        for schema in schemas {
            self.config.schemas.register(*schema);
        }
        self
    }

    /// Back the manager with a caller-supplied store. Takes precedence over `path`.
    pub fn store(mut self, store: impl RecordStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Open the store and rehydrate every persisted record.
    pub fn open(self) -> Result<RecordManager> {
        let store: Box<dyn RecordStore> = match (self.store, &self.config.path) {
            (Some(store), _) => store,
            (None, Some(path)) => Box::new(FileStore::open(path, self.config.codec)?),
            (None, None) => Box::new(InMemoryStore::new()),
        };
        RecordManager::with_store(self.config, store)
    }
}
