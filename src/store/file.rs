//! FileStore - whole-file snapshot store.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{RecordError, Result};
use crate::value::Fields;

use super::{RecordStore, SnapshotMap};

/// Serialization format of the backing file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Codec {
    /// Human readable JSON.
    #[default]
    Json,
    /// Compact binary encoding.
    Bitcode,
}

impl Codec {
    fn encode(self, map: &SnapshotMap) -> std::result::Result<Vec<u8>, String> {
        match self {
            Codec::Json => serde_json::to_vec_pretty(map).map_err(|e| e.to_string()),
            Codec::Bitcode => bitcode::serialize(map).map_err(|e| e.to_string()),
        }
    }

    fn decode(self, bytes: &[u8]) -> std::result::Result<SnapshotMap, String> {
        match self {
            Codec::Json => {
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(SnapshotMap::new());
                }
                serde_json::from_slice(bytes).map_err(|e| e.to_string())
            }
            Codec::Bitcode => {
                if bytes.is_empty() {
                    return Ok(SnapshotMap::new());
                }
                bitcode::deserialize(bytes).map_err(|e| e.to_string())
            }
        }
    }
}

/// Store persisted as one file that every save replaces atomically.
///
/// Saves write a sibling temporary file, sync it, then rename it over the
/// target so readers never observe a half-written store.
pub struct FileStore {
    path: PathBuf,
    codec: Codec,
    data: SnapshotMap,
}

impl FileStore {
    /// Open the store at `path`, creating an empty file if none exists.
    pub fn open(path: impl AsRef<Path>, codec: Codec) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |err: std::io::Error| RecordError::StoreUnavailable {
            path: path.clone(),
            reason: err.to_string(),
        };

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(unavailable)?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(unavailable)?;

        let data = codec
            .decode(&bytes)
            .map_err(|reason| RecordError::CorruptStore {
                path: path.clone(),
                reason,
            })?;

        info!(
            "opened store {} ({} snapshots, {:?})",
            path.display(),
            data.len(),
            codec
        );

        Ok(FileStore { path, codec, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// The working mapping, including changes not yet saved.
    pub fn data(&self) -> &SnapshotMap {
        &self.data
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_atomically(&self, bytes: &[u8]) -> std::io::Result<()> {
        let tmp_path = self.temp_path();
        let result = (|| -> std::io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

impl RecordStore for FileStore {
    fn get(&self, entity_type: &str, key: &str) -> Option<&Fields> {
        self.data.get(entity_type, key)
    }

    fn put(&mut self, entity_type: &str, key: &str, snapshot: Fields) {
        self.data.put(entity_type, key, snapshot);
    }

    fn remove(&mut self, entity_type: &str, key: &str) -> bool {
        self.data.remove(entity_type, key)
    }

    fn list_entity_types(&self) -> Vec<String> {
        self.data.entity_types()
    }

    fn list_keys(&self, entity_type: &str) -> Vec<String> {
        self.data.keys(entity_type)
    }

    fn save(&mut self) -> Result<()> {
        let bytes = self
            .codec
            .encode(&self.data)
            .map_err(RecordError::PersistFailed)?;

        self.write_atomically(&bytes).map_err(|err| {
            RecordError::PersistFailed(format!("{}: {}", self.path.display(), err))
        })?;

        debug!(
            "saved {} snapshots to {} ({} bytes)",
            self.data.len(),
            self.path.display(),
            bytes.len()
        );
        Ok(())
    }
}
