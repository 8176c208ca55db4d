use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{StoreError, write_atomic};

const SCHEMA_VERSION: u32 = 1;
const SCHEMA_FILE: &str = "schema.json";
const RECORDS_DIR: &str = "records";

/// One stored audio item. `id` matches the owning track's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRecord {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Schema {
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordMeta {
    id: String,
    name: String,
    mime_type: String,
    len: u64,
}

/// Durable store for raw audio bytes, one record per track id.
///
/// The directory is created and its schema checked on first use, not on
/// construction. Clones share the same lazily opened state.
#[derive(Debug, Clone)]
pub struct BlobStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    root: PathBuf,
    opened: Mutex<bool>,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                root: root.into(),
                opened: Mutex::new(false),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Store `bytes` under `id`, replacing any previous record.
    pub fn put(&self, id: &str, name: &str, mime_type: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let records = self.open()?;
        check_id(id)?;

        // Content first: a metadata file without content would hydrate as
        // resolved and then fail to decode.
        write_atomic(&records.join(format!("{id}.bin")), bytes)?;

        let meta = RecordMeta {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            len: bytes.len() as u64,
        };
        let meta_path = records.join(format!("{id}.json"));
        let json = serde_json::to_vec(&meta).map_err(|source| StoreError::Json {
            path: meta_path.clone(),
            source,
        })?;
        write_atomic(&meta_path, &json)?;

        debug!(id, name, mime_type, len = bytes.len(), "blob stored");
        Ok(())
    }

    /// Fetch the full record for `id`, or `None` if nothing was stored.
    pub fn get(&self, id: &str) -> Result<Option<BlobRecord>, StoreError> {
        let records = self.open()?;
        check_id(id)?;

        let Some(meta) = read_meta(&records.join(format!("{id}.json")))? else {
            return Ok(None);
        };

        let bin_path = records.join(format!("{id}.bin"));
        let bytes = match fs::read(&bin_path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: bin_path,
                    source,
                });
            }
        };

        Ok(Some(BlobRecord {
            id: meta.id,
            name: meta.name,
            mime_type: meta.mime_type,
            bytes,
        }))
    }

    /// Path of the stored content for `id`, if a complete record exists.
    ///
    /// Used for hydration, where the bytes are streamed by the decoder
    /// rather than loaded into memory.
    pub fn locate(&self, id: &str) -> Result<Option<PathBuf>, StoreError> {
        let records = self.open()?;
        check_id(id)?;

        if read_meta(&records.join(format!("{id}.json")))?.is_none() {
            return Ok(None);
        }
        let bin_path = records.join(format!("{id}.bin"));
        Ok(bin_path.is_file().then_some(bin_path))
    }

    fn open(&self) -> Result<PathBuf, StoreError> {
        let records = self.inner.root.join(RECORDS_DIR);
        let mut opened = self.inner.opened.lock().unwrap_or_else(|e| e.into_inner());
        if *opened {
            return Ok(records);
        }

        fs::create_dir_all(&records).map_err(|source| StoreError::CreateDir {
            path: records.clone(),
            source,
        })?;

        let schema_path = self.inner.root.join(SCHEMA_FILE);
        match fs::read(&schema_path) {
            Ok(raw) => {
                let schema: Schema =
                    serde_json::from_slice(&raw).map_err(|source| StoreError::Json {
                        path: schema_path.clone(),
                        source,
                    })?;
                if schema.version != SCHEMA_VERSION {
                    return Err(StoreError::SchemaVersion {
                        found: schema.version,
                        expected: SCHEMA_VERSION,
                    });
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let json = serde_json::to_vec(&Schema {
                    version: SCHEMA_VERSION,
                })
                .map_err(|source| StoreError::Json {
                    path: schema_path.clone(),
                    source,
                })?;
                write_atomic(&schema_path, &json)?;
                info!(root = %self.inner.root.display(), "created blob store");
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: schema_path,
                    source,
                });
            }
        }

        *opened = true;
        Ok(records)
    }
}

fn read_meta(path: &Path) -> Result<Option<RecordMeta>, StoreError> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

// Ids become file names.
fn check_id(id: &str) -> Result<(), StoreError> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}
