//! Local persistence: a key/value settings file and a blob store for audio bytes.
//!
//! The two stores share nothing but the track id: metadata lives in the
//! settings file under [`keys::TRACKS`], raw bytes live in the blob store
//! keyed by the same id.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

mod blobs;
mod settings;

pub use blobs::{BlobRecord, BlobStore};
pub use settings::SettingsStore;

/// Logical keys of the settings store.
pub mod keys {
    pub const TRACKS: &str = "flowmusic.tracks";
    pub const RECENTS: &str = "flowmusic.recents";
    pub const VOLUME: &str = "flowmusic.volume";
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to prepare store directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("Malformed data in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize value for {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
    #[error("Unsupported blob schema version {found} (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },
    #[error("Invalid record id {0:?}")]
    InvalidId(String),
}

/// Write `bytes` next to `path` and rename over it, so readers never observe
/// a half-written file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(|source| StoreError::Write {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests;
