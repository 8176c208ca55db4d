use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::store::BlobStore;

use super::model::{AudioRef, Track};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A freshly imported track plus whether its bytes reached the blob store.
#[derive(Debug, Clone)]
pub struct Imported {
    pub track: Track,
    pub persisted: bool,
}

/// MIME type for well-known audio extensions.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "m4a" | "mp4a" => "audio/mp4",
        "aac" => "audio/aac",
        "aif" | "aiff" => "audio/aiff",
        "weba" => "audio/webm",
        _ => return None,
    };
    Some(mime)
}

/// Accept files whose type is `audio/*` or whose extension is on the
/// configured allow-list.
pub fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    if mime_for(path).is_some() {
        return true;
    }

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            settings
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .any(|e| !e.is_empty() && e == ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Display name for a file: its name with one trailing extension removed.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

/// Millisecond timestamp plus a random suffix.
pub fn new_track_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let suffix: u32 = rand::rng().random();
    format!("{millis:x}-{suffix:08x}")
}

/// Expand dropped paths into the audio files to import.
///
/// Files are kept in the order given; directories are walked and contribute
/// their audio files sorted by path. Anything else is dropped silently.
pub fn collect_files(inputs: &[PathBuf], settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut walker = WalkDir::new(input).follow_links(true).sort_by_file_name();
            if let Some(d) = settings.max_depth {
                walker = walker.max_depth(d);
            }
            for entry in walker
                .into_iter()
                .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
                .filter_map(Result::ok)
            {
                let path = entry.path();
                if path.is_file() && is_audio_file(path, settings) {
                    files.push(path.to_path_buf());
                }
            }
        } else if is_audio_file(input, settings) {
            files.push(input.clone());
        } else {
            debug!(path = %input.display(), "skipping non-audio input");
        }
    }

    files
}

/// Import one file: read it, assign an id, and persist its bytes.
///
/// A storage failure does not fail the import; the track then plays from
/// the original file for this session only.
pub fn import_file(path: &Path, store: &BlobStore) -> Result<Imported, ImportError> {
    let bytes = fs::read(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let id = new_track_id();
    let name = display_name(path);
    let mime = mime_for(path).unwrap_or("application/octet-stream");

    let stored = store
        .put(&id, &name, mime, &bytes)
        .and_then(|()| store.locate(&id));

    let (audio_ref, persisted) = match stored {
        Ok(Some(content)) => (AudioRef::new(content), true),
        Ok(None) => {
            warn!(id, name, "stored blob not found, keeping track for this session only");
            (AudioRef::new(path), false)
        }
        Err(e) => {
            warn!(id, name, error = %e, "failed to persist track, keeping it for this session only");
            (AudioRef::new(path), false)
        }
    };

    Ok(Imported {
        track: Track {
            id,
            name,
            duration: None,
            audio_ref: Some(audio_ref),
        },
        persisted,
    })
}
