use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session-local handle to playable bytes.
///
/// Points at the stored blob, or at the original file when the import could
/// not be persisted. Never serialized; rebuilt from the blob store on startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRef(PathBuf);

impl AudioRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub duration: Option<Duration>,
    pub audio_ref: Option<AudioRef>,
}

impl Track {
    /// Whether the track's content has been hydrated and can be played.
    pub fn is_resolved(&self) -> bool {
        self.audio_ref.is_some()
    }

    pub fn meta(&self) -> TrackMeta {
        TrackMeta {
            id: self.id.clone(),
            name: self.name.clone(),
            duration: self.duration.map(|d| d.as_secs_f64()),
        }
    }

    pub fn recent_entry(&self) -> RecentEntry {
        RecentEntry {
            id: self.id.clone(),
            name: self.name.clone(),
            duration: self.duration.map(|d| d.as_secs_f64()),
        }
    }
}

/// Persisted shape of a [`Track`]: everything except the content handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMeta {
    pub id: String,
    pub name: String,
    /// Seconds, `null` until probed.
    pub duration: Option<f64>,
}

impl TrackMeta {
    pub fn into_track(self, audio_ref: Option<AudioRef>) -> Track {
        Track {
            id: self.id,
            name: self.name,
            duration: self
                .duration
                .filter(|s| s.is_finite() && *s > 0.0)
                .map(Duration::from_secs_f64),
            audio_ref,
        }
    }
}

/// Snapshot of a track taken at the time it was played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub id: String,
    pub name: String,
    pub duration: Option<f64>,
}
