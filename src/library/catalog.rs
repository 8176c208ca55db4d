use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::LibrarySettings;
use crate::store::BlobStore;

use super::import::{collect_files, import_file};
use super::model::{AudioRef, Track, TrackMeta};

/// Ordered collection of every imported track.
///
/// Order is insertion order and is the playback order. Tracks are only ever
/// appended.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the catalog from persisted metadata, resolving each track's
    /// content from the blob store.
    pub fn hydrate(metas: Vec<TrackMeta>, store: &BlobStore) -> Self {
        let mut tracks = Vec::with_capacity(metas.len());
        let mut unresolved = 0usize;

        for meta in metas {
            let audio_ref = match store.locate(&meta.id) {
                Ok(found) => found.map(AudioRef::new),
                Err(e) => {
                    warn!(id = %meta.id, error = %e, "failed to look up stored content");
                    None
                }
            };
            if audio_ref.is_none() {
                debug!(id = %meta.id, name = %meta.name, "track content not in store");
                unresolved += 1;
            }
            tracks.push(meta.into_track(audio_ref));
        }

        info!(tracks = tracks.len(), unresolved, "catalog hydrated");
        Self { tracks }
    }

    /// Import every accepted file from `inputs` synchronously. Returns the
    /// index of each appended track and whether its bytes reached the store.
    pub fn import_files(
        &mut self,
        inputs: &[PathBuf],
        store: &BlobStore,
        settings: &LibrarySettings,
    ) -> Vec<(usize, bool)> {
        let mut added = Vec::new();
        for path in collect_files(inputs, settings) {
            match import_file(&path, store) {
                Ok(imported) => {
                    let persisted = imported.persisted;
                    added.push((self.push(imported.track), persisted));
                }
                Err(e) => warn!(error = %e, "skipping file"),
            }
        }
        added
    }

    /// Append a track and return its index.
    pub fn push(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn all(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<(usize, &Track)> {
        self.tracks.iter().enumerate().find(|(_, t)| t.id == id)
    }

    /// Record a probed duration. Returns `false` if the id is unknown or the
    /// value is unchanged.
    pub fn set_duration(&mut self, id: &str, duration: Duration) -> bool {
        match self.tracks.iter_mut().find(|t| t.id == id) {
            Some(track) if track.duration != Some(duration) => {
                track.duration = Some(duration);
                true
            }
            _ => false,
        }
    }

    pub fn metas(&self) -> Vec<TrackMeta> {
        self.tracks.iter().map(Track::meta).collect()
    }

    /// Indices of tracks whose name contains `query`, ignoring case.
    /// A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let query = query.trim().to_lowercase();
        self.tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| query.is_empty() || t.name.to_lowercase().contains(&query))
            .map(|(i, _)| i)
            .collect()
    }
}
