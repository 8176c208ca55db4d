//! Background import: file reads, blob writes and duration probes run off
//! the UI thread and report back over a channel.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, warn};

use crate::config::LibrarySettings;
use crate::store::BlobStore;

use super::import::{collect_files, import_file};
use super::model::Track;
use super::probe::probe_duration;

#[derive(Debug)]
pub enum ImportEvent {
    /// A track is ready to be appended to the catalog.
    Imported { track: Track, persisted: bool },
    /// The duration of an already imported track is known.
    DurationProbed { id: String, duration: Duration },
    /// A file was accepted but could not be read.
    Failed { path: PathBuf, error: String },
    /// Every file of the batch has been handled.
    BatchDone { accepted: usize, failed: usize },
}

/// Import `inputs` on a worker thread.
///
/// Each batch is independent; events of concurrent batches may interleave.
pub fn spawn_import(
    inputs: Vec<PathBuf>,
    store: BlobStore,
    settings: LibrarySettings,
    tx: Sender<ImportEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let files = collect_files(&inputs, &settings);
        info!(files = files.len(), "import batch started");

        let mut accepted = 0usize;
        let mut failed = 0usize;
        for path in files {
            let imported = match import_file(&path, &store) {
                Ok(imported) => imported,
                Err(e) => {
                    warn!(error = %e, "import failed");
                    failed += 1;
                    let _ = tx.send(ImportEvent::Failed {
                        path,
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            accepted += 1;

            let id = imported.track.id.clone();
            let probe_path = imported
                .track
                .audio_ref
                .as_ref()
                .map(|r| r.path().to_path_buf())
                .unwrap_or_else(|| path.clone());

            if tx
                .send(ImportEvent::Imported {
                    track: imported.track,
                    persisted: imported.persisted,
                })
                .is_err()
            {
                // UI is gone.
                return;
            }

            if let Some(duration) = probe_duration(&probe_path) {
                let _ = tx.send(ImportEvent::DurationProbed { id, duration });
            }
        }

        let _ = tx.send(ImportEvent::BatchDone { accepted, failed });
    })
}

/// Probe durations for tracks that don't have one yet.
pub fn spawn_probe(targets: Vec<(String, PathBuf)>, tx: Sender<ImportEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        for (id, path) in targets {
            if let Some(duration) = probe_duration(&path) {
                if tx.send(ImportEvent::DurationProbed { id, duration }).is_err() {
                    return;
                }
            }
        }
    })
}
