use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use tracing::{info, warn};

use crate::app::App;
use crate::audio::RodioOutput;
use crate::config;
use crate::library::{ImportEvent, spawn_probe};
use crate::store::{BlobStore, SettingsStore};

const SETTINGS_FILE: &str = "settings.json";
const LIBRARY_DIR: &str = "library";

/// Where the session lives. Without a home directory we fall back to the
/// working directory rather than refuse to start.
pub fn data_dir(settings: &config::Settings) -> PathBuf {
    settings
        .data_dir()
        .unwrap_or_else(|| PathBuf::from(".flowmusic"))
}

/// Open both stores under `data_dir` and restore the previous session.
pub fn open_session(settings: &config::Settings, data_dir: &Path) -> App {
    let store = SettingsStore::open(data_dir.join(SETTINGS_FILE));
    let blobs = BlobStore::new(data_dir.join(LIBRARY_DIR));
    info!(
        settings = %store.path().display(),
        library = %blobs.root().display(),
        "opening session"
    );
    App::restore(settings, store, blobs, Box::new(RodioOutput::new(1.0)))
}

/// Import paths given on the command line, then probe every track that is
/// still missing a duration (new imports and leftovers from earlier sessions).
pub fn apply_startup_inputs(app: &mut App, args: &[PathBuf], tx: &Sender<ImportEvent>) {
    if !args.is_empty() {
        let added = app.import_now(args);
        if added == 0 {
            warn!(inputs = args.len(), "no audio files among command-line arguments");
        }
    }

    let targets = app.unprobed();
    if !targets.is_empty() {
        info!(tracks = targets.len(), "probing missing durations");
        spawn_probe(targets, tx.clone());
    }
}
