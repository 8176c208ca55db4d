//! The session object: catalog, recents, playback and view state.
//!
//! `App` is owned by the UI thread. Workers never touch it; they send
//! [`ImportEvent`]s that the event loop applies here.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audio::{MediaOutput, PlaybackController, RepeatMode, SampleTap, Transition};
use crate::config::{LibrarySettings, Settings};
use crate::library::{Catalog, ImportEvent, Recents, RecentEntry, TrackMeta, spawn_import};
use crate::store::{BlobStore, SettingsStore, keys};
use crate::visualizer::Visualizer;

/// Curated picks shown on the home tab. Display only.
pub const RECOMMENDATIONS: &[(&str, &str)] = &[
    ("Weightless", "Marconi Union"),
    ("Clair de Lune", "Claude Debussy"),
    ("Intro", "The xx"),
    ("Porcelain", "Moby"),
    ("Svefn-g-englar", "Sigur Rós"),
    ("Teardrop", "Massive Attack"),
];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Home,
    Playlist,
    Search,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Home, Tab::Playlist, Tab::Search];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Home => "home",
            Tab::Playlist => "playlist",
            Tab::Search => "search",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Home => Tab::Playlist,
            Tab::Playlist => Tab::Search,
            Tab::Search => Tab::Home,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Tab::Home => Tab::Search,
            Tab::Playlist => Tab::Home,
            Tab::Search => Tab::Playlist,
        }
    }
}

/// What typed characters go to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Editing the search query.
    Search,
    /// Typing paths to import.
    OpenPath,
}

pub struct App {
    pub catalog: Catalog,
    pub recents: Recents,
    pub player: PlaybackController,
    pub visualizer: Visualizer,

    pub tab: Tab,
    pub input: InputMode,
    /// Cursor into the list shown by the active tab.
    pub selected: usize,
    pub search_query: String,
    pub path_input: String,
    pub status: Option<String>,
    pub pending_batches: usize,

    store: SettingsStore,
    blobs: BlobStore,
    library: LibrarySettings,
    seek_step: i64,
    volume_step: f32,
    // Tracks whose bytes could not be stored; kept out of the saved list.
    session_only: HashSet<String>,
    redraw: bool,
}

impl App {
    /// Rebuild the previous session from the stores: track list (hydrated
    /// against the blob store), recents and volume.
    pub fn restore(
        settings: &Settings,
        store: SettingsStore,
        blobs: BlobStore,
        output: Box<dyn MediaOutput>,
    ) -> Self {
        let metas: Vec<TrackMeta> = store.load_json(keys::TRACKS).unwrap_or_default();
        let catalog = Catalog::hydrate(metas, &blobs);
        let recents = Recents::from_saved(
            store
                .load_json::<Vec<RecentEntry>>(keys::RECENTS)
                .unwrap_or_default(),
        );
        let volume = store
            .get_string(keys::VOLUME)
            .and_then(|v| v.trim().parse::<f32>().ok())
            .unwrap_or(1.0);

        let tap = SampleTap::new();
        let mut player = PlaybackController::new(
            output,
            volume,
            Duration::from_secs(settings.playback.restart_threshold_secs),
        );
        if settings.visualizer.enabled {
            player = player.with_analysis_tap(tap.clone());
        }
        player.set_shuffle(settings.playback.shuffle);
        player.set_repeat(RepeatMode::from(settings.playback.repeat));

        let mut app = Self {
            catalog,
            recents,
            player,
            visualizer: Visualizer::new(&settings.visualizer, tap),
            tab: Tab::default(),
            input: InputMode::default(),
            selected: 0,
            search_query: String::new(),
            path_input: String::new(),
            status: None,
            pending_batches: 0,
            store,
            blobs,
            library: settings.library.clone(),
            seek_step: settings.playback.seek_step_secs.min(i64::MAX as u64) as i64,
            volume_step: settings.playback.volume_step,
            session_only: HashSet::new(),
            redraw: true,
        };

        if let Some(first) = app.catalog.all().iter().position(|t| t.is_resolved()) {
            let t = app.player.load(&app.catalog, first);
            app.on_transition(t);
        }
        info!(
            tracks = app.catalog.len(),
            recents = app.recents.entries().len(),
            volume = app.player.volume(),
            "session restored"
        );
        app
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Returns and clears the redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
        self.request_redraw();
    }

    /// Ids and content paths of tracks whose duration is still unknown.
    pub fn unprobed(&self) -> Vec<(String, PathBuf)> {
        self.catalog
            .all()
            .iter()
            .filter(|t| t.duration.is_none())
            .filter_map(|t| {
                t.audio_ref
                    .as_ref()
                    .map(|r| (t.id.clone(), r.path().to_path_buf()))
            })
            .collect()
    }

    // Imports

    /// Start a background import of `paths`. Results arrive on `tx`.
    pub fn import_paths(&mut self, paths: Vec<PathBuf>, tx: &Sender<ImportEvent>) {
        if paths.is_empty() {
            return;
        }
        info!(inputs = paths.len(), "import requested");
        spawn_import(paths, self.blobs.clone(), self.library.clone(), tx.clone());
        self.pending_batches += 1;
        self.set_status("importing…");
    }

    /// Import `paths` on the calling thread. Used for command-line arguments
    /// before the terminal is taken over. Durations are left to a probe pass.
    pub fn import_now(&mut self, paths: &[PathBuf]) -> usize {
        let added = self.catalog.import_files(paths, &self.blobs, &self.library);
        for &(index, persisted) in &added {
            if persisted {
                continue;
            }
            if let Some(track) = self.catalog.get(index) {
                self.session_only.insert(track.id.clone());
            }
        }
        if let Some(&(first, _)) = added.first() {
            self.persist_tracks();
            if self.player.current_index().is_none() {
                let t = self.player.load(&self.catalog, first);
                self.on_transition(t);
            }
            self.set_status(format!("imported {} track(s)", added.len()));
        }
        added.len()
    }

    pub fn apply_import_event(&mut self, event: ImportEvent) {
        match event {
            ImportEvent::Imported { track, persisted } => {
                let name = track.name.clone();
                if !persisted {
                    self.session_only.insert(track.id.clone());
                    self.set_status(format!("{name}: storage unavailable, kept for this session"));
                }
                let index = self.catalog.push(track);
                debug!(index, %name, persisted, "track added");
                self.persist_tracks();

                if self.player.current_index().is_none() {
                    let t = self.player.load(&self.catalog, index);
                    self.on_transition(t);
                }
                self.request_redraw();
            }
            ImportEvent::DurationProbed { id, duration } => {
                if self.catalog.set_duration(&id, duration) {
                    self.persist_tracks();
                    self.request_redraw();
                }
            }
            ImportEvent::Failed { path, error } => {
                self.set_status(format!("could not import {}: {error}", path.display()));
            }
            ImportEvent::BatchDone { accepted, failed } => {
                self.pending_batches = self.pending_batches.saturating_sub(1);
                let msg = match (accepted, failed) {
                    (0, 0) => "no audio files found".to_string(),
                    (n, 0) => format!("imported {n} track(s)"),
                    (n, f) => format!("imported {n} track(s), {f} failed"),
                };
                self.set_status(msg);
            }
        }
    }

    // Playback

    pub fn toggle_play_pause(&mut self) {
        let t = self.player.toggle_play_pause(&self.catalog);
        self.on_transition(t);
    }

    pub fn next(&mut self) {
        let t = self.player.next(&self.catalog);
        self.on_transition(t);
    }

    pub fn previous(&mut self) {
        let t = self.player.previous(&self.catalog);
        self.on_transition(t);
        // A restart changes the position only.
        self.request_redraw();
    }

    /// Load and start the track at `index`.
    pub fn play_at(&mut self, index: usize) {
        let t = self.player.load(&self.catalog, index);
        if t == Transition::None {
            self.set_status("that track's audio is not available");
            return;
        }
        self.on_transition(t);
        let t = self.player.play(&self.catalog);
        self.on_transition(t);
    }

    pub fn play_recent(&mut self, id: &str) {
        match self.catalog.find_by_id(id) {
            Some((index, _)) => self.play_at(index),
            None => self.set_status("that track is no longer in the library"),
        }
    }

    pub fn toggle_shuffle(&mut self) {
        self.player.toggle_shuffle();
        self.request_redraw();
    }

    pub fn cycle_repeat_mode(&mut self) {
        self.player.cycle_repeat_mode();
        self.request_redraw();
    }

    pub fn seek_by_step(&mut self, forward: bool) {
        let delta = if forward { self.seek_step } else { -self.seek_step };
        self.player.seek_by(&self.catalog, delta);
        self.request_redraw();
    }

    pub fn seek_fraction(&mut self, fraction: f64) {
        self.player.seek_fraction(&self.catalog, fraction);
        self.request_redraw();
    }

    pub fn step_volume(&mut self, up: bool) {
        let delta = if up { self.volume_step } else { -self.volume_step };
        self.set_volume(self.player.volume() + delta);
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = self.player.set_volume(volume);
        if let Err(e) = self.store.set_string(keys::VOLUME, format!("{volume}")) {
            warn!(error = %e, "failed to save volume");
        }
        self.request_redraw();
    }

    /// Poll the media output and advance the visualizer.
    pub fn tick(&mut self, now: Instant) {
        let t = self.player.tick(&self.catalog);
        self.on_transition(t);
        if self.visualizer.tick(now) || self.player.is_playing() {
            self.request_redraw();
        }
    }

    fn on_transition(&mut self, transition: Transition) {
        match transition {
            Transition::None => return,
            Transition::Started(index) => {
                self.fill_duration(index);
                if let Some(track) = self.catalog.get(index) {
                    self.recents.record(track.recent_entry());
                    self.persist_recents();
                }
                if self.player.analysis_ready() {
                    self.visualizer.start(Instant::now());
                } else if self.visualizer.enabled() {
                    self.visualizer.disable();
                }
            }
            Transition::Loaded(index) => {
                self.fill_duration(index);
                self.visualizer.stop();
            }
            Transition::Paused | Transition::Stopped => self.visualizer.stop(),
        }
        self.request_redraw();
    }

    // Fall back to the decoder's duration when probing found none.
    fn fill_duration(&mut self, index: usize) {
        let Some(duration) = self.player.source_duration() else {
            return;
        };
        let Some(track) = self.catalog.get(index) else {
            return;
        };
        if track.duration.is_none() {
            let id = track.id.clone();
            if self.catalog.set_duration(&id, duration) {
                self.persist_tracks();
            }
        }
    }

    // Persistence. Failures leave the session running from memory.

    fn persist_tracks(&mut self) {
        let metas: Vec<TrackMeta> = self
            .catalog
            .metas()
            .into_iter()
            .filter(|m| !self.session_only.contains(&m.id))
            .collect();
        if let Err(e) = self.store.save_json(keys::TRACKS, &metas) {
            warn!(error = %e, "failed to save track list");
        }
    }

    fn persist_recents(&mut self) {
        if let Err(e) = self.store.save_json(keys::RECENTS, self.recents.entries()) {
            warn!(error = %e, "failed to save recents");
        }
    }

    // View state

    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.selected = 0;
        }
        self.request_redraw();
    }

    pub fn next_tab(&mut self) {
        self.set_tab(self.tab.next());
    }

    pub fn prev_tab(&mut self) {
        self.set_tab(self.tab.prev());
    }

    /// Indices of catalog tracks matching the search query.
    pub fn search_results(&self) -> Vec<usize> {
        self.catalog.search(&self.search_query)
    }

    pub fn begin_search(&mut self) {
        self.set_tab(Tab::Search);
        self.input = InputMode::Search;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search_query.push(c);
        self.selected = 0;
        self.request_redraw();
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
        self.selected = 0;
        self.request_redraw();
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.selected = 0;
        self.input = InputMode::Normal;
        self.request_redraw();
    }

    pub fn begin_open_path(&mut self) {
        self.path_input.clear();
        self.input = InputMode::OpenPath;
        self.request_redraw();
    }

    pub fn cancel_input(&mut self) {
        self.input = InputMode::Normal;
        self.request_redraw();
    }

    /// Number of entries in the list the active tab shows.
    pub fn visible_len(&self) -> usize {
        match self.tab {
            Tab::Home => self.recents.entries().len(),
            Tab::Playlist => self.catalog.len(),
            Tab::Search => self.search_results().len(),
        }
    }

    pub fn select_next(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
            self.request_redraw();
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            self.selected = if self.selected == 0 { len - 1 } else { self.selected - 1 };
            self.request_redraw();
        }
    }

    /// Play whatever the cursor is on in the active tab.
    pub fn activate_selected(&mut self) {
        match self.tab {
            Tab::Home => {
                if let Some(id) = self.recents.entries().get(self.selected).map(|e| e.id.clone()) {
                    self.play_recent(&id);
                }
            }
            Tab::Playlist => {
                if self.selected < self.catalog.len() {
                    self.play_at(self.selected);
                }
            }
            Tab::Search => {
                if let Some(&index) = self.search_results().get(self.selected) {
                    self.play_at(index);
                }
            }
        }
    }
}
