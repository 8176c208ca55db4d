//! Playback state machine over `Stopped / Loaded / Playing / Paused`.
//!
//! The controller owns the current index and the shuffle/repeat policy. The
//! catalog is passed into every operation; the controller never keeps track
//! data of its own beyond what the media output reports.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::library::Catalog;

use super::output::MediaOutput;
use super::tap::SampleTap;
use super::types::{PlayerStatus, RepeatMode, Transition};

/// One-shot analysis init state.
enum Analysis {
    /// No tap requested (visualizer disabled).
    Off,
    /// Tap waiting to be attached on the first `play`.
    Pending(SampleTap),
    Ready,
    /// Attaching failed; the visualizer stays off for the session.
    Disabled,
}

pub struct PlaybackController {
    output: Box<dyn MediaOutput>,
    status: PlayerStatus,
    index: Option<usize>,
    shuffle: bool,
    repeat: RepeatMode,
    volume: f32,
    source_duration: Option<Duration>,
    restart_threshold: Duration,
    analysis: Analysis,
    rng: SmallRng,
}

/// Clamp a requested volume into `[0, 1]`. NaN is treated as silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Pick a uniformly random index other than `current`. With a single track
/// the only choice is `current` itself.
pub fn pick_shuffled<R: Rng + ?Sized>(current: usize, len: usize, rng: &mut R) -> usize {
    if len <= 1 {
        return current.min(len.saturating_sub(1));
    }
    let r = rng.random_range(0..len - 1);
    if r >= current { r + 1 } else { r }
}

impl PlaybackController {
    pub fn new(output: Box<dyn MediaOutput>, volume: f32, restart_threshold: Duration) -> Self {
        let mut controller = Self {
            output,
            status: PlayerStatus::Stopped,
            index: None,
            shuffle: false,
            repeat: RepeatMode::Off,
            volume: 1.0,
            source_duration: None,
            restart_threshold,
            analysis: Analysis::Off,
            rng: SmallRng::from_os_rng(),
        };
        controller.set_volume(volume);
        controller
    }

    /// Request a sample tap for the visualizer. It is attached on the first
    /// successful `play`, never twice.
    pub fn with_analysis_tap(mut self, tap: SampleTap) -> Self {
        if matches!(self.analysis, Analysis::Off) {
            self.analysis = Analysis::Pending(tap);
        }
        self
    }

    #[cfg(test)]
    pub(crate) fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlayerStatus::Playing
    }

    pub fn current_index(&self) -> Option<usize> {
        self.index
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn analysis_ready(&self) -> bool {
        matches!(self.analysis, Analysis::Ready)
    }

    /// Duration reported by the decoder for the loaded source, if any.
    pub fn source_duration(&self) -> Option<Duration> {
        self.source_duration
    }

    pub fn position(&self) -> Duration {
        match self.status {
            PlayerStatus::Stopped => Duration::ZERO,
            _ => self.output.position(),
        }
    }

    /// Duration of the current track: probed metadata first, decoder second.
    pub fn duration(&self, catalog: &Catalog) -> Option<Duration> {
        self.index
            .and_then(|i| catalog.get(i))
            .and_then(|t| t.duration)
            .or(self.source_duration)
    }

    pub fn set_shuffle(&mut self, on: bool) {
        self.shuffle = on;
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    pub fn cycle_repeat_mode(&mut self) {
        self.repeat = self.repeat.next();
    }

    /// Clamp, apply and return the new volume. The caller persists it.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = clamp_volume(volume);
        self.output.set_volume(self.volume);
        self.volume
    }

    /// Bind the track at `index` without starting it.
    pub fn load(&mut self, catalog: &Catalog, index: usize) -> Transition {
        let Some(track) = catalog.get(index) else {
            warn!(index, len = catalog.len(), "load: index out of range");
            return Transition::None;
        };
        let Some(audio_ref) = track.audio_ref.as_ref() else {
            warn!(id = %track.id, name = %track.name, "load: track content is not available");
            return Transition::None;
        };

        match self.output.load(audio_ref) {
            Ok(duration) => {
                self.index = Some(index);
                self.status = PlayerStatus::Loaded;
                self.source_duration = duration;
                debug!(index, name = %track.name, "track loaded");
                Transition::Loaded(index)
            }
            Err(e) => {
                warn!(id = %track.id, error = %e, "load failed");
                Transition::None
            }
        }
    }

    pub fn play(&mut self, catalog: &Catalog) -> Transition {
        if catalog.is_empty() {
            return Transition::None;
        }
        let index = self.index.unwrap_or(0).min(catalog.len() - 1);
        let resolved = catalog.get(index).map(|t| t.is_resolved()).unwrap_or(false);
        if !resolved {
            warn!(index, "play: track content is not available");
            return Transition::None;
        }

        if (self.status == PlayerStatus::Stopped || self.index != Some(index))
            && self.load(catalog, index) == Transition::None
        {
            return Transition::None;
        }

        self.ensure_analysis();

        match self.output.play() {
            Ok(()) => {
                self.status = PlayerStatus::Playing;
                Transition::Started(index)
            }
            Err(e) => {
                warn!(index, error = %e, "playback failed to start");
                Transition::None
            }
        }
    }

    /// Idempotent.
    pub fn pause(&mut self) -> Transition {
        if self.status != PlayerStatus::Playing {
            return Transition::None;
        }
        self.output.pause();
        self.status = PlayerStatus::Paused;
        Transition::Paused
    }

    pub fn toggle_play_pause(&mut self, catalog: &Catalog) -> Transition {
        if catalog.is_empty() {
            return Transition::None;
        }
        if self.is_playing() {
            self.pause()
        } else {
            self.play(catalog)
        }
    }

    pub fn next(&mut self, catalog: &Catalog) -> Transition {
        let len = catalog.len();
        if len == 0 {
            return Transition::None;
        }
        let current = self.index.unwrap_or(0).min(len - 1);

        if self.shuffle {
            let target = pick_shuffled(current, len, &mut self.rng);
            return self.jump(catalog, target);
        }

        if current + 1 < len {
            self.jump(catalog, current + 1)
        } else if self.repeat == RepeatMode::All {
            self.jump(catalog, 0)
        } else {
            self.stop_at_end()
        }
    }

    pub fn previous(&mut self, catalog: &Catalog) -> Transition {
        let len = catalog.len();
        if len == 0 {
            return Transition::None;
        }

        if self.status != PlayerStatus::Stopped && self.position() >= self.restart_threshold {
            if let Err(e) = self.output.seek(Duration::ZERO) {
                warn!(error = %e, "restart failed");
            }
            return Transition::None;
        }

        let current = self.index.unwrap_or(0).min(len - 1);
        let target = if current == 0 { len - 1 } else { current - 1 };
        self.jump(catalog, target)
    }

    /// Poll for the natural end of the current track and apply the repeat
    /// policy. Called from the event loop on every tick.
    pub fn tick(&mut self, catalog: &Catalog) -> Transition {
        if self.status != PlayerStatus::Playing || !self.output.ended() {
            return Transition::None;
        }
        match (self.repeat, self.index) {
            (RepeatMode::One, Some(i)) => self.jump(catalog, i),
            _ => self.next(catalog),
        }
    }

    /// Seek to `fraction` of the track length. No-op when the length is unknown.
    pub fn seek_fraction(&mut self, catalog: &Catalog, fraction: f64) {
        let Some(duration) = self.duration(catalog) else {
            return;
        };
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        self.seek_to(catalog, duration.mul_f64(fraction));
    }

    /// Seek relative to the current position, clamped to the track.
    pub fn seek_by(&mut self, catalog: &Catalog, delta_secs: i64) {
        let pos = self.position();
        let target = if delta_secs < 0 {
            pos.saturating_sub(Duration::from_secs(delta_secs.unsigned_abs()))
        } else {
            pos + Duration::from_secs(delta_secs as u64)
        };
        self.seek_to(catalog, target);
    }

    fn seek_to(&mut self, catalog: &Catalog, target: Duration) {
        if matches!(self.status, PlayerStatus::Stopped) {
            return;
        }
        let Some(duration) = self.duration(catalog) else {
            return;
        };
        if let Err(e) = self.output.seek(target.min(duration)) {
            warn!(error = %e, "seek failed");
        }
    }

    /// Load and start `index`. If the load succeeds but the start fails the
    /// new track stays loaded, so report that instead of `None`.
    fn jump(&mut self, catalog: &Catalog, index: usize) -> Transition {
        let loaded = self.load(catalog, index);
        if loaded == Transition::None {
            return Transition::None;
        }
        match self.play(catalog) {
            Transition::None => loaded,
            started => started,
        }
    }

    fn stop_at_end(&mut self) -> Transition {
        self.output.stop();
        self.status = PlayerStatus::Stopped;
        info!("reached end of playlist");
        Transition::Stopped
    }

    fn ensure_analysis(&mut self) {
        if !matches!(self.analysis, Analysis::Pending(_)) {
            return;
        }
        let Analysis::Pending(tap) = std::mem::replace(&mut self.analysis, Analysis::Disabled) else {
            return;
        };
        match self.output.attach_tap(tap) {
            Ok(()) => {
                info!("analysis tap attached");
                self.analysis = Analysis::Ready;
            }
            Err(e) => warn!(error = %e, "visualizer disabled for this session"),
        }
    }
}
