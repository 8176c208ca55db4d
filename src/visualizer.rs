//! Spectrum visualizer: an FFT over tapped samples, refreshed on a frame
//! clock that only runs while playback does.
//!
//! The clock is a single optional deadline polled by the event loop. Starting
//! it replaces any pending deadline and stopping clears it, so repeated
//! play/pause cycles never stack frames.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::audio::SampleTap;
use crate::config::VisualizerSettings;

mod analyser;

pub use analyser::FrequencyAnalyser;

pub struct Visualizer {
    enabled: bool,
    interval: Duration,
    next_frame: Option<Instant>,
    analyser: FrequencyAnalyser,
    tap: SampleTap,
    bins: Vec<f32>,
}

impl Visualizer {
    pub fn new(settings: &VisualizerSettings, tap: SampleTap) -> Self {
        let analyser = FrequencyAnalyser::new(settings.fft_size);
        let bins = vec![0.0; analyser.bin_count()];
        Self {
            enabled: settings.enabled,
            interval: Duration::from_secs(1) / settings.fps.max(1),
            next_frame: None,
            analyser,
            tap,
            bins,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Turn the visualizer off for the rest of the session.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.stop();
    }

    pub fn is_running(&self) -> bool {
        self.next_frame.is_some()
    }

    /// Latest snapshot, one value per bin in `[0, 1]`.
    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    /// (Re)start the frame clock. Any pending frame is dropped first.
    pub fn start(&mut self, now: Instant) {
        self.next_frame = None;
        if !self.enabled {
            return;
        }
        self.next_frame = Some(now);
        debug!("visualizer started");
    }

    /// Stop the clock and let the bars fall back to zero.
    pub fn stop(&mut self) {
        if self.next_frame.take().is_some() {
            debug!("visualizer stopped");
        }
        self.bins.iter_mut().for_each(|b| *b = 0.0);
        self.analyser.reset();
    }

    /// Pull a fresh snapshot if a frame is due. Returns whether the bins changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.next_frame {
            Some(due) if now >= due => {
                self.bins = self.analyser.snapshot(&self.tap);
                // Schedule from `now` so a stalled loop doesn't burst frames.
                self.next_frame = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// How long the event loop may block before the next frame is due.
    pub fn poll_timeout(&self, now: Instant, idle: Duration) -> Duration {
        match self.next_frame {
            Some(due) => due.saturating_duration_since(now).min(idle),
            None => idle,
        }
    }
}
