use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::audio::SampleTap;

// Decibel window mapped onto [0, 1].
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;
// Weight of the previous frame when smoothing bins over time.
const SMOOTHING: f32 = 0.8;

/// Turns the most recent tapped samples into `fft_size / 2` normalized bins.
pub struct FrequencyAnalyser {
    fft: Arc<dyn Fft<f32>>,
    size: usize,
    window: Vec<f32>,
    smoothed: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl FrequencyAnalyser {
    /// `fft_size` must be a power of two; the config layer enforces it.
    pub fn new(fft_size: usize) -> Self {
        let size = fft_size.max(2);
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(size);

        // Hann window.
        let window = (0..size)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size as f32 - 1.0)).cos())
            })
            .collect();

        Self {
            fft,
            size,
            window,
            smoothed: vec![0.0; size / 2],
            scratch: vec![Complex::new(0.0, 0.0); size],
        }
    }

    pub fn bin_count(&self) -> usize {
        self.size / 2
    }

    /// Snapshot of the tap. Silence (or an empty tap) yields all zeros.
    pub fn snapshot(&mut self, tap: &SampleTap) -> Vec<f32> {
        let mono = tap.mono_frames(self.size);
        self.analyse(&mono)
    }

    /// Analyse the trailing `fft_size` samples of `mono`, zero-padding on
    /// the left when fewer are available.
    pub fn analyse(&mut self, mono: &[f32]) -> Vec<f32> {
        let take = mono.len().min(self.size);
        let pad = self.size - take;
        let tail = &mono[mono.len() - take..];

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { tail[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let scale = self.size as f32;
        self.smoothed
            .iter_mut()
            .zip(&self.scratch)
            .map(|(prev, c)| {
                let magnitude = c.norm() / scale;
                *prev = SMOOTHING * *prev + (1.0 - SMOOTHING) * magnitude;
                to_unit(*prev)
            })
            .collect()
    }

    /// Forget the smoothing history, e.g. when a different track starts.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
    }
}

fn to_unit(magnitude: f32) -> f32 {
    if magnitude <= 0.0 || !magnitude.is_finite() {
        return 0.0;
    }
    let db = 20.0 * magnitude.log10();
    ((db - MIN_DB) / (MAX_DB - MIN_DB)).clamp(0.0, 1.0)
}
