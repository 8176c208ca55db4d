//! Sample tap: a `Source` wrapper that copies what is being played into a
//! shared ring buffer for the visualizer.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::Source;

const TAP_CAPACITY: usize = 8192;

/// Shared handle to the most recent interleaved samples.
#[derive(Debug, Clone)]
pub struct SampleTap {
    samples: Arc<Mutex<VecDeque<f32>>>,
    channels: Arc<AtomicU16>,
}

impl Default for SampleTap {
    fn default() -> Self {
        Self {
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(TAP_CAPACITY))),
            channels: Arc::new(AtomicU16::new(1)),
        }
    }
}

impl SampleTap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Audio thread side. Drops the sample rather than block the mixer.
    fn push(&self, sample: f32) {
        if let Ok(mut buf) = self.samples.try_lock() {
            if buf.len() >= TAP_CAPACITY {
                buf.pop_front();
            }
            buf.push_back(sample);
        }
    }

    fn set_channels(&self, channels: u16) {
        self.channels.store(channels.max(1), Ordering::Relaxed);
    }

    /// The last `frames` frames mixed down to mono, oldest first.
    pub fn mono_frames(&self, frames: usize) -> Vec<f32> {
        let ch = self.channels.load(Ordering::Relaxed).max(1) as usize;
        let Ok(buf) = self.samples.lock() else {
            return Vec::new();
        };

        let available = buf.len() / ch;
        let take = frames.min(available);
        let start = buf.len() - take * ch;

        let mut mono = Vec::with_capacity(take);
        let mut acc = 0.0f32;
        for (i, s) in buf.iter().skip(start).enumerate() {
            acc += *s;
            if (i + 1) % ch == 0 {
                mono.push(acc / ch as f32);
                acc = 0.0;
            }
        }
        mono
    }

    pub fn clear(&self) {
        if let Ok(mut buf) = self.samples.lock() {
            buf.clear();
        }
    }

    #[cfg(test)]
    pub(crate) fn feed(&self, channels: u16, samples: &[f32]) {
        self.set_channels(channels);
        for s in samples {
            self.push(*s);
        }
    }
}

/// Passes samples through unchanged while recording them into a [`SampleTap`].
pub(super) struct TappedSource<S> {
    inner: S,
    tap: SampleTap,
}

impl<S> TappedSource<S>
where
    S: Source<Item = f32>,
{
    pub(super) fn new(inner: S, tap: SampleTap) -> Self {
        tap.set_channels(inner.channels());
        Self { inner, tap }
    }
}

impl<S> Iterator for TappedSource<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.inner.next()?;
        self.tap.push(sample);
        Some(sample)
    }
}

impl<S> Source for TappedSource<S>
where
    S: Source<Item = f32>,
{
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), rodio::source::SeekError> {
        self.inner.try_seek(pos)
    }
}
