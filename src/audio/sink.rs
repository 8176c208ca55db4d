//! `rodio`-backed [`MediaOutput`].
//!
//! The output device is opened on the first load, not at startup, so a
//! machine without audio still gets a working library view.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, info};

use crate::library::AudioRef;

use super::output::MediaOutput;
use super::tap::{SampleTap, TappedSource};
use super::types::AudioError;

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
    tap: Option<&SampleTap>,
) -> Result<(Sink, Option<Duration>), AudioError> {
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|source| AudioError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let total = decoder.total_duration();
    // `skip_duration` is the fallback seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    match tap {
        Some(tap) => sink.append(TappedSource::new(source, tap.clone())),
        None => sink.append(source),
    }
    Ok((sink, total))
}

#[derive(Default)]
pub struct RodioOutput {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    source: Option<AudioRef>,
    tap: Option<SampleTap>,
    volume: f32,
    // Added to the sink position after a rebuild-style seek.
    offset: Duration,
}

impl RodioOutput {
    pub fn new(volume: f32) -> Self {
        Self {
            volume,
            ..Self::default()
        }
    }

    fn stream(&mut self) -> Result<&OutputStream, AudioError> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| AudioError::Device(e.to_string()))?;
            // rodio logs to stderr when the stream is dropped, which would
            // scribble over the terminal UI.
            stream.log_on_drop(false);
            info!("audio output opened");
            self.stream = Some(stream);
        }
        self.stream.as_ref().ok_or(AudioError::NothingLoaded)
    }

    fn rebuild_at(&mut self, position: Duration) -> Result<(), AudioError> {
        let Some(source) = self.source.clone() else {
            return Err(AudioError::NothingLoaded);
        };
        let was_paused = self.sink.as_ref().map(Sink::is_paused).unwrap_or(true);
        let tap = self.tap.clone();
        let stream = self.stream()?;
        let (sink, _) = create_sink_at(stream, source.path(), position, tap.as_ref())?;

        sink.set_volume(self.volume);
        if !was_paused {
            sink.play();
        }
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.offset = position;
        Ok(())
    }
}

impl MediaOutput for RodioOutput {
    fn load(&mut self, source: &AudioRef) -> Result<Option<Duration>, AudioError> {
        let tap = self.tap.clone();
        let stream = self.stream()?;
        let (sink, total) = create_sink_at(stream, source.path(), Duration::ZERO, tap.as_ref())?;
        sink.set_volume(self.volume);

        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        if let Some(tap) = &self.tap {
            tap.clear();
        }
        self.source = Some(source.clone());
        self.offset = Duration::ZERO;
        debug!(path = %source.path().display(), ?total, "source loaded");
        Ok(total)
    }

    fn play(&mut self) -> Result<(), AudioError> {
        let sink = self.sink.as_ref().ok_or(AudioError::NothingLoaded)?;
        sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.source = None;
        self.offset = Duration::ZERO;
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map(|s| self.offset + s.get_pos())
            .unwrap_or(Duration::ZERO)
    }

    fn seek(&mut self, position: Duration) -> Result<(), AudioError> {
        let sink = self.sink.as_ref().ok_or(AudioError::NothingLoaded)?;
        if sink.empty() {
            // Source already drained; decode again from the requested spot.
            return self.rebuild_at(position);
        }
        match sink.try_seek(position) {
            Ok(()) => {
                self.offset = Duration::ZERO;
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "native seek unsupported, rebuilding sink");
                self.rebuild_at(position)
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }

    fn ended(&self) -> bool {
        self.sink.as_ref().map(Sink::empty).unwrap_or(false)
    }

    fn attach_tap(&mut self, tap: SampleTap) -> Result<(), AudioError> {
        if self.tap.is_some() {
            return Err(AudioError::TapAlreadyAttached);
        }
        // Only sources created from now on are tapped; re-bind the current
        // one so the visualizer sees it immediately.
        self.tap = Some(tap);
        if self.source.is_some() {
            let position = self.position();
            self.rebuild_at(position)?;
        }
        Ok(())
    }
}
