use std::time::Duration;

use crate::library::AudioRef;

use super::tap::SampleTap;
use super::types::AudioError;

/// The single media element the controller drives.
pub trait MediaOutput {
    /// Bind `source`, parked paused at position zero. Returns the duration
    /// when the decoder knows it up front.
    fn load(&mut self, source: &AudioRef) -> Result<Option<Duration>, AudioError>;

    fn play(&mut self) -> Result<(), AudioError>;

    fn pause(&mut self);

    /// Unbind the current source.
    fn stop(&mut self);

    fn position(&self) -> Duration;

    fn seek(&mut self, position: Duration) -> Result<(), AudioError>;

    fn set_volume(&mut self, volume: f32);

    /// The bound source has played to its end.
    fn ended(&self) -> bool;

    /// Route played samples into `tap`. Allowed once per output; a second
    /// call fails with [`AudioError::TapAlreadyAttached`].
    fn attach_tap(&mut self, tap: SampleTap) -> Result<(), AudioError>;
}
