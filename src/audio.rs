//! Playback: the controller state machine, the media output seam and its
//! `rodio` implementation.

mod controller;
mod output;
mod sink;
mod tap;
mod types;

pub use controller::PlaybackController;
pub use output::MediaOutput;
pub use sink::RodioOutput;
pub use tap::SampleTap;
pub use types::{AudioError, PlayerStatus, RepeatMode, Transition};

#[cfg(test)]
pub(crate) mod fake;
