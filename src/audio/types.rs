//! Audio-related small types.
//!
//! This module defines the repeat policy, the player status and the
//! transitions reported back to the caller after each controller operation.

use std::path::PathBuf;

use crate::config::RepeatSetting;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RepeatMode {
    /// Stop after the last track.
    #[default]
    Off,
    /// Wrap around to the first track.
    All,
    /// Repeat the current track when it ends.
    One,
}

impl RepeatMode {
    /// `Off -> All -> One -> Off`.
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }
}

impl From<RepeatSetting> for RepeatMode {
    fn from(s: RepeatSetting) -> Self {
        match s {
            RepeatSetting::Off => Self::Off,
            RepeatSetting::All => Self::All,
            RepeatSetting::One => Self::One,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlayerStatus {
    #[default]
    Stopped,
    Loaded,
    Playing,
    Paused,
}

/// What an operation changed, so the caller can update recents, the
/// visualizer loop and the view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    None,
    Loaded(usize),
    Started(usize),
    Paused,
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: rodio::decoder::DecoderError,
    },
    #[error("No audio output device: {0}")]
    Device(String),
    #[error("Nothing loaded")]
    NothingLoaded,
    #[error("Analysis tap already attached")]
    TapAlreadyAttached,
}
