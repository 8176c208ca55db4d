use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/flowmusic/config.toml` or `~/.config/flowmusic/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `FLOWMUSIC__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub playback: PlaybackSettings,
    pub library: LibrarySettings,
    pub storage: StorageSettings,
    pub visualizer: VisualizerSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Repeat mode used at startup.
    pub repeat: RepeatSetting,
    /// `previous` restarts the current track once more than this many seconds have elapsed.
    pub restart_threshold_secs: u64,
    /// Number of seconds to scrub with the arrow keys.
    pub seek_step_secs: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            repeat: RepeatSetting::Off,
            restart_threshold_secs: 3,
            seek_step_secs: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatSetting {
    #[serde(alias = "no-loop", alias = "no_loop", alias = "none")]
    Off,
    #[serde(alias = "loop-all", alias = "loop_all", alias = "loopall")]
    All,
    #[serde(
        alias = "loop-one",
        alias = "loop_one",
        alias = "repeat-one",
        alias = "single"
    )]
    One,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions accepted on import (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether dotfiles are imported when a directory is dropped.
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth for dropped folders.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: ["mp3", "flac", "wav", "ogg", "m4a", "aac", "opus"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            include_hidden: false,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Where the library, settings and log live. Defaults to the XDG data dir.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisualizerSettings {
    pub enabled: bool,
    /// FFT window length; must be a power of two. Yields `fft_size / 2` bins.
    pub fft_size: usize,
    /// Redraw rate while playing.
    pub fps: u32,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            fft_size: 256,
            fps: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Number of cards per row in the recents grid.
    pub recents_columns: u16,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ go with the flow ~ ".to_string(),
            recents_columns: 4,
        }
    }
}
