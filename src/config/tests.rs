use super::load::{default_config_path, default_data_dir, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_flowmusic_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("FLOWMUSIC_CONFIG_PATH", "/tmp/flowmusic-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/flowmusic-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("flowmusic")
            .join("config.toml")
    );
}

#[test]
fn default_data_dir_falls_back_to_home_local_share() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_DATA_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_data_dir().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/share/flowmusic")
    );
}

#[test]
fn storage_data_dir_override_wins() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_DATA_HOME", "/tmp/xdg-data");

    let mut s = Settings::default();
    assert_eq!(
        s.data_dir().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-data/flowmusic")
    );

    s.storage.data_dir = Some("/srv/music-data".into());
    assert_eq!(s.data_dir().unwrap(), std::path::PathBuf::from("/srv/music-data"));
}

#[test]
fn settings_load_from_config_file_and_parse_repeat_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
shuffle = true
repeat = "repeat-one"
restart_threshold_secs = 4
seek_step_secs = 10
volume_step = 0.1

[library]
extensions = ["mp3"]
include_hidden = true
max_depth = 2

[visualizer]
enabled = false
fft_size = 512
fps = 24

[ui]
header_text = "hello"
recents_columns = 2
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("FLOWMUSIC_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("FLOWMUSIC__VISUALIZER__FPS");

    let s = Settings::load().unwrap();
    assert!(s.playback.shuffle);
    assert_eq!(s.playback.repeat, RepeatSetting::One);
    assert_eq!(s.playback.restart_threshold_secs, 4);
    assert_eq!(s.playback.seek_step_secs, 10);
    assert!((s.playback.volume_step - 0.1).abs() < f32::EPSILON);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(s.library.include_hidden);
    assert_eq!(s.library.max_depth, Some(2));
    assert!(!s.visualizer.enabled);
    assert_eq!(s.visualizer.fft_size, 512);
    assert_eq!(s.visualizer.fps, 24);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.recents_columns, 2);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[visualizer]
fps = 30
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("FLOWMUSIC_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("FLOWMUSIC__VISUALIZER__FPS", "12");

    let s = Settings::load().unwrap();
    assert_eq!(s.visualizer.fps, 12);
}

#[test]
fn validate_rejects_bad_fft_size_and_fps() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.visualizer.fft_size = 300;
    assert!(s.validate().is_err());

    s.visualizer.fft_size = 256;
    s.visualizer.fps = 0;
    assert!(s.validate().is_err());

    s.visualizer.fps = 30;
    s.playback.volume_step = 0.0;
    assert!(s.validate().is_err());

    s.playback.volume_step = 0.05;
    s.playback.seek_step_secs = 0;
    assert!(s.validate().is_err());
}

#[test]
fn validate_rejects_empty_extension_list() {
    let mut s = Settings::default();
    s.library.extensions.clear();
    assert!(s.validate().is_err());

    s.library.extensions = vec![" ".to_string()];
    assert!(s.validate().is_err());

    s.library.extensions = vec!["mp3".to_string()];
    assert!(s.validate().is_ok());
}
