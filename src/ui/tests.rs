use std::time::Duration;

use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
use tempfile::tempdir;

use super::spectrum::columns;
use super::*;
use crate::audio::fake::FakeOutput;
use crate::library::{AudioRef, ImportEvent, Track};
use crate::store::{BlobStore, SettingsStore};

fn buffer_text(buf: &Buffer) -> String {
    buf.content.iter().map(|c| c.symbol()).collect()
}

fn render(app: &App, settings: &Settings) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    terminal.draw(|f| draw(f, app, settings)).unwrap();
    buffer_text(terminal.backend().buffer())
}

fn app_with(names: &[&str]) -> (tempfile::TempDir, App) {
    let dir = tempdir().unwrap();
    let (out, _) = FakeOutput::boxed();
    let mut app = App::restore(
        &Settings::default(),
        SettingsStore::open(dir.path().join("settings.json")),
        BlobStore::new(dir.path().join("blobs")),
        out,
    );
    for (i, name) in names.iter().enumerate() {
        app.apply_import_event(ImportEvent::Imported {
            track: Track {
                id: format!("t{i}"),
                name: name.to_string(),
                duration: Some(Duration::from_secs(61)),
                audio_ref: Some(AudioRef::new(format!("/tmp/t{i}.bin"))),
            },
            persisted: true,
        });
    }
    (dir, app)
}

#[test]
fn format_mmss_pads_minutes_and_seconds() {
    assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
    assert_eq!(format_mmss(Duration::from_secs(125)), "02:05");
    assert_eq!(format_opt(None), "--:--");
}

#[test]
fn controls_mention_the_configured_seek_step() {
    let text = controls_text(7);
    assert!(text.contains("[←/→] seek -/+7s"));
    assert!(text.starts_with("[space] play/pause"));
    assert!(text.ends_with("[q] quit"));
}

#[test]
fn spectrum_columns_average_or_stretch_bins() {
    assert_eq!(columns(&[1.0, 0.0, 1.0, 0.0], 2), vec![0.5, 0.5]);
    assert_eq!(columns(&[0.25], 3), vec![0.25, 0.25, 0.25]);
    assert_eq!(columns(&[], 2), vec![0.0, 0.0]);
    assert!(columns(&[0.5; 128], 0).is_empty());
}

#[test]
fn empty_playlist_shows_placeholder() {
    let (_dir, mut app) = app_with(&[]);
    app.set_tab(Tab::Playlist);
    let screen = render(&app, &Settings::default());
    assert!(screen.contains("No tracks yet."));
}

#[test]
fn playlist_lists_tracks_with_durations() {
    let (_dir, mut app) = app_with(&["first light", "second wind"]);
    app.set_tab(Tab::Playlist);
    let screen = render(&app, &Settings::default());
    assert!(screen.contains("first light"));
    assert!(screen.contains("second wind"));
    assert!(screen.contains("01:01"));
}

#[test]
fn home_shows_recents_placeholder_and_recommendations() {
    let (_dir, app) = app_with(&[]);
    let screen = render(&app, &Settings::default());
    assert!(screen.contains("Nothing played yet."));
    assert!(screen.contains(RECOMMENDATIONS[0].0));
}

#[test]
fn home_shows_recent_cards_after_playing() {
    let (_dir, mut app) = app_with(&["dawn chorus"]);
    app.toggle_play_pause();
    app.set_tab(Tab::Home);
    let screen = render(&app, &Settings::default());
    assert!(!screen.contains("Nothing played yet."));
    assert!(screen.contains("dawn chorus"));
}

#[test]
fn search_without_matches_shows_placeholder() {
    let (_dir, mut app) = app_with(&["alpha"]);
    app.begin_search();
    for c in "zzz".chars() {
        app.push_search_char(c);
    }
    let screen = render(&app, &Settings::default());
    assert!(screen.contains("No tracks match \"zzz\"."));
}

#[test]
fn open_prompt_is_drawn_over_the_content() {
    let (_dir, mut app) = app_with(&[]);
    app.begin_open_path();
    app.path_input.push_str("/music/album");
    let screen = render(&app, &Settings::default());
    assert!(screen.contains("/music/album"));
}
