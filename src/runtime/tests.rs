use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::tempdir;

use super::event_loop::{handle_key_event, handle_paste};
use super::input::parse_dropped_paths;
use super::startup::apply_startup_inputs;
use crate::app::{App, InputMode, Tab};
use crate::audio::fake::{FakeOutput, FakeState};
use crate::config::Settings;
use crate::library::{AudioRef, ImportEvent, Track};
use crate::store::{BlobStore, SettingsStore};

fn app(dir: &Path) -> (App, Rc<RefCell<FakeState>>) {
    let (out, fake) = FakeOutput::boxed();
    let app = App::restore(
        &Settings::default(),
        SettingsStore::open(dir.join("settings.json")),
        BlobStore::new(dir.join("library")),
        out,
    );
    (app, fake)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn press(app: &mut App, tx: &mpsc::Sender<ImportEvent>, code: KeyCode) -> bool {
    handle_key_event(key(code), app, tx).unwrap()
}

#[test]
fn plain_paths_split_on_whitespace() {
    assert_eq!(
        parse_dropped_paths("/a/b.mp3 /c/d.flac"),
        vec![PathBuf::from("/a/b.mp3"), PathBuf::from("/c/d.flac")]
    );
}

#[test]
fn quoted_and_escaped_paths_keep_their_spaces() {
    assert_eq!(
        parse_dropped_paths("'/music/my song.mp3' \"/music/other one.ogg\""),
        vec![
            PathBuf::from("/music/my song.mp3"),
            PathBuf::from("/music/other one.ogg")
        ]
    );
    assert_eq!(
        parse_dropped_paths(r"/music/my\ song.mp3"),
        vec![PathBuf::from("/music/my song.mp3")]
    );
}

#[test]
fn file_uris_are_decoded() {
    assert_eq!(
        parse_dropped_paths("file:///music/my%20song.mp3"),
        vec![PathBuf::from("/music/my song.mp3")]
    );
    assert_eq!(
        parse_dropped_paths("file://localhost/x.mp3"),
        vec![PathBuf::from("/x.mp3")]
    );
    assert_eq!(
        parse_dropped_paths("file:///bad%zz.mp3"),
        vec![PathBuf::from("/bad%zz.mp3")]
    );
}

#[test]
fn one_path_per_line_and_blank_lines_are_skipped() {
    assert_eq!(
        parse_dropped_paths("\n/a.mp3\r\n\n/b.mp3\n"),
        vec![PathBuf::from("/a.mp3"), PathBuf::from("/b.mp3")]
    );
    assert!(parse_dropped_paths("   \n").is_empty());
}

#[test]
fn existing_path_with_raw_spaces_is_kept_whole() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("my song.mp3");
    fs::write(&file, b"x").unwrap();
    let text = file.to_string_lossy().into_owned();
    assert_eq!(parse_dropped_paths(&text), vec![file]);
}

#[test]
fn quit_keys_end_the_loop() {
    let dir = tempdir().unwrap();
    let (mut app, _) = app(dir.path());
    let (tx, _rx) = mpsc::channel();

    assert!(!press(&mut app, &tx, KeyCode::Char('x')));
    assert!(press(&mut app, &tx, KeyCode::Char('q')));
    assert!(
        handle_key_event(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut app,
            &tx
        )
        .unwrap()
    );
}

#[test]
fn search_mode_captures_typing_until_escape() {
    let dir = tempdir().unwrap();
    let (mut app, _) = app(dir.path());
    let (tx, _rx) = mpsc::channel();

    press(&mut app, &tx, KeyCode::Char('/'));
    assert_eq!(app.input, InputMode::Search);
    assert_eq!(app.tab, Tab::Search);

    // 'q' is text here, not quit.
    assert!(!press(&mut app, &tx, KeyCode::Char('q')));
    press(&mut app, &tx, KeyCode::Char('u'));
    press(&mut app, &tx, KeyCode::Backspace);
    assert_eq!(app.search_query, "q");

    press(&mut app, &tx, KeyCode::Esc);
    assert_eq!(app.input, InputMode::Normal);
    assert!(app.search_query.is_empty());
}

#[test]
fn playback_keys_drive_the_controller() {
    let dir = tempdir().unwrap();
    let (mut app, fake) = app(dir.path());
    let (tx, _rx) = mpsc::channel();
    app.apply_import_event(ImportEvent::Imported {
        track: Track {
            id: "a".into(),
            name: "tune".into(),
            duration: Some(Duration::from_secs(100)),
            audio_ref: Some(AudioRef::new("/tmp/a.bin")),
        },
        persisted: true,
    });

    press(&mut app, &tx, KeyCode::Char(' '));
    assert!(app.player.is_playing());

    press(&mut app, &tx, KeyCode::Char('5'));
    assert_eq!(fake.borrow().position, Duration::from_secs(50));
    press(&mut app, &tx, KeyCode::Right);
    assert_eq!(fake.borrow().position, Duration::from_secs(55));

    press(&mut app, &tx, KeyCode::Char('-'));
    assert!((app.player.volume() - 0.95).abs() < 1e-6);

    press(&mut app, &tx, KeyCode::Char('s'));
    assert!(app.player.shuffle());
    press(&mut app, &tx, KeyCode::Char('r'));
    assert_eq!(app.player.repeat().label(), "all");

    press(&mut app, &tx, KeyCode::Char('p'));
    assert!(!app.player.is_playing());
}

#[test]
fn open_prompt_imports_on_enter() {
    let dir = tempdir().unwrap();
    let (mut app, _) = app(dir.path());
    let (tx, rx) = mpsc::channel();
    let song = dir.path().join("a.mp3");
    fs::write(&song, b"x").unwrap();

    press(&mut app, &tx, KeyCode::Char('o'));
    assert_eq!(app.input, InputMode::OpenPath);
    handle_paste(&song.to_string_lossy(), &mut app, &tx);
    press(&mut app, &tx, KeyCode::Enter);

    assert_eq!(app.input, InputMode::Normal);
    assert_eq!(app.pending_batches, 1);
    loop {
        let ev = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        let done = matches!(ev, ImportEvent::BatchDone { .. });
        app.apply_import_event(ev);
        if done {
            break;
        }
    }
    assert_eq!(app.catalog.len(), 1);
}

#[test]
fn empty_prompt_reports_instead_of_importing() {
    let dir = tempdir().unwrap();
    let (mut app, _) = app(dir.path());
    let (tx, _rx) = mpsc::channel();

    press(&mut app, &tx, KeyCode::Char('o'));
    press(&mut app, &tx, KeyCode::Enter);
    assert_eq!(app.pending_batches, 0);
    assert_eq!(app.status.as_deref(), Some("no path given"));
}

#[test]
fn paste_in_normal_mode_is_a_drop() {
    let dir = tempdir().unwrap();
    let (mut app, _) = app(dir.path());
    let (tx, _rx) = mpsc::channel();

    handle_paste("   ", &mut app, &tx);
    assert_eq!(app.pending_batches, 0);
    assert!(app.status.is_some());

    handle_paste("'/nowhere/a b.mp3'", &mut app, &tx);
    assert_eq!(app.pending_batches, 1);
}

#[test]
fn startup_imports_arguments_and_activates_the_first() {
    let dir = tempdir().unwrap();
    let (mut app, fake) = app(dir.path());
    let (tx, _rx) = mpsc::channel();

    let music = dir.path().join("music");
    fs::create_dir_all(&music).unwrap();
    fs::write(music.join("b.flac"), b"x").unwrap();
    fs::write(music.join("a.mp3"), b"x").unwrap();
    fs::write(music.join("cover.jpg"), b"x").unwrap();

    apply_startup_inputs(&mut app, &[music], &tx);

    let names: Vec<&str> = app.catalog.all().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(app.player.current_index(), Some(0));
    assert!(!fake.borrow().playing);
}
