use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, InputMode};
use crate::config;
use crate::library::ImportEvent;
use crate::runtime::input::parse_dropped_paths;
use crate::ui;

/// Longest the loop blocks on input when no frame is due.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Main terminal event loop: applies import results, advances playback and
/// the visualizer, redraws on request and dispatches input. Returns `Ok(())`
/// when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    import_tx: &mpsc::Sender<ImportEvent>,
    import_rx: &mpsc::Receiver<ImportEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = import_rx.try_recv() {
            app.apply_import_event(ev);
        }

        app.tick(Instant::now());

        if app.take_redraw() {
            terminal.draw(|f| ui::draw(f, app, settings))?;
        }

        let timeout = app.visualizer.poll_timeout(Instant::now(), IDLE_POLL);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(key, app, import_tx)? {
                        break;
                    }
                }
                Event::Paste(text) => handle_paste(&text, app, import_tx),
                Event::Resize(..) => app.request_redraw(),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Pasted text is a drag-and-drop unless a prompt is open.
pub(crate) fn handle_paste(text: &str, app: &mut App, tx: &mpsc::Sender<ImportEvent>) {
    match app.input {
        InputMode::OpenPath => {
            app.path_input.push_str(text.trim_end_matches(['\r', '\n']));
            app.request_redraw();
        }
        InputMode::Search => {
            for c in text.chars().filter(|c| !c.is_control()) {
                app.push_search_char(c);
            }
        }
        InputMode::Normal => {
            let paths = parse_dropped_paths(text);
            if paths.is_empty() {
                app.set_status("nothing to import in pasted text");
            } else {
                app.import_paths(paths, tx);
            }
        }
    }
}

pub(crate) fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    tx: &mpsc::Sender<ImportEvent>,
) -> Result<bool, Box<dyn std::error::Error>> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(true);
    }

    match app.input {
        InputMode::Search => {
            match key.code {
                KeyCode::Esc => app.clear_search(),
                KeyCode::Backspace => app.pop_search_char(),
                KeyCode::Enter => {
                    app.cancel_input();
                    app.activate_selected();
                }
                KeyCode::Down => app.select_next(),
                KeyCode::Up => app.select_prev(),
                KeyCode::Char('j' | 'n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.select_next()
                }
                KeyCode::Char('k' | 'p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.select_prev()
                }
                KeyCode::Char(c) if !c.is_control() => app.push_search_char(c),
                _ => {}
            }
            return Ok(false);
        }
        InputMode::OpenPath => {
            match key.code {
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Backspace => {
                    app.path_input.pop();
                    app.request_redraw();
                }
                KeyCode::Enter => {
                    let paths = parse_dropped_paths(&app.path_input);
                    app.cancel_input();
                    if paths.is_empty() {
                        app.set_status("no path given");
                    } else {
                        app.import_paths(paths, tx);
                    }
                }
                KeyCode::Char(c) if !c.is_control() => {
                    app.path_input.push(c);
                    app.request_redraw();
                }
                _ => {}
            }
            return Ok(false);
        }
        InputMode::Normal => {}
    }

    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char(' ') | KeyCode::Char('p') => app.toggle_play_pause(),
        KeyCode::Char('l') => app.next(),
        KeyCode::Char('h') => app.previous(),
        KeyCode::Right => app.seek_by_step(true),
        KeyCode::Left => app.seek_by_step(false),
        KeyCode::Char(d @ '0'..='9') => {
            let tenth = d.to_digit(10).unwrap_or(0);
            app.seek_fraction(f64::from(tenth) / 10.0);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => app.step_volume(true),
        KeyCode::Char('-') => app.step_volume(false),
        KeyCode::Char('s') => app.toggle_shuffle(),
        KeyCode::Char('r') => app.cycle_repeat_mode(),
        KeyCode::Tab => app.next_tab(),
        KeyCode::BackTab => app.prev_tab(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter => app.activate_selected(),
        KeyCode::Char('/') => app.begin_search(),
        KeyCode::Char('o') => app.begin_open_path(),
        KeyCode::Esc => {
            if !app.search_query.is_empty() {
                app.clear_search();
            }
        }
        _ => {}
    }

    Ok(false)
}
