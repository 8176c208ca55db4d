use std::env;
use std::path::PathBuf;
use std::sync::mpsc;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::library::ImportEvent;
use crate::logging;

mod event_loop;
mod input;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();
    let data_dir = startup::data_dir(&settings);

    if let Err(e) = logging::init(&data_dir) {
        // Nothing is drawn yet, so stderr is still ours.
        eprintln!("flowmusic: logging disabled: {e}");
    }
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }

    let mut app = startup::open_session(&settings, &data_dir);

    let (import_tx, import_rx) = mpsc::channel::<ImportEvent>();
    let args: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    startup::apply_startup_inputs(&mut app, &args, &import_tx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        event_loop::run(&mut terminal, &settings, &mut app, &import_tx, &import_rx)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("FlowMusic exiting");
    run_result
}

#[cfg(test)]
mod tests;
