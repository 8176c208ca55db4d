//! UI rendering for the terminal user interface.
//!
//! Every call to [`draw`] rebuilds the whole frame from `App`; nothing here
//! mutates state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Tabs, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, InputMode, RECOMMENDATIONS, Tab};
use crate::audio::PlayerStatus;
use crate::config::Settings;

mod spectrum;

use spectrum::Spectrum;

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("space".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next".to_string());
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("enter".to_string(), "play selected".to_string());
    // ←/→ is filled dynamically from config.
    map.insert("0-9".to_string(), "jump to 0-90%".to_string());
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("s".to_string(), "shuffle".to_string());
    map.insert("r".to_string(), "repeat".to_string());
    map.insert("tab".to_string(), "switch tab".to_string());
    map.insert("/".to_string(), "search".to_string());
    map.insert("o".to_string(), "open files".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_step: u64) -> String {
    let order = [
        "space", "h/l", "←/→", "0-9", "+/-", "j/k", "enter", "s", "r", "tab", "/", "o", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "←/→" {
                Some(format!("[←/→] seek -/+{seek_step}s"))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
pub(crate) fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn format_opt(d: Option<Duration>) -> String {
    d.map(format_mmss).unwrap_or_else(|| "--:--".to_string())
}

fn secs_opt(s: Option<f64>) -> String {
    format_opt(
        s.filter(|s| s.is_finite() && *s >= 0.0)
            .map(Duration::from_secs_f64),
    )
}

fn padded_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

fn placeholder(frame: &mut Frame, area: Rect, title: &str, text: String) {
    let p = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(padded_block(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(p, area);
}

/// Render the entire UI into `frame`.
pub fn draw(frame: &mut Frame, app: &App, settings: &Settings) {
    let vis_height = if app.visualizer.enabled() { 8 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(vis_height),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" flowmusic ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    draw_tabs(frame, app, chunks[1]);

    match app.tab {
        Tab::Home => draw_home(frame, app, settings, chunks[2]),
        Tab::Playlist => draw_playlist(frame, app, chunks[2]),
        Tab::Search => draw_search(frame, app, chunks[2]),
    }

    if app.visualizer.enabled() {
        let spectrum =
            Spectrum::new(app.visualizer.bins()).block(Block::default().borders(Borders::ALL).title(" spectrum "));
        frame.render_widget(spectrum, chunks[3]);
    }

    draw_now_playing(frame, app, chunks[4]);

    let footer = Paragraph::new(controls_text(settings.playback.seek_step_secs))
        .block(padded_block(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);

    if app.input == InputMode::OpenPath {
        draw_path_prompt(frame, app, chunks[2]);
    }
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = Tab::ALL.iter().map(|t| format!(" {} ", t.title()));
    let selected = Tab::ALL.iter().position(|t| *t == app.tab).unwrap_or(0);

    let mut status = String::new();
    if app.pending_batches > 0 {
        status.push_str("importing… ");
    }
    if let Some(msg) = &app.status {
        status.push_str(msg);
    }

    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(Block::default().borders(Borders::ALL).title_bottom(Line::from(status).right_aligned()));
    frame.render_widget(tabs, area);
}

fn draw_home(frame: &mut Frame, app: &App, settings: &Settings, area: Rect) {
    let cols = settings.ui.recents_columns.max(1) as usize;
    let rows = app.recents.entries().len().div_ceil(cols).max(1);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(rows as u16 * 4 + 2), Constraint::Min(3)])
        .split(area);

    if app.recents.is_empty() {
        placeholder(
            frame,
            parts[0],
            " recently played ",
            "Nothing played yet.".to_string(),
        );
    } else {
        let outer = Block::default().borders(Borders::ALL).title(" recently played ");
        let grid = outer.inner(parts[0]);
        frame.render_widget(outer, parts[0]);

        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(4); rows])
            .split(grid);
        for (i, entry) in app.recents.entries().iter().enumerate() {
            let Some(row) = row_areas.get(i / cols) else {
                break;
            };
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
                .split(*row);
            let mut card = Block::default().borders(Borders::ALL);
            if i == app.selected {
                card = card.border_style(Style::default().fg(Color::Cyan));
            }
            let body = Paragraph::new(vec![
                Line::from(entry.name.as_str()).bold(),
                Line::from(secs_opt(entry.duration)).dim(),
            ])
            .block(card);
            frame.render_widget(body, cells[i % cols]);
        }
    }

    let items: Vec<ListItem> = RECOMMENDATIONS
        .iter()
        .map(|(title, artist)| {
            ListItem::new(Line::from(vec![
                Span::raw(*title),
                Span::styled(format!(" · {artist}"), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();
    let list = List::new(items).block(padded_block(" recommended "));
    frame.render_widget(list, parts[1]);
}

/// One playlist row: position, name, duration, and markers for the active
/// and unavailable tracks.
fn track_line(app: &App, index: usize) -> ListItem<'static> {
    let Some(track) = app.catalog.get(index) else {
        return ListItem::new("");
    };
    let active = app.player.current_index() == Some(index);
    let marker = match (active, app.player.status()) {
        (true, PlayerStatus::Playing) => "♪ ",
        (true, _) => "· ",
        _ => "  ",
    };
    let mut spans = vec![
        Span::raw(marker),
        Span::styled(format!("{:>3}. ", index + 1), Style::default().fg(Color::DarkGray)),
        Span::raw(track.name.clone()),
        Span::styled(format!("  {}", format_opt(track.duration)), Style::default().fg(Color::DarkGray)),
    ];
    if !track.is_resolved() {
        spans.push(Span::styled(" (unavailable)", Style::default().fg(Color::Red)));
    }
    let line = Line::from(spans);
    if active {
        ListItem::new(line.bold())
    } else {
        ListItem::new(line)
    }
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect, title: &str, indices: &[usize]) {
    let items: Vec<ListItem> = indices.iter().map(|&i| track_line(app, i)).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !indices.is_empty() {
        state.select(Some(app.selected.min(indices.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_playlist(frame: &mut Frame, app: &App, area: Rect) {
    if app.catalog.is_empty() {
        placeholder(
            frame,
            area,
            " playlist ",
            "No tracks yet. Press o to open files, or paste paths to import them.".to_string(),
        );
        return;
    }
    let all: Vec<usize> = (0..app.catalog.len()).collect();
    draw_list(frame, app, area, " playlist ", &all);
}

fn draw_search(frame: &mut Frame, app: &App, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let cursor = if app.input == InputMode::Search { "▏" } else { "" };
    let query = Paragraph::new(format!("{}{cursor}", app.search_query)).block(padded_block(" search "));
    frame.render_widget(query, parts[0]);

    let results = app.search_results();
    if results.is_empty() {
        let text = if app.catalog.is_empty() {
            "The library is empty.".to_string()
        } else {
            format!("No tracks match \"{}\".", app.search_query.trim())
        };
        placeholder(frame, parts[1], " results ", text);
        return;
    }
    draw_list(frame, app, parts[1], " results ", &results);
}

fn draw_now_playing(frame: &mut Frame, app: &App, area: Rect) {
    let player = &app.player;
    let state = match player.status() {
        PlayerStatus::Playing => "▶",
        PlayerStatus::Paused => "⏸",
        PlayerStatus::Loaded | PlayerStatus::Stopped => "■",
    };
    let flags = format!(
        " shuffle: {} · repeat: {} · vol: {:.0}% ",
        if player.shuffle() { "on" } else { "off" },
        player.repeat().label(),
        player.volume() * 100.0
    );

    let track = player.current_index().and_then(|i| app.catalog.get(i));
    let elapsed = player.position();
    let total = player.duration(&app.catalog);
    let ratio = match total {
        Some(t) if !t.is_zero() => (elapsed.as_secs_f64() / t.as_secs_f64()).clamp(0.0, 1.0),
        _ => 0.0,
    };
    let label = match track {
        Some(t) => format!(
            "{state} {}  {} / {}",
            t.name,
            format_mmss(elapsed),
            format_opt(total)
        ),
        None => format!("{state} nothing loaded"),
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" now playing ")
                .title_bottom(Line::from(flags).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, area);
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn draw_path_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect_sized(72, 5, area);
    frame.render_widget(Clear, popup);
    let text = vec![
        Line::from(format!("{}▏", app.path_input)),
        Line::from("files or folders, space separated · enter to import · esc to cancel").dim(),
    ];
    let prompt = Paragraph::new(text)
        .block(padded_block(" open "))
        .wrap(Wrap { trim: false });
    frame.render_widget(prompt, popup);
}

#[cfg(test)]
mod tests;
