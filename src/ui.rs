//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. It only
//! reads from the coordinator and the status surface; nothing here mutates
//! playback state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::coordinator::Coordinator;
use crate::engine::PlaybackService;
use crate::runtime::{InputMode, Panel, ViewState};
use crate::session::{StatusSurface, SurfaceAction, SurfacePriority};

const CONTROLS: [(&str, &str); 16] = [
    ("j/k", "up/down"),
    ("enter", "play"),
    ("space/p", "play/pause"),
    ("h/l", "prev/next"),
    ("H/L", "seek"),
    ("/", "filter"),
    ("s", "shuffle"),
    ("r", "repeat"),
    ("v/x", "select"),
    ("a/d", "select all/remove"),
    ("t", "sleep"),
    ("+/-", "speed"),
    ("c/P/A", "new/list/add playlist"),
    ("y", "lyrics"),
    ("C", "clear art cache"),
    ("q", "quit"),
];

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn action_label(action: SurfaceAction) -> &'static str {
    match action {
        SurfaceAction::Previous => "|<<",
        SurfaceAction::Play => " > ",
        SurfaceAction::Pause => "||",
        SurfaceAction::Next => ">>|",
    }
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

/// Render the entire UI into `frame`.
pub fn draw<S: PlaybackService>(
    frame: &mut Frame,
    c: &Coordinator<S>,
    view: &ViewState,
    card: Option<&StatusSurface>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    draw_header(frame, c, view, chunks[0]);
    draw_surface(frame, card, chunks[1]);

    let body = if view.panel == Panel::None {
        vec![chunks[2]]
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2])
            .to_vec()
    };
    draw_tracks(frame, c, view, body[0]);
    match view.panel {
        Panel::Lyrics => draw_lyrics(frame, c, body[1]),
        Panel::Playlists => draw_playlists(frame, c, view, body[1]),
        Panel::None => {}
    }

    let footer_text = match view.notice() {
        Some(notice) => notice.to_string(),
        None => controls_text(),
    };
    let footer = Paragraph::new(footer_text)
        .block(padded_block(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_header<S: PlaybackService>(frame: &mut Frame, c: &Coordinator<S>, view: &ViewState, area: Rect) {
    let mut parts: Vec<String> = Vec::new();

    match &view.mode {
        InputMode::Filter => parts.push(format!("FILTER: {}_", c.query())),
        InputMode::PlaylistName(name) => parts.push(format!("NEW PLAYLIST: {name}_")),
        InputMode::Normal if !c.query().is_empty() => parts.push(format!("FILTER: {}", c.query())),
        InputMode::Normal => {}
    }
    if c.is_loading() {
        parts.push("Scanning...".to_string());
    }
    if !c.is_connected() {
        parts.push("Engine: offline".to_string());
    }
    if c.selection_mode() {
        parts.push(format!("Selected: {}", c.selection_len()));
    }
    parts.push(format!("Shuffle: {}", if c.shuffle() { "ON" } else { "OFF" }));
    parts.push(format!("Repeat: {}", if c.repeat() { "ON" } else { "OFF" }));
    parts.push(format!("Speed: {:.2}x", c.speed()));
    if let Some(left) = c.sleep_remaining() {
        parts.push(format!("Sleep: {}", format_mmss(left)));
    }
    if let Some(bytes) = c.cache_size() {
        parts.push(format!("Art cache: {} KiB", bytes.div_ceil(1024)));
    }

    let header = Paragraph::new(parts.join(" • "))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, area);
}

fn draw_surface(frame: &mut Frame, card: Option<&StatusSurface>, area: Rect) {
    let Some(card) = card else {
        let idle = Paragraph::new("Nothing playing").block(padded_block(" now playing "));
        frame.render_widget(idle, area);
        return;
    };

    let title = match card.priority {
        SurfacePriority::Ongoing => " now playing ",
        SurfacePriority::Low => " paused ",
    };
    let block = padded_block(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let art = if card.artwork.is_some() { "[art]" } else { "[ ♪ ]" };
    let text = format!("{art} {}\n      {} - {}", card.title, card.artist, card.album);
    let info = Paragraph::new(text);
    let info = if card.priority == SurfacePriority::Ongoing {
        info.bold()
    } else {
        info
    };
    frame.render_widget(info, rows[0]);

    let ratio = if card.duration.is_zero() {
        0.0
    } else {
        (card.position.as_secs_f64() / card.duration.as_secs_f64()).clamp(0.0, 1.0)
    };
    let gauge = Gauge::default()
        .ratio(ratio)
        .label(format!(
            "{} / {}",
            format_mmss(card.position),
            format_mmss(card.duration)
        ));
    frame.render_widget(gauge, rows[1]);

    let actions = card
        .actions
        .iter()
        .map(|a| action_label(*a))
        .collect::<Vec<_>>()
        .join("   ");
    frame.render_widget(Paragraph::new(actions).alignment(Alignment::Center), rows[2]);
}

fn draw_tracks<S: PlaybackService>(frame: &mut Frame, c: &Coordinator<S>, view: &ViewState, area: Rect) {
    let current = c.current().map(|t| t.id);

    // Only build ListItems for the visible window.
    let total = c.visible_len();
    let list_height = area.height.saturating_sub(2) as usize;
    let (start, end) = if total <= list_height || list_height == 0 {
        (0, total)
    } else {
        let half = list_height / 2;
        let mut start = view.cursor.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height)
    };

    let items: Vec<ListItem> = c
        .visible()
        .skip(start)
        .take(end - start)
        .map(|t| {
            let mark = if c.is_selected(t.id) {
                "[x] "
            } else if c.selection_mode() {
                "[ ] "
            } else {
                ""
            };
            let playing = if Some(t.id) == current { "♪ " } else { "" };
            let item = ListItem::new(format!("{mark}{playing}{}", t.display()));
            if Some(t.id) == current {
                item.style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" tracks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(view.cursor.saturating_sub(start)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_lyrics<S: PlaybackService>(frame: &mut Frame, c: &Coordinator<S>, area: Rect) {
    let text = match c.current() {
        Some(t) => t.lyrics.clone().unwrap_or_else(|| "No lyrics".to_string()),
        None => "Nothing playing".to_string(),
    };
    let lyrics = Paragraph::new(text)
        .block(padded_block(" lyrics "))
        .wrap(Wrap { trim: false });
    frame.render_widget(lyrics, area);
}

fn draw_playlists<S: PlaybackService>(frame: &mut Frame, c: &Coordinator<S>, view: &ViewState, area: Rect) {
    let items: Vec<ListItem> = c
        .playlists()
        .iter()
        .map(|p| ListItem::new(format!("{} ({})", p.name, p.track_ids.len())))
        .collect();
    let empty = items.is_empty();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" playlists "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !empty {
        state.select(Some(view.playlist_cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
