use crossterm::event::{KeyCode, KeyEvent};

use super::view::{InputMode, Panel, ViewState, next_sleep_step};
use crate::coordinator::Coordinator;
use crate::engine::PlaybackService;
use crate::library::Track;

const SPEED_STEP: f32 = 0.25;

fn track_under_cursor<S: PlaybackService>(c: &Coordinator<S>, view: &ViewState) -> Option<Track> {
    c.visible().nth(view.cursor).cloned()
}

/// Apply one key press. Returns `true` when the user asked to quit.
pub fn handle_key<S: PlaybackService>(
    key: KeyEvent,
    c: &mut Coordinator<S>,
    view: &mut ViewState,
) -> bool {
    match view.mode.clone() {
        InputMode::Filter => {
            handle_filter_key(key, c, view);
            false
        }
        InputMode::PlaylistName(name) => {
            handle_name_key(key, name, c, view);
            false
        }
        InputMode::Normal => handle_normal_key(key, c, view),
    }
}

fn handle_filter_key<S: PlaybackService>(
    key: KeyEvent,
    c: &mut Coordinator<S>,
    view: &mut ViewState,
) {
    let mut query = c.query().to_string();
    match key.code {
        KeyCode::Esc => {
            query.clear();
            view.mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            view.mode = InputMode::Normal;
            return;
        }
        KeyCode::Backspace => {
            query.pop();
        }
        KeyCode::Char(ch) if !ch.is_control() => query.push(ch),
        _ => return,
    }
    c.set_query(&query);
    view.cursor = 0;
}

fn handle_name_key<S: PlaybackService>(
    key: KeyEvent,
    mut name: String,
    c: &mut Coordinator<S>,
    view: &mut ViewState,
) {
    match key.code {
        KeyCode::Esc => view.mode = InputMode::Normal,
        KeyCode::Enter => {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                c.create_playlist(trimmed);
            }
            view.mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            name.pop();
            view.mode = InputMode::PlaylistName(name);
        }
        KeyCode::Char(ch) if !ch.is_control() => {
            name.push(ch);
            view.mode = InputMode::PlaylistName(name);
        }
        _ => {}
    }
}

fn handle_normal_key<S: PlaybackService>(
    key: KeyEvent,
    c: &mut Coordinator<S>,
    view: &mut ViewState,
) -> bool {
    let in_playlists = view.panel == Panel::Playlists;

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => {
            if in_playlists {
                let len = c.playlists().len();
                if len > 0 {
                    view.playlist_cursor = (view.playlist_cursor + 1).min(len - 1);
                }
            } else {
                view.down(c.visible_len());
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if in_playlists {
                view.playlist_cursor = view.playlist_cursor.saturating_sub(1);
            } else {
                view.up();
            }
        }
        KeyCode::Enter => {
            if in_playlists {
                if let Some(id) = c.playlists().get(view.playlist_cursor).map(|p| p.id) {
                    c.play_playlist(id);
                }
            } else if let Some(track) = track_under_cursor(c, view) {
                if c.selection_mode() {
                    c.toggle_selection(track.id);
                } else {
                    c.play(track);
                }
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => c.toggle_play_pause(),
        KeyCode::Char('l') | KeyCode::Char('n') => c.skip_next(),
        KeyCode::Char('h') => c.skip_previous(),
        KeyCode::Char('L') => c.seek_relative(true),
        KeyCode::Char('H') => c.seek_relative(false),
        KeyCode::Char('/') => view.mode = InputMode::Filter,
        KeyCode::Char('s') => c.toggle_shuffle(),
        KeyCode::Char('r') => c.toggle_repeat(),
        KeyCode::Char('v') => {
            if let Some(track) = track_under_cursor(c, view) {
                c.long_press(track.id);
            }
        }
        KeyCode::Char('x') => {
            if let Some(track) = track_under_cursor(c, view) {
                c.toggle_selection(track.id);
            }
        }
        KeyCode::Char('a') if c.selection_mode() => c.select_all(),
        KeyCode::Char('d') if c.selection_mode() => {
            c.delete_selected();
            view.clamp(c.visible_len());
        }
        KeyCode::Esc => {
            if c.selection_mode() {
                c.clear_selection();
            } else {
                view.panel = Panel::None;
            }
        }
        KeyCode::Char('t') => c.set_sleep_timer(next_sleep_step(c.sleep_minutes())),
        KeyCode::Char('+') | KeyCode::Char('=') => c.set_speed(c.speed() + SPEED_STEP),
        KeyCode::Char('-') => c.set_speed(c.speed() - SPEED_STEP),
        KeyCode::Char('c') => view.mode = InputMode::PlaylistName(String::new()),
        KeyCode::Char('P') => view.toggle_panel(Panel::Playlists),
        KeyCode::Char('A') => {
            let playlist = c.playlists().get(view.playlist_cursor).map(|p| p.id);
            if let (Some(id), Some(track)) = (playlist, track_under_cursor(c, view)) {
                c.add_to_playlist(id, track.id);
            }
        }
        KeyCode::Char('y') => view.toggle_panel(Panel::Lyrics),
        KeyCode::Char('C') => c.clear_artwork_cache(),
        _ => {}
    }
    false
}
