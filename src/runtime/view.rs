//! Terminal-only view state: cursor, input mode, panels and the notice line.

use std::time::{Duration, Instant};

const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Minutes the sleep-timer key cycles through.
pub const SLEEP_STEPS: [u32; 5] = [0, 15, 30, 45, 60];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Filter,
    PlaylistName(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    None,
    Lyrics,
    Playlists,
}

#[derive(Debug, Default)]
pub struct ViewState {
    /// Position within the visible (filtered) list.
    pub cursor: usize,
    pub mode: InputMode,
    pub panel: Panel,
    pub playlist_cursor: usize,
    notice: Option<(String, Instant)>,
}

impl ViewState {
    pub fn down(&mut self, len: usize) {
        if len > 0 {
            self.cursor = (self.cursor + 1).min(len - 1);
        }
    }

    pub fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Keep the cursor inside a list that may have shrunk.
    pub fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn toggle_panel(&mut self, panel: Panel) {
        self.panel = if self.panel == panel {
            Panel::None
        } else {
            panel
        };
    }

    pub fn push_notice(&mut self, text: String) {
        self.notice = Some((text, Instant::now()));
    }

    /// The latest notice, until it expires.
    pub fn notice(&self) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|(_, at)| at.elapsed() < NOTICE_TTL)
            .map(|(text, _)| text.as_str())
    }
}

/// Next entry in [`SLEEP_STEPS`] after `minutes`, wrapping to off.
pub fn next_sleep_step(minutes: u32) -> u32 {
    SLEEP_STEPS
        .iter()
        .copied()
        .find(|&m| m > minutes)
        .unwrap_or(0)
}
