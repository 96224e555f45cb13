//! The persistent status surface: a compact now-playing card with transport
//! buttons, rebuilt from the descriptor on every change.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::descriptor::{Artwork, SessionDescriptor};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SurfaceAction {
    Previous,
    Play,
    Pause,
    Next,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SurfacePriority {
    /// Paused: low priority chrome, may be dismissed.
    Low,
    /// Playing: elevated and pinned.
    Ongoing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusSurface {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// `None` renders the placeholder glyph.
    pub artwork: Option<PathBuf>,
    /// Always previous, play-or-pause, next; left to right.
    pub actions: [SurfaceAction; 3],
    pub priority: SurfacePriority,
    pub dismissable: bool,
    pub position: Duration,
    pub duration: Duration,
}

impl StatusSurface {
    /// Nothing is shown until a track is bound.
    pub fn render(d: &SessionDescriptor) -> Option<Self> {
        let title = d.title.clone()?;
        let playing = d.state.is_playing();

        Some(Self {
            title,
            artist: d
                .artist
                .clone()
                .unwrap_or_else(|| "Unknown Artist".to_string()),
            album: d.album.clone().unwrap_or_else(|| "Unknown Album".to_string()),
            artwork: match &d.artwork {
                Artwork::Resolved(p) => Some(p.clone()),
                Artwork::Placeholder => None,
            },
            actions: [
                SurfaceAction::Previous,
                if playing {
                    SurfaceAction::Pause
                } else {
                    SurfaceAction::Play
                },
                SurfaceAction::Next,
            ],
            priority: if playing {
                SurfacePriority::Ongoing
            } else {
                SurfacePriority::Low
            },
            dismissable: !playing,
            position: d.position,
            duration: d.duration,
        })
    }
}

pub type SurfaceHandle = Arc<Mutex<Option<StatusSurface>>>;
