use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::engine::{EngineStatus, TransportState};
use crate::library::TrackId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Artwork {
    /// Not resolved yet, or the track has none.
    #[default]
    Placeholder,
    Resolved(PathBuf),
}

/// Externally observable summary of the current playback state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDescriptor {
    pub track_id: Option<TrackId>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub url: Option<String>,
    pub duration: Duration,
    pub position: Duration,
    pub state: TransportState,
    pub speed: f32,
    pub artwork: Artwork,
}

impl Default for SessionDescriptor {
    fn default() -> Self {
        Self {
            track_id: None,
            title: None,
            artist: None,
            album: None,
            url: None,
            duration: Duration::ZERO,
            position: Duration::ZERO,
            state: TransportState::Idle,
            speed: 1.0,
            artwork: Artwork::Placeholder,
        }
    }
}

impl SessionDescriptor {
    /// Copy `status` in. Returns true when the bound track changed, in which
    /// case the artwork falls back to the placeholder.
    pub fn apply(&mut self, status: &EngineStatus) -> bool {
        let new_id = status.track.as_ref().map(|t| t.id);
        let track_changed = new_id != self.track_id;

        match &status.track {
            Some(track) => {
                self.title = Some(track.title.clone());
                self.artist = track.artist.clone();
                self.album = track.album.clone();
                self.url = Some(track.uri.clone());
            }
            None => {
                self.title = None;
                self.artist = None;
                self.album = None;
                self.url = None;
            }
        }
        self.track_id = new_id;
        self.duration = status.duration;
        self.position = status.position;
        self.state = status.state;
        self.speed = status.speed;
        if track_changed {
            self.artwork = Artwork::Placeholder;
        }
        track_changed
    }
}

pub type SharedDescriptor = Arc<Mutex<SessionDescriptor>>;
