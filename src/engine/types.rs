//! Commands, events and status snapshots exchanged with the engine thread.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::{Track, TrackId};

/// Transport classification of the pipeline.
///
/// `Idle` only before the first track is bound; a bound track that has not
/// been started yet is `Loaded`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Idle,
    Loaded,
    Playing,
    Paused,
}

impl TransportState {
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// Transport commands arriving from the OS media session.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCmd {
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Previous,
    /// Relative seek in microseconds (MPRIS `Seek`).
    SeekBy(i64),
    SetPosition(Duration),
    Quit,
}

#[derive(Debug)]
pub enum EngineCmd {
    LoadAndPlay { track: Box<Track>, autoplay: bool },
    TogglePlayPause,
    Seek(Duration),
    SetSpeed(f32),
    Remote(RemoteCmd),
    Quit,
}

/// Events the engine thread emits for the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The output device is open and commands will be honoured.
    Ready,
    /// The bound track played to its end.
    TrackEnded { id: TrackId },
    RemoteNext,
    RemotePrevious,
    RemoteQuit,
    /// Transport changed without the coordinator asking (remote control, end of track).
    /// Carries the track bound at the time so stale events can be told apart.
    TransportChanged { id: TrackId, playing: bool },
}

/// Point-in-time view of the engine, republished after every command.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStatus {
    pub track: Option<Track>,
    pub state: TransportState,
    pub position: Duration,
    pub duration: Duration,
    pub speed: f32,
}

impl Default for EngineStatus {
    fn default() -> Self {
        Self {
            track: None,
            state: TransportState::Idle,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            speed: 1.0,
        }
    }
}

pub type StatusHandle = Arc<Mutex<EngineStatus>>;

/// The operations a coordinator may issue over its engine connection.
pub trait PlaybackService {
    fn load_and_play(&self, track: &Track, autoplay: bool);
    fn toggle_play_pause(&self);
    fn seek(&self, position: Duration);
    fn set_speed(&self, factor: f32);
    fn status(&self) -> EngineStatus;
}
