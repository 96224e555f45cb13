//! The playback coordinator: the single state holder the UI renders from.
//!
//! It owns the track list, search and selection state, shuffle/repeat and
//! sleep-timer policy, and is the only caller of engine operations. Engine
//! access goes through an optional [`PlaybackService`]; while it is `None`
//! every delegation is a no-op.
//!
//! All fields are mutated on the runtime thread. Background work reports
//! back through [`Update`] messages applied by [`Coordinator::pump`].

mod navigation;
mod selection;
mod sleep;
mod updates;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{MAX_SPEED, MIN_SPEED, PlaybackSettings};
use crate::engine::{EngineEvent, PlaybackService};
use crate::library::{LibraryIndex, Track, TrackId};
use crate::playlist::{AddOutcome, Playlist, PlaylistId, PlaylistStore};
use crate::session::ArtworkCache;
use crate::store::{PersistedState, StateStore};

use sleep::SleepTimer;
pub use updates::Update;


pub struct Coordinator<S: PlaybackService> {
    library: Arc<dyn LibraryIndex>,
    store: Box<dyn StateStore>,
    artwork: ArtworkCache,
    service: Option<S>,

    tracks: Vec<Track>,
    /// Indices into `tracks` matching `query`, in list order.
    filtered: Vec<usize>,
    query: String,
    loading: bool,

    selection_mode: bool,
    selection: BTreeSet<TrackId>,

    current: Option<Track>,
    playing: bool,
    position: Duration,
    duration: Duration,
    speed: f32,
    shuffle: bool,
    repeat: bool,
    seek_step: Duration,

    sleep: SleepTimer,
    sleep_minutes: u32,
    /// Length of one sleep-timer "minute".
    sleep_unit: Duration,

    playlists: PlaylistStore,
    last_track: Option<TrackId>,
    /// False when the saved state could not be read; saving would overwrite it.
    can_save: bool,
    cache_size: Option<u64>,
    notices: Vec<String>,

    updates_tx: Sender<Update>,
    updates_rx: Receiver<Update>,
}

impl<S: PlaybackService> Coordinator<S> {
    /// Read persisted state and start the background ticker. Call
    /// [`Coordinator::load`] to scan the library and [`Coordinator::connect`]
    /// once the engine is ready.
    pub fn new(
        library: Arc<dyn LibraryIndex>,
        store: Box<dyn StateStore>,
        artwork: ArtworkCache,
        playback: &PlaybackSettings,
    ) -> Self {
        let (persisted, can_save) = match store.load() {
            Ok(state) => (state, true),
            Err(e) => {
                warn!(error = %e, "could not read saved state, changes will not be saved");
                (PersistedState::default(), false)
            }
        };
        let (updates_tx, updates_rx) = mpsc::channel();

        let coordinator = Self {
            library,
            store,
            artwork,
            service: None,
            tracks: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            loading: false,
            selection_mode: false,
            selection: BTreeSet::new(),
            current: None,
            playing: false,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            speed: clamp_speed(playback.speed),
            shuffle: playback.shuffle,
            repeat: playback.repeat,
            seek_step: Duration::from_secs(playback.seek_step_seconds),
            sleep: SleepTimer::default(),
            sleep_minutes: 0,
            sleep_unit: Duration::from_secs(60),
            playlists: PlaylistStore::from_playlists(persisted.playlists),
            last_track: persisted.last_track,
            can_save,
            cache_size: None,
            notices: if can_save {
                Vec::new()
            } else {
                vec!["Saved state is unreadable, changes will not be saved".to_string()]
            },
            updates_tx,
            updates_rx,
        };

        updates::spawn_ticker(
            coordinator.updates_tx.clone(),
            Duration::from_millis(playback.progress_poll_ms.max(1)),
        );
        coordinator.probe_cache_size();
        coordinator
    }

    // ---- connection lifecycle ----

    /// Bind to the engine and reconcile state with it.
    ///
    /// An engine that already holds a track wins; otherwise the remembered
    /// current track is pushed into it without starting playback.
    pub fn connect(&mut self, service: S) {
        let status = service.status();
        match status.track {
            Some(track) => {
                self.playing = status.state.is_playing();
                self.position = status.position;
                self.duration = status.duration;
                self.current = Some(track);
            }
            None => {
                if let Some(track) = &self.current {
                    service.load_and_play(track, false);
                    service.set_speed(self.speed);
                    self.playing = false;
                    self.position = Duration::ZERO;
                }
            }
        }
        self.service = Some(service);
    }

    /// Unbind from the engine, handing the connection back.
    pub fn disconnect(&mut self) -> Option<S> {
        self.service.take()
    }

    pub fn is_connected(&self) -> bool {
        self.service.is_some()
    }

    fn with_service(&self, f: impl FnOnce(&S)) {
        if let Some(service) = &self.service {
            f(service);
        }
    }

    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::TrackEnded { id } => {
                if self.is_current(id) {
                    self.skip_next();
                } else {
                    debug!(id, "ignoring end of a track that is no longer current");
                }
            }
            EngineEvent::RemoteNext => self.skip_next(),
            EngineEvent::RemotePrevious => self.skip_previous(),
            EngineEvent::TransportChanged { id, playing } => {
                if self.is_current(id) {
                    self.playing = playing;
                }
            }
            EngineEvent::Ready | EngineEvent::RemoteQuit => {}
        }
    }

    /// Events raised for a track the user has since moved away from are stale.
    fn is_current(&self, id: TrackId) -> bool {
        self.current.as_ref().is_some_and(|t| t.id == id)
    }

    // ---- playlists ----

    pub fn create_playlist(&mut self, name: &str) -> PlaylistId {
        let id = self.playlists.create(name);
        self.persist();
        self.notices.push(format!("Created playlist \"{name}\""));
        id
    }

    pub fn add_to_playlist(&mut self, playlist: PlaylistId, track: TrackId) -> AddOutcome {
        let outcome = self.playlists.add_track(playlist, track);
        let name = self
            .playlists
            .get(playlist)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        match outcome {
            AddOutcome::Added => {
                self.persist();
                self.notices.push(format!("Added to {name}"));
            }
            AddOutcome::AlreadyPresent => self.notices.push(format!("Already in {name}")),
            AddOutcome::NoSuchPlaylist => {}
        }
        outcome
    }

    /// Play the first track of the playlist that is still in the library.
    pub fn play_playlist(&mut self, playlist: PlaylistId) -> bool {
        let Some(track) = self.playlists.get(playlist).and_then(|p| {
            p.track_ids
                .iter()
                .find_map(|id| self.tracks.iter().find(|t| t.id == *id))
                .cloned()
        }) else {
            return false;
        };
        self.play(track);
        true
    }

    pub fn playlists(&self) -> &[Playlist] {
        self.playlists.playlists()
    }

    fn persist(&self) {
        if !self.can_save {
            return;
        }
        let state = PersistedState {
            last_track: self.last_track,
            playlists: self.playlists.playlists().to_vec(),
        };
        if let Err(e) = self.store.save(&state) {
            warn!(error = %e, "failed to save state");
        }
    }

    // ---- read-only view ----

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Tracks matching the current query, in list order.
    pub fn visible(&self) -> impl Iterator<Item = &Track> + '_ {
        self.filtered.iter().filter_map(|&i| self.tracks.get(i))
    }

    pub fn visible_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn seek_step(&self) -> Duration {
        self.seek_step
    }

    pub fn cache_size(&self) -> Option<u64> {
        self.cache_size
    }

    /// Take the transient messages queued since the last call.
    pub fn drain_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }
}

fn clamp_speed(factor: f32) -> f32 {
    if factor.is_finite() {
        factor.clamp(MIN_SPEED, MAX_SPEED)
    } else {
        1.0
    }
}
