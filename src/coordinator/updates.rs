//! Background work and the messages it sends back to the runtime thread.

use std::sync::mpsc::{RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::Coordinator;
use crate::engine::PlaybackService;
use crate::library::{Track, TrackId, resolve_lyrics};

#[derive(Debug)]
pub enum Update {
    LibraryLoaded(Vec<Track>),
    LyricsResolved { id: TrackId, lyrics: String },
    CacheSize(u64),
    CacheCleared(u64),
    SleepTimerExpired(u64),
    Tick,
}

/// Send `Tick` every `interval` until the coordinator goes away.
pub(super) fn spawn_ticker(tx: Sender<Update>, interval: Duration) {
    thread::spawn(move || {
        loop {
            thread::sleep(interval);
            if tx.send(Update::Tick).is_err() {
                break;
            }
        }
    });
}

pub(super) fn spawn_lyrics(tx: Sender<Update>, track: &Track) {
    let id = track.id;
    let path = track.path.clone();
    thread::spawn(move || {
        if let Some(lyrics) = resolve_lyrics(&path) {
            let _ = tx.send(Update::LyricsResolved { id, lyrics });
        }
    });
}

impl<S: PlaybackService> Coordinator<S> {
    /// Scan the library off-thread. The result lands through [`Coordinator::pump`].
    pub fn load(&mut self) {
        self.loading = true;
        let library = self.library.clone();
        let tx = self.updates_tx.clone();
        thread::spawn(move || {
            let tracks = library.query();
            let _ = tx.send(Update::LibraryLoaded(tracks));
        });
    }

    /// Apply every pending update. Returns whether anything arrived.
    pub fn pump(&mut self) -> bool {
        let mut any = false;
        while let Ok(update) = self.updates_rx.try_recv() {
            self.apply(update);
            any = true;
        }
        any
    }

    /// Block up to `timeout` for one update, then drain the rest.
    pub fn wait_update(&mut self, timeout: Duration) -> bool {
        match self.updates_rx.recv_timeout(timeout) {
            Ok(update) => {
                self.apply(update);
                self.pump();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    pub(super) fn apply(&mut self, update: Update) {
        match update {
            Update::LibraryLoaded(tracks) => self.apply_library(tracks),
            Update::LyricsResolved { id, lyrics } => self.apply_lyrics(id, lyrics),
            Update::CacheSize(bytes) => self.cache_size = Some(bytes),
            Update::CacheCleared(freed) => {
                self.cache_size = Some(0);
                self.notices
                    .push(format!("Cleared {} KiB of artwork", freed.div_ceil(1024)));
            }
            Update::SleepTimerExpired(generation) => self.on_sleep_expired(generation),
            Update::Tick => self.refresh_progress(),
        }
    }

    /// Replace the list and, on a cold start, restore the last-played track
    /// without starting it.
    pub(super) fn apply_library(&mut self, tracks: Vec<Track>) {
        info!(count = tracks.len(), "library loaded");
        self.loading = false;
        self.tracks = tracks;
        self.refilter();

        let present: Vec<_> = self
            .selection
            .iter()
            .copied()
            .filter(|id| self.tracks.iter().any(|t| t.id == *id))
            .collect();
        self.selection = present.into_iter().collect();
        self.selection_mode = self.selection_mode && !self.selection.is_empty();

        if self.current.is_some() {
            return;
        }
        let Some(last) = self.last_track else {
            return;
        };
        let Some(track) = self.tracks.iter().find(|t| t.id == last).cloned() else {
            debug!(id = last, "last-played track no longer in library");
            return;
        };

        self.with_service(|s| s.load_and_play(&track, false));
        self.duration = track.duration;
        self.position = Duration::ZERO;
        self.playing = false;
        self.current = Some(track);
    }

    fn apply_lyrics(&mut self, id: TrackId, lyrics: String) {
        if let Some(t) = self.tracks.iter_mut().find(|t| t.id == id) {
            *t = t.with_lyrics(lyrics.clone());
        }
        if let Some(current) = self.current.as_mut().filter(|c| c.id == id) {
            *current = current.with_lyrics(lyrics);
        }
    }

    pub(super) fn probe_cache_size(&self) {
        let artwork = self.artwork.clone();
        let tx = self.updates_tx.clone();
        thread::spawn(move || {
            let _ = tx.send(Update::CacheSize(artwork.size_bytes()));
        });
    }

    /// Delete the extracted artwork off-thread.
    pub fn clear_artwork_cache(&self) {
        let artwork = self.artwork.clone();
        let tx = self.updates_tx.clone();
        thread::spawn(move || match artwork.clear() {
            Ok(freed) => {
                let _ = tx.send(Update::CacheCleared(freed));
            }
            Err(e) => warn!(error = %e, "failed to clear artwork cache"),
        });
    }
}
