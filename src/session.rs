//! Session synchronizer: mirrors engine state into the externally observable
//! session descriptor (MPRIS) and the status surface.
//!
//! The engine thread calls [`SessionSync::publish`] after every transition.
//! Cover art is resolved on a helper thread; until it arrives the descriptor
//! carries a placeholder, and it is republished once the art is ready.

mod artwork;
mod descriptor;
mod mpris;
mod surface;

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::engine::{EngineCmd, EngineStatus};
use crate::library::Track;

pub use artwork::{ArtworkCache, ArtworkError};
pub use descriptor::{Artwork, SessionDescriptor, SharedDescriptor};
pub use mpris::MprisHandle;
pub use surface::{StatusSurface, SurfaceAction, SurfaceHandle, SurfacePriority};

#[derive(Clone)]
pub struct SessionSync {
    state: SharedDescriptor,
    surface: SurfaceHandle,
    mpris: Option<MprisHandle>,
    artwork: ArtworkCache,
}

impl SessionSync {
    /// A synchronizer that only maintains the descriptor and status surface.
    pub fn new(artwork: ArtworkCache) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionDescriptor::default())),
            surface: Arc::new(Mutex::new(None)),
            mpris: None,
            artwork,
        }
    }

    /// Also publish on the D-Bus session bus; remote commands are sent to `tx`.
    pub fn with_mpris(identity: &str, artwork: ArtworkCache, tx: Sender<EngineCmd>) -> Self {
        let mut sync = Self::new(artwork);
        sync.mpris = Some(mpris::spawn_mpris(identity.to_string(), tx, sync.state.clone()));
        sync
    }

    pub fn surface_handle(&self) -> SurfaceHandle {
        self.surface.clone()
    }

    pub fn descriptor(&self) -> SessionDescriptor {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Mirror `status` into the descriptor and surface.
    pub fn publish(&self, status: &EngineStatus) {
        let track_changed = match self.state.lock() {
            Ok(mut s) => s.apply(status),
            Err(_) => return,
        };
        self.republish();

        if track_changed {
            if let Some(track) = status.track.clone() {
                self.resolve_artwork_in_background(track);
            }
        }
    }

    /// Refresh the position only. MPRIS clients read `Position` on demand, so
    /// no change signal is emitted.
    pub fn update_position(&self, position: Duration) {
        if let Ok(mut s) = self.state.lock() {
            s.position = position;
        }
        if let Ok(mut surface) = self.surface.lock() {
            if let Some(surface) = surface.as_mut() {
                surface.position = position;
            }
        }
    }

    /// Drop everything that was published.
    pub fn clear(&self) {
        if let Ok(mut s) = self.state.lock() {
            *s = SessionDescriptor::default();
        }
        self.republish();
    }

    fn republish(&self) {
        let rendered = self
            .state
            .lock()
            .ok()
            .and_then(|s| StatusSurface::render(&s));
        if let Ok(mut surface) = self.surface.lock() {
            *surface = rendered;
        }
        if let Some(mpris) = &self.mpris {
            mpris.notify();
        }
    }

    fn resolve_artwork_in_background(&self, track: Track) {
        if track.artwork.is_none() {
            return;
        }
        let sync = self.clone();
        thread::spawn(move || match sync.artwork.resolve(&track) {
            Ok(Some(path)) => {
                let applied = match sync.state.lock() {
                    Ok(mut s) if s.track_id == Some(track.id) => {
                        s.artwork = Artwork::Resolved(path);
                        true
                    }
                    _ => false,
                };
                if applied {
                    sync.republish();
                }
            }
            Ok(None) => {}
            Err(e) => debug!(track = %track.title, error = %e, "artwork unavailable"),
        });
    }
}

#[cfg(test)]
mod tests;
