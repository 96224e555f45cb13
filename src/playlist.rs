//! User-created playlists: named orderings over track identifiers.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::library::TrackId;

/// Creation timestamp in milliseconds since the Unix epoch.
pub type PlaylistId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    #[serde(default)]
    pub track_ids: Vec<TrackId>,
}

/// Result of appending a track to a playlist.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
    NoSuchPlaylist,
}

#[derive(Debug, Default, Clone)]
pub struct PlaylistStore {
    playlists: Vec<Playlist>,
}

impl PlaylistStore {
    pub fn from_playlists(playlists: Vec<Playlist>) -> Self {
        Self { playlists }
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn get(&self, id: PlaylistId) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    /// Create an empty playlist and return its id.
    ///
    /// Ids are creation timestamps, bumped when two playlists land in the same millisecond.
    pub fn create(&mut self, name: impl Into<String>) -> PlaylistId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let last = self.playlists.iter().map(|p| p.id).max().unwrap_or(0);
        let id = now.max(last + 1);

        self.playlists.push(Playlist {
            id,
            name: name.into(),
            track_ids: Vec::new(),
        });
        id
    }

    /// Append `track` to the playlist, ignoring duplicates.
    pub fn add_track(&mut self, playlist: PlaylistId, track: TrackId) -> AddOutcome {
        let Some(p) = self.playlists.iter_mut().find(|p| p.id == playlist) else {
            return AddOutcome::NoSuchPlaylist;
        };
        if p.track_ids.contains(&track) {
            return AddOutcome::AlreadyPresent;
        }
        p.track_ids.push(track);
        AddOutcome::Added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_assigns_increasing_ids() {
        let mut store = PlaylistStore::default();
        let a = store.create("Morning");
        let b = store.create("Evening");
        assert!(b > a);
        assert_eq!(store.playlists().len(), 2);
        assert_eq!(store.get(a).map(|p| p.name.as_str()), Some("Morning"));
    }

    #[test]
    fn add_track_suppresses_duplicates() {
        let mut store = PlaylistStore::default();
        let id = store.create("Mix");

        assert_eq!(store.add_track(id, 7), AddOutcome::Added);
        assert_eq!(store.add_track(id, 9), AddOutcome::Added);
        assert_eq!(store.add_track(id, 7), AddOutcome::AlreadyPresent);
        assert_eq!(store.get(id).unwrap().track_ids, vec![7, 9]);
    }

    #[test]
    fn add_track_to_unknown_playlist() {
        let mut store = PlaylistStore::default();
        assert_eq!(store.add_track(42, 1), AddOutcome::NoSuchPlaylist);
    }
}
