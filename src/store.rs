//! Durable player state: the last-played track and the user's playlists.
//!
//! Stored as a single TOML document, rewritten in full on every change.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::library::TrackId;
use crate::playlist::Playlist;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("state file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to encode state: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub last_track: Option<TrackId>,
    pub playlists: Vec<Playlist>,
}

pub trait StateStore: Send {
    fn load(&self) -> Result<PersistedState, StoreError>;
    fn save(&self, state: &PersistedState) -> Result<(), StoreError>;
}

pub struct TomlStateFile {
    path: PathBuf,
}

impl TomlStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable state file is moved so the next save cannot
    /// overwrite it.
    pub fn rejected_path(&self) -> PathBuf {
        self.path.with_extension("toml.bad")
    }

    /// Move an unparsable document out of the way and start from defaults.
    /// If it cannot be moved the parse error is returned and the caller must
    /// not save over it.
    fn set_aside(&self, err: toml::de::Error) -> Result<PersistedState, StoreError> {
        let rejected = self.rejected_path();
        match fs::rename(&self.path, &rejected) {
            Ok(()) => {
                warn!(
                    error = %err,
                    moved_to = %rejected.display(),
                    "state file was unreadable, starting fresh"
                );
                Ok(PersistedState::default())
            }
            Err(io_err) => {
                warn!(error = %io_err, "could not move unreadable state file aside");
                Err(err.into())
            }
        }
    }
}

impl StateStore for TomlStateFile {
    fn load(&self) -> Result<PersistedState, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(state) => Ok(state),
                Err(e) => self.set_aside(e),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file yet");
                Ok(PersistedState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let text = toml::to_string(state)?;

        // Write-then-rename so a crash never leaves a truncated document.
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store for tests. Clones share the same document.
#[cfg(test)]
#[derive(Default, Clone)]
pub struct MemoryStore {
    pub state: std::sync::Arc<std::sync::Mutex<PersistedState>>,
}

#[cfg(test)]
impl StateStore for MemoryStore {
    fn load(&self) -> Result<PersistedState, StoreError> {
        Ok(self.state.lock().unwrap().clone())
    }

    fn save(&self, state: &PersistedState) -> Result<(), StoreError> {
        *self.state.lock().unwrap() = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_default_state() {
        let dir = tempdir().unwrap();
        let store = TomlStateFile::new(dir.path().join("state.toml"));
        assert_eq!(store.load().unwrap(), PersistedState::default());
    }

    #[test]
    fn save_then_load_keeps_last_track_and_playlists() {
        let dir = tempdir().unwrap();
        let store = TomlStateFile::new(dir.path().join("nested").join("state.toml"));

        let state = PersistedState {
            last_track: Some(1234),
            playlists: vec![Playlist {
                id: 1_700_000_000_000,
                name: "Road trip".to_string(),
                track_ids: vec![3, 1, 2],
            }],
        };
        store.save(&state).unwrap();

        assert_eq!(store.load().unwrap(), state);
        assert!(!dir.path().join("nested").join("state.toml.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_moved_aside_before_starting_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.toml");
        let text = "last_track = \"oops\"\n\n[[playlists]]\nid = 1\nname = \"Road trip\"\ntrack_ids = [3]\n";
        fs::write(&path, text).unwrap();

        let store = TomlStateFile::new(&path);
        assert_eq!(store.load().unwrap(), PersistedState::default());
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(store.rejected_path()).unwrap(), text);

        store.save(&PersistedState::default()).unwrap();
        assert_eq!(fs::read_to_string(store.rejected_path()).unwrap(), text);
    }
}
