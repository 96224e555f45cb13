use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use xxhash_rust::xxh3::xxh3_64;

/// Stable identifier derived from the track's location on disk.
pub type TrackId = u64;

/// Where a track's cover art can be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkLocator {
    /// A picture embedded in the audio file's tags.
    Embedded(PathBuf),
    /// An image file next to the audio file (`cover.jpg`, `folder.png`, ...).
    File(PathBuf),
}

/// A single playable audio item and its metadata.
///
/// Tracks are immutable values; when lyrics are resolved the whole record is
/// replaced with a copy produced by [`Track::with_lyrics`].
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Content locator handed to the engine and published as `xesam:url`.
    pub uri: String,
    pub artwork: Option<ArtworkLocator>,
    pub duration: Duration,
    pub path: PathBuf,
    pub lyrics: Option<String>,
}

impl Track {
    /// Build a track for `path` with only the filename-derived fields set.
    pub fn from_path(path: &Path) -> Self {
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        Self {
            id: track_id_for(path),
            title,
            artist: None,
            album: None,
            uri: file_uri(path),
            artwork: None,
            duration: Duration::ZERO,
            path: path.to_path_buf(),
            lyrics: None,
        }
    }

    pub fn with_lyrics(&self, lyrics: String) -> Self {
        Self {
            lyrics: Some(lyrics),
            ..self.clone()
        }
    }

    /// `Artist - Title`, or just the title when the artist is unknown.
    pub fn display(&self) -> String {
        match self.artist.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => format!("{} - {}", a, self.title),
            _ => self.title.clone(),
        }
    }
}

/// Hash the path bytes so the same file keeps its id across scans.
///
/// The top bit is cleared so ids fit TOML's signed integers.
pub fn track_id_for(path: &Path) -> TrackId {
    xxh3_64(path.to_string_lossy().as_bytes()) & (i64::MAX as u64)
}

/// `file://` URL for a local path. Every path byte outside the unreserved
/// set is percent-encoded; `/` separators are kept.
pub fn file_uri(path: &Path) -> String {
    let segments: Vec<_> = path_bytes(path)
        .split(|b| *b == b'/')
        .map(|segment| urlencoding::encode_binary(segment).into_owned())
        .collect();
    format!("file://{}", segments.join("/"))
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    Cow::Owned(path.to_string_lossy().replace('\\', "/").into_bytes())
}
