use std::path::{Path, PathBuf};

use lofty::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{ArtworkLocator, Track};

/// Image files picked up as cover art when the audio file has no embedded picture.
const COVER_FILENAMES: [&str; 6] = [
    "cover.jpg",
    "cover.png",
    "folder.jpg",
    "folder.png",
    "front.jpg",
    "front.png",
];

/// Source of the library's track list.
///
/// The query is synchronous; callers are expected to run it off the runtime thread.
pub trait LibraryIndex: Send + Sync {
    fn query(&self) -> Vec<Track>;
}

/// Library index backed by a directory walk.
pub struct DirectoryIndex {
    root: PathBuf,
    settings: LibrarySettings,
}

impl DirectoryIndex {
    pub fn new(root: impl Into<PathBuf>, settings: LibrarySettings) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl LibraryIndex for DirectoryIndex {
    fn query(&self) -> Vec<Track> {
        scan(&self.root, &self.settings)
    }
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn non_blank(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn cover_file_near(path: &Path) -> Option<PathBuf> {
    let dir = path.parent()?;
    COVER_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Read tags for a single file. Unreadable tags leave the filename-derived defaults.
fn read_track(path: &Path) -> Track {
    let mut track = Track::from_path(path);
    let mut has_embedded_art = false;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            track.duration = tagged.properties().duration();

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(title) = non_blank(tag.title()) {
                    track.title = title;
                }
                track.artist = non_blank(tag.artist());
                track.album = non_blank(tag.album());
                has_embedded_art = !tag.pictures().is_empty();
            }
        }
        Err(e) => debug!(path = %path.display(), error = %e, "no readable tags"),
    }

    track.artwork = if has_embedded_art {
        Some(ArtworkLocator::Embedded(path.to_path_buf()))
    } else {
        cover_file_near(path).map(ArtworkLocator::File)
    };

    track
}

/// Walk `dir` and return every audio file as a `Track`, sorted by title.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(read_track(path));
        }
    }

    tracks.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.path.cmp(&b.path))
    });
    info!(root = %dir.display(), count = tracks.len(), "library scan finished");
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.lrc"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_filters_non_audio_and_sorts_by_title_case_insensitive() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let tracks = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "A");
        assert_eq!(tracks[1].title, "b");
        assert!(tracks[0].uri.starts_with("file://"));
    }

    #[test]
    fn scan_assigns_stable_ids() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("song.mp3"), b"x").unwrap();

        let first = scan(dir.path(), &LibrarySettings::default());
        let second = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "visible");
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "root");
    }

    #[test]
    fn scan_uses_cover_file_when_no_embedded_art() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("song.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("cover.jpg"), b"jpeg").unwrap();

        let tracks = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(
            tracks[0].artwork,
            Some(ArtworkLocator::File(dir.path().join("cover.jpg")))
        );
    }
}
