use std::fs;
use std::path::Path;

use lofty::prelude::*;
use tracing::debug;

/// Sidecar extensions, checked in this order.
const SIDECAR_EXTENSIONS: [&str; 2] = ["lrc", "txt"];

/// Find lyrics for the audio file at `path`.
///
/// Sidecar files next to the audio file win over the embedded lyrics tag.
/// Any failure along the way counts as "no lyrics".
pub fn resolve_lyrics(path: &Path) -> Option<String> {
    sidecar_lyrics(path).or_else(|| embedded_lyrics(path))
}

fn sidecar_lyrics(path: &Path) -> Option<String> {
    SIDECAR_EXTENSIONS.iter().find_map(|ext| {
        let candidate = path.with_extension(ext);
        if candidate == path {
            return None;
        }
        fs::read_to_string(&candidate)
            .ok()
            .filter(|text| !text.trim().is_empty())
    })
}

fn embedded_lyrics(path: &Path) -> Option<String> {
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "embedded lyrics unavailable");
            return None;
        }
    };

    tagged.tags().iter().find_map(|tag| {
        tag.items()
            .filter(|item| matches!(item.key(), ItemKey::Lyrics))
            .filter_map(|item| item.value().text())
            .find(|text| !text.trim().is_empty())
            .map(str::to_string)
    })
}
