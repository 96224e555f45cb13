//! Cover art resolution and the on-disk artwork cache.
//!
//! Sidecar covers are used in place. Embedded pictures are extracted once
//! into `<cache>/<track id>.<ext>` and reused on later lookups.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::library::{ArtworkLocator, Track};

const CACHED_EXTENSIONS: [&str; 2] = ["jpg", "png"];

#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("artwork cache I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to read embedded artwork: {0}")]
    Tag(#[from] lofty::error::LoftyError),
    #[error("no artwork cache directory configured")]
    NoCacheDir,
}

#[derive(Debug, Clone, Default)]
pub struct ArtworkCache {
    dir: Option<PathBuf>,
}

impl ArtworkCache {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Local image path for `track`'s cover, if it has one.
    pub fn resolve(&self, track: &Track) -> Result<Option<PathBuf>, ArtworkError> {
        match &track.artwork {
            None => Ok(None),
            Some(ArtworkLocator::File(path)) => Ok(Some(path.clone())),
            Some(ArtworkLocator::Embedded(source)) => self.extract(track.id, source),
        }
    }

    fn extract(&self, id: u64, source: &Path) -> Result<Option<PathBuf>, ArtworkError> {
        let dir = self.dir.as_ref().ok_or(ArtworkError::NoCacheDir)?;
        let stem = format!("{id:016x}");

        for ext in CACHED_EXTENSIONS {
            let cached = dir.join(format!("{stem}.{ext}"));
            if cached.is_file() {
                return Ok(Some(cached));
            }
        }

        let tagged = lofty::read_from_path(source)?;
        let Some(picture) = best_picture(tagged.tags().iter().flat_map(|t| t.pictures().iter()))
        else {
            return Ok(None);
        };

        fs::create_dir_all(dir)?;
        let target = dir.join(format!("{stem}.{}", extension_for(picture)));
        fs::write(&target, picture.data())?;
        debug!(path = %target.display(), "extracted embedded artwork");
        Ok(Some(target))
    }

    /// Total bytes held by the cache. A missing directory counts as empty.
    pub fn size_bytes(&self) -> u64 {
        let Some(dir) = &self.dir else {
            return 0;
        };
        WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum()
    }

    /// Delete every cached image and return the bytes freed.
    pub fn clear(&self) -> Result<u64, ArtworkError> {
        let Some(dir) = &self.dir else {
            return Ok(0);
        };
        if !dir.exists() {
            return Ok(0);
        }

        let mut freed = 0;
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if meta.is_file() {
                fs::remove_file(entry.path())?;
                freed += meta.len();
            } else if meta.is_dir() {
                fs::remove_dir_all(entry.path())?;
            }
        }
        info!(dir = %dir.display(), freed, "artwork cache cleared");
        Ok(freed)
    }
}

/// Front cover if present, otherwise the first picture.
fn best_picture<'a>(pictures: impl Iterator<Item = &'a Picture>) -> Option<&'a Picture> {
    let mut first = None;
    for pic in pictures {
        if pic.pic_type() == PictureType::CoverFront {
            return Some(pic);
        }
        first.get_or_insert(pic);
    }
    first
}

fn extension_for(picture: &Picture) -> &'static str {
    match picture.mime_type() {
        Some(MimeType::Png) => "png",
        _ => "jpg",
    }
}
