use super::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::engine::TransportState;
use crate::library::ArtworkLocator;

fn track(path: &str) -> Track {
    let mut t = Track::from_path(Path::new(path));
    t.artist = Some("Artist".into());
    t.album = Some("Album".into());
    t.duration = Duration::from_secs(180);
    t
}

fn status(track: Option<Track>, state: TransportState) -> EngineStatus {
    EngineStatus {
        duration: track.as_ref().map(|t| t.duration).unwrap_or_default(),
        track,
        state,
        ..EngineStatus::default()
    }
}

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn descriptor_apply_reports_track_changes() {
    let mut d = SessionDescriptor::default();
    let a = track("/music/a.mp3");

    assert!(d.apply(&status(Some(a.clone()), TransportState::Loaded)));
    assert_eq!(d.title.as_deref(), Some("a"));
    assert_eq!(d.url.as_deref(), Some("file:///music/a.mp3"));

    d.artwork = Artwork::Resolved(PathBuf::from("/cache/a.jpg"));
    assert!(!d.apply(&status(Some(a), TransportState::Playing)));
    assert_eq!(d.state, TransportState::Playing);
    assert!(matches!(d.artwork, Artwork::Resolved(_)));

    assert!(d.apply(&status(Some(track("/music/b.mp3")), TransportState::Playing)));
    assert_eq!(d.artwork, Artwork::Placeholder);
}

#[test]
fn surface_is_absent_without_track() {
    assert!(StatusSurface::render(&SessionDescriptor::default()).is_none());
}

#[test]
fn surface_actions_and_priority_follow_transport() {
    let mut d = SessionDescriptor::default();
    d.apply(&status(Some(track("/music/a.mp3")), TransportState::Playing));

    let playing = StatusSurface::render(&d).unwrap();
    assert_eq!(
        playing.actions,
        [SurfaceAction::Previous, SurfaceAction::Pause, SurfaceAction::Next]
    );
    assert_eq!(playing.priority, SurfacePriority::Ongoing);
    assert!(!playing.dismissable);
    assert!(playing.artwork.is_none());

    d.state = TransportState::Paused;
    let paused = StatusSurface::render(&d).unwrap();
    assert_eq!(
        paused.actions,
        [SurfaceAction::Previous, SurfaceAction::Play, SurfaceAction::Next]
    );
    assert_eq!(paused.priority, SurfacePriority::Low);
    assert!(paused.dismissable);
}

#[test]
fn surface_uses_unknown_placeholders() {
    let mut d = SessionDescriptor::default();
    d.apply(&status(
        Some(Track::from_path(Path::new("/music/x.mp3"))),
        TransportState::Loaded,
    ));
    let s = StatusSurface::render(&d).unwrap();
    assert_eq!(s.artist, "Unknown Artist");
    assert_eq!(s.album, "Unknown Album");
}

#[test]
fn publish_resolves_sidecar_artwork_in_background() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.jpg");
    fs::write(&cover, b"jpeg").unwrap();

    let mut t = track("/music/a.mp3");
    t.artwork = Some(ArtworkLocator::File(cover.clone()));

    let sync = SessionSync::new(ArtworkCache::new(None));
    let surface = sync.surface_handle();
    sync.publish(&status(Some(t), TransportState::Playing));

    // Shown immediately with the placeholder.
    assert!(surface.lock().unwrap().is_some());

    assert!(wait_for(|| sync.descriptor().artwork == Artwork::Resolved(cover.clone())));
    assert!(wait_for(|| {
        surface
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|s| s.artwork.clone())
            == Some(cover.clone())
    }));
}

#[test]
fn late_artwork_for_previous_track_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let cover = dir.path().join("cover.png");
    fs::write(&cover, b"png").unwrap();

    let mut a = track("/music/a.mp3");
    a.artwork = Some(ArtworkLocator::File(cover));
    let b = track("/music/b.mp3");

    let sync = SessionSync::new(ArtworkCache::new(None));
    sync.publish(&status(Some(a), TransportState::Playing));
    sync.publish(&status(Some(b.clone()), TransportState::Playing));

    std::thread::sleep(Duration::from_millis(100));
    let d = sync.descriptor();
    assert_eq!(d.track_id, Some(b.id));
    assert_eq!(d.artwork, Artwork::Placeholder);
}

#[test]
fn update_position_and_clear() {
    let sync = SessionSync::new(ArtworkCache::default());
    sync.publish(&status(Some(track("/music/a.mp3")), TransportState::Playing));

    sync.update_position(Duration::from_secs(42));
    assert_eq!(sync.descriptor().position, Duration::from_secs(42));
    assert_eq!(
        sync.surface_handle().lock().unwrap().as_ref().unwrap().position,
        Duration::from_secs(42)
    );

    sync.clear();
    assert_eq!(sync.descriptor(), SessionDescriptor::default());
    assert!(sync.surface_handle().lock().unwrap().is_none());
}

#[test]
fn artwork_cache_size_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("art");
    let cache = ArtworkCache::new(Some(cache_dir.clone()));
    assert_eq!(cache.size_bytes(), 0);
    assert_eq!(cache.clear().unwrap(), 0);

    fs::create_dir_all(&cache_dir).unwrap();
    fs::write(cache_dir.join("1.jpg"), vec![0u8; 100]).unwrap();
    fs::write(cache_dir.join("2.png"), vec![0u8; 50]).unwrap();
    assert_eq!(cache.size_bytes(), 150);

    assert_eq!(cache.clear().unwrap(), 150);
    assert_eq!(cache.size_bytes(), 0);
    assert!(cache_dir.exists());
}

#[test]
fn embedded_artwork_reuses_cached_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let t = {
        let mut t = track("/music/does-not-exist.mp3");
        t.artwork = Some(ArtworkLocator::Embedded(t.path.clone()));
        t
    };
    let cached = dir.path().join(format!("{:016x}.png", t.id));
    fs::write(&cached, b"png").unwrap();

    let cache = ArtworkCache::new(Some(dir.path().to_path_buf()));
    assert_eq!(cache.resolve(&t).unwrap(), Some(cached));
}

#[test]
fn embedded_artwork_needs_cache_dir() {
    let mut t = track("/music/a.mp3");
    t.artwork = Some(ArtworkLocator::Embedded(t.path.clone()));
    let err = ArtworkCache::new(None).resolve(&t).unwrap_err();
    assert!(matches!(err, ArtworkError::NoCacheDir));
}

#[test]
fn track_without_artwork_resolves_to_none() {
    let cache = ArtworkCache::default();
    assert_eq!(cache.resolve(&track("/music/a.mp3")).unwrap(), None);
}
