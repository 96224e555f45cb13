use super::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn display_prefers_artist_dash_title() {
    let mut track = Track::from_path(Path::new("/tmp/Song.mp3"));
    assert_eq!(track.display(), "Song");

    track.artist = Some("Artist".to_string());
    assert_eq!(track.display(), "Artist - Song");

    track.artist = Some("   ".to_string());
    assert_eq!(track.display(), "Song");
}

#[test]
fn with_lyrics_replaces_only_lyrics() {
    let track = Track::from_path(Path::new("/tmp/Song.mp3"));
    let updated = track.with_lyrics("la la".to_string());
    assert_eq!(updated.id, track.id);
    assert_eq!(updated.title, track.title);
    assert_eq!(updated.lyrics.as_deref(), Some("la la"));
    assert_eq!(track.lyrics, None);
}

#[test]
fn file_uri_escapes_spaces() {
    assert_eq!(
        file_uri(Path::new("/music/My Song.mp3")),
        "file:///music/My%20Song.mp3"
    );
}

#[test]
fn file_uri_encodes_reserved_and_non_ascii_bytes() {
    assert_eq!(
        file_uri(Path::new("/music/Sigur Rós/[live]; #1?.flac")),
        "file:///music/Sigur%20R%C3%B3s/%5Blive%5D%3B%20%231%3F.flac"
    );
}

#[cfg(unix)]
#[test]
fn file_uri_keeps_non_utf8_bytes() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let path = Path::new(OsStr::from_bytes(b"/music/caf\xe9.mp3"));
    assert_eq!(file_uri(path), "file:///music/caf%E9.mp3");
}

#[test]
fn lyrics_prefer_lrc_over_txt() {
    let dir = tempdir().unwrap();
    let audio = dir.path().join("song.mp3");
    fs::write(&audio, b"not real").unwrap();
    fs::write(dir.path().join("song.lrc"), "[00:01.00] from lrc").unwrap();
    fs::write(dir.path().join("song.txt"), "from txt").unwrap();

    assert_eq!(resolve_lyrics(&audio).as_deref(), Some("[00:01.00] from lrc"));
}

#[test]
fn lyrics_skip_empty_sidecar() {
    let dir = tempdir().unwrap();
    let audio = dir.path().join("song.mp3");
    fs::write(&audio, b"not real").unwrap();
    fs::write(dir.path().join("song.lrc"), "   \n").unwrap();
    fs::write(dir.path().join("song.txt"), "from txt").unwrap();

    assert_eq!(resolve_lyrics(&audio).as_deref(), Some("from txt"));
}

#[test]
fn missing_lyrics_is_none() {
    let dir = tempdir().unwrap();
    let audio = dir.path().join("song.mp3");
    fs::write(&audio, b"not real").unwrap();

    assert_eq!(resolve_lyrics(&audio), None);
}
