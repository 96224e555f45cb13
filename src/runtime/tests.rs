use super::keys::handle_key;
use super::view::next_sleep_step;
use super::*;
use std::path::Path;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::PlaybackSettings;
use crate::engine::fake::{Call, FakeService};
use crate::library::{LibraryIndex, Track};
use crate::store::MemoryStore;

struct StaticIndex(Vec<Track>);

impl LibraryIndex for StaticIndex {
    fn query(&self) -> Vec<Track> {
        self.0.clone()
    }
}

fn t(title: &str) -> Track {
    let mut track = Track::from_path(Path::new(&format!("/music/{title}.mp3")));
    track.duration = Duration::from_secs(200);
    track
}

/// Connected coordinator with Alpha, Beta, Gamma loaded.
fn loaded() -> (Coordinator<FakeService>, FakeService, ViewState) {
    let mut c = Coordinator::new(
        Arc::new(StaticIndex(vec![t("Alpha"), t("Beta"), t("Gamma")])),
        Box::new(MemoryStore::default()),
        ArtworkCache::default(),
        &PlaybackSettings {
            progress_poll_ms: 3_600_000,
            ..PlaybackSettings::default()
        },
    );
    let svc = FakeService::default();
    c.connect(svc.clone());
    c.load();
    for _ in 0..100 {
        if !c.is_loading() {
            break;
        }
        c.wait_update(Duration::from_millis(20));
    }
    assert_eq!(c.tracks().len(), 3);
    (c, svc, ViewState::default())
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn press(c: &mut Coordinator<FakeService>, view: &mut ViewState, codes: &[KeyCode]) -> bool {
    let mut quit = false;
    for &code in codes {
        quit |= handle_key(key(code), c, view);
    }
    quit
}

#[test]
fn q_quits() {
    let (mut c, _, mut view) = loaded();
    assert!(press(&mut c, &mut view, &[KeyCode::Char('q')]));
}

#[test]
fn enter_plays_track_under_cursor() {
    let (mut c, svc, mut view) = loaded();
    press(&mut c, &mut view, &[KeyCode::Char('j'), KeyCode::Enter]);
    assert_eq!(c.current().map(|t| t.title.as_str()), Some("Beta"));
    assert_eq!(svc.calls()[0], Call::Load(t("Beta").id, true));
}

#[test]
fn cursor_stays_inside_list() {
    let (mut c, _, mut view) = loaded();
    press(&mut c, &mut view, &[KeyCode::Char('k')]);
    assert_eq!(view.cursor, 0);
    for _ in 0..10 {
        press(&mut c, &mut view, &[KeyCode::Down]);
    }
    assert_eq!(view.cursor, 2);
}

#[test]
fn filter_mode_edits_query_and_resets_cursor() {
    let (mut c, _, mut view) = loaded();
    press(&mut c, &mut view, &[KeyCode::Char('j'), KeyCode::Char('/')]);
    assert_eq!(view.mode, InputMode::Filter);

    // 'q' is text here, not quit.
    assert!(!press(&mut c, &mut view, &[KeyCode::Char('G'), KeyCode::Char('q')]));
    assert_eq!(c.query(), "Gq");
    press(&mut c, &mut view, &[KeyCode::Backspace]);
    assert_eq!(c.query(), "G");
    assert_eq!(view.cursor, 0);
    assert_eq!(c.visible_len(), 1);

    press(&mut c, &mut view, &[KeyCode::Enter]);
    assert_eq!(view.mode, InputMode::Normal);
    assert_eq!(c.query(), "G");

    press(&mut c, &mut view, &[KeyCode::Char('/'), KeyCode::Esc]);
    assert_eq!(c.query(), "");
    assert_eq!(c.visible_len(), 3);
}

#[test]
fn selection_keys() {
    let (mut c, _, mut view) = loaded();
    press(&mut c, &mut view, &[KeyCode::Char('v')]);
    assert!(c.selection_mode());

    // Enter toggles while selecting instead of playing.
    press(&mut c, &mut view, &[KeyCode::Char('j'), KeyCode::Enter]);
    assert_eq!(c.selection_len(), 2);
    assert!(c.current().is_none());

    press(&mut c, &mut view, &[KeyCode::Char('d')]);
    assert_eq!(c.visible_len(), 1);
    assert!(!c.selection_mode());
    assert_eq!(view.cursor, 0);

    press(&mut c, &mut view, &[KeyCode::Char('v'), KeyCode::Esc]);
    assert!(!c.selection_mode());
}

#[test]
fn sleep_key_cycles_steps() {
    assert_eq!(next_sleep_step(0), 15);
    assert_eq!(next_sleep_step(45), 60);
    assert_eq!(next_sleep_step(60), 0);

    let (mut c, _, mut view) = loaded();
    press(&mut c, &mut view, &[KeyCode::Char('t'), KeyCode::Char('t')]);
    assert_eq!(c.sleep_minutes(), 30);
}

#[test]
fn speed_keys_step_by_quarter() {
    let (mut c, svc, mut view) = loaded();
    press(&mut c, &mut view, &[KeyCode::Char('+'), KeyCode::Char('+'), KeyCode::Char('-')]);
    assert_eq!(c.speed(), 1.25);
    assert_eq!(svc.calls().last(), Some(&Call::Speed(1.25)));
}

#[test]
fn playlist_name_entry_and_add() {
    let (mut c, _, mut view) = loaded();
    press(&mut c, &mut view, &[KeyCode::Char('c')]);
    for ch in "Road trip".chars() {
        press(&mut c, &mut view, &[KeyCode::Char(ch)]);
    }
    press(&mut c, &mut view, &[KeyCode::Enter]);
    assert_eq!(view.mode, InputMode::Normal);
    assert_eq!(c.playlists().len(), 1);
    assert_eq!(c.playlists()[0].name, "Road trip");

    press(&mut c, &mut view, &[KeyCode::Char('j'), KeyCode::Char('A'), KeyCode::Char('A')]);
    assert_eq!(c.playlists()[0].track_ids, vec![t("Beta").id]);

    press(&mut c, &mut view, &[KeyCode::Char('P'), KeyCode::Enter]);
    assert_eq!(view.panel, Panel::Playlists);
    assert_eq!(c.current().map(|t| t.title.as_str()), Some("Beta"));
}

#[test]
fn notices_expire_from_view() {
    let mut view = ViewState::default();
    assert!(view.notice().is_none());
    view.push_notice("Shuffle on".to_string());
    assert_eq!(view.notice(), Some("Shuffle on"));
}
