use std::env;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::config::Settings;
use crate::coordinator::Coordinator;
use crate::engine::{EngineEvent, EngineHandle};
use crate::library::DirectoryIndex;
use crate::session::{ArtworkCache, SessionSync};
use crate::store::TomlStateFile;

mod event_loop;
mod keys;
mod logging;
mod settings;
mod view;

pub use view::{InputMode, Panel, ViewState};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();
    logging::init(&settings);
    if let Some(problem) = config_problem {
        warn!("{problem}");
    }

    let library = Arc::new(DirectoryIndex::new(
        library_root(&settings),
        settings.library.clone(),
    ));
    let store = Box::new(TomlStateFile::new(
        settings
            .state_path()
            .unwrap_or_else(|| PathBuf::from("cadenza-state.toml")),
    ));
    info!(
        root = %library.root().display(),
        state = %store.path().display(),
        version = env!("CARGO_PKG_VERSION"),
        "starting"
    );
    let artwork = ArtworkCache::new(settings.artwork_cache_dir());

    let (events_tx, events_rx) = mpsc::channel::<EngineEvent>();
    let session_settings = settings.session.clone();
    let session_artwork = artwork.clone();
    let engine = EngineHandle::spawn(
        move |tx| {
            if session_settings.mpris {
                SessionSync::with_mpris(&session_settings.identity, session_artwork, tx)
            } else {
                SessionSync::new(session_artwork)
            }
        },
        events_tx,
    );
    let surface = engine.surface_handle();

    let mut coordinator = Coordinator::new(library, store, artwork, &settings.playback);
    coordinator.load();
    // Connected once the engine reports ready.
    let mut pending_engine = Some(engine);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut view = ViewState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &mut coordinator,
        &mut pending_engine,
        &events_rx,
        &surface,
        &mut view,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(engine) = coordinator.disconnect().or(pending_engine) {
        engine.shutdown();
    }
    info!("bye");

    run_result
}

/// First CLI argument, then `library.root`, then `~/Music`.
fn library_root(settings: &Settings) -> PathBuf {
    env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| settings.library.root.clone())
        .or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join("Music")))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests;
