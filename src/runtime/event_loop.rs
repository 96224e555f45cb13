use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use super::keys::handle_key;
use super::view::ViewState;
use crate::coordinator::Coordinator;
use crate::engine::{EngineEvent, EngineHandle};
use crate::session::SurfaceHandle;
use crate::ui;

/// Main terminal event loop: engine events, background updates, drawing and
/// input, all on this thread. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    coordinator: &mut Coordinator<EngineHandle>,
    pending_engine: &mut Option<EngineHandle>,
    events: &Receiver<EngineEvent>,
    surface: &SurfaceHandle,
    view: &mut ViewState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = events.try_recv() {
            match ev {
                EngineEvent::Ready => {
                    if let Some(engine) = pending_engine.take() {
                        coordinator.connect(engine);
                        info!("engine connected");
                    }
                }
                EngineEvent::RemoteQuit => {
                    info!("quit requested over MPRIS");
                    return Ok(());
                }
                other => coordinator.handle_engine_event(other),
            }
        }

        coordinator.pump();
        for notice in coordinator.drain_notices() {
            view.push_notice(notice);
        }
        view.clamp(coordinator.visible_len());

        let card = surface.lock().ok().and_then(|s| s.clone());
        terminal.draw(|f| ui::draw(f, coordinator, view, card.as_ref()))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key(key, coordinator, view) {
                    break;
                }
            }
        }
    }

    Ok(())
}
