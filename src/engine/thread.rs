use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::session::SessionSync;

use super::output::{EngineError, Output};
use super::player::Engine;
use super::types::{EngineCmd, EngineEvent, RemoteCmd, StatusHandle, TransportState};

/// How often the thread wakes up without commands to check for end of track
/// and refresh the published position.
const TICK: Duration = Duration::from_millis(200);

pub(super) fn spawn_engine_thread<O, F>(
    open_output: F,
    rx: Receiver<EngineCmd>,
    status: StatusHandle,
    events: Sender<EngineEvent>,
    session: SessionSync,
) -> JoinHandle<()>
where
    O: Output,
    F: FnOnce() -> Result<O, EngineError> + Send + 'static,
{
    thread::spawn(move || {
        let output = match open_output() {
            Ok(o) => o,
            Err(e) => {
                // Never connects; every coordinator delegation stays a no-op.
                error!(error = %e, "engine could not open its output");
                return;
            }
        };

        let mut engine = Engine::new(output);
        publish(&engine, &status, &session);
        let _ = events.send(EngineEvent::Ready);
        info!("engine ready");

        loop {
            match rx.recv_timeout(TICK) {
                Ok(EngineCmd::Quit) => break,
                Ok(cmd) => {
                    handle_cmd(&mut engine, cmd, &events);
                    publish(&engine, &status, &session);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if engine.take_finished() {
                        publish(&engine, &status, &session);
                        if let Some(id) = engine.current().map(|t| t.id) {
                            let _ = events.send(EngineEvent::TransportChanged { id, playing: false });
                            let _ = events.send(EngineEvent::TrackEnded { id });
                        }
                    } else if engine.state().is_playing() {
                        let position = engine.position();
                        if let Ok(mut s) = status.lock() {
                            s.position = position;
                            s.duration = engine.duration();
                        }
                        session.update_position(position);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        engine.stop();
        // Leave the session showing a stopped player rather than a stale "Playing".
        if let Ok(mut s) = status.lock() {
            s.state = TransportState::Paused;
        }
        session.clear();
        info!("engine stopped");
    })
}

fn handle_cmd<O: Output>(engine: &mut Engine<O>, cmd: EngineCmd, events: &Sender<EngineEvent>) {
    match cmd {
        EngineCmd::LoadAndPlay { track, autoplay } => {
            engine.load_and_play(&track, autoplay);
        }
        EngineCmd::TogglePlayPause => {
            engine.toggle_play_pause();
        }
        EngineCmd::Seek(position) => engine.seek(position),
        EngineCmd::SetSpeed(factor) => engine.set_speed(factor),
        EngineCmd::Remote(remote) => handle_remote(engine, remote, events),
        EngineCmd::Quit => {}
    }
}

/// Answer a media-session command. Next/previous belong to the coordinator;
/// everything else is a transport change the engine can make on its own.
fn handle_remote<O: Output>(engine: &mut Engine<O>, cmd: RemoteCmd, events: &Sender<EngineEvent>) {
    debug!(?cmd, "remote command");
    let changed = match cmd {
        RemoteCmd::Play => engine.play().then_some(true),
        RemoteCmd::Pause | RemoteCmd::Stop => engine.pause().then_some(false),
        RemoteCmd::PlayPause => engine.toggle_play_pause(),
        RemoteCmd::Next => {
            let _ = events.send(EngineEvent::RemoteNext);
            None
        }
        RemoteCmd::Previous => {
            let _ = events.send(EngineEvent::RemotePrevious);
            None
        }
        RemoteCmd::SeekBy(offset_micros) => {
            let current = engine.position().as_micros() as i64;
            let target = current.saturating_add(offset_micros).max(0) as u64;
            engine.seek(Duration::from_micros(target));
            None
        }
        RemoteCmd::SetPosition(position) => {
            engine.seek(position);
            None
        }
        RemoteCmd::Quit => {
            let _ = events.send(EngineEvent::RemoteQuit);
            None
        }
    };

    if let (Some(playing), Some(id)) = (changed, engine.current().map(|t| t.id)) {
        let _ = events.send(EngineEvent::TransportChanged { id, playing });
    }
}

fn publish<O: Output>(engine: &Engine<O>, status: &StatusHandle, session: &SessionSync) {
    let snapshot = engine.status();
    if let Ok(mut s) = status.lock() {
        *s = snapshot.clone();
    }
    session.publish(&snapshot);
}
