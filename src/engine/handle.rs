use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use crate::library::Track;
use crate::session::{SessionSync, SurfaceHandle};

use super::output::{EngineError, Output};
use super::sink::RodioOutput;
use super::thread::spawn_engine_thread;
use super::types::{EngineCmd, EngineEvent, EngineStatus, PlaybackService, StatusHandle};

/// Connection to the engine thread.
///
/// Commands are fire-and-forget; queries read the snapshot the thread
/// republishes after every transition.
pub struct EngineHandle {
    tx: Sender<EngineCmd>,
    status: StatusHandle,
    surface: SurfaceHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl EngineHandle {
    /// Spawn the engine on the default audio device.
    ///
    /// `make_session` receives the command sender so remote controls can reach
    /// the engine. `events` receives [`EngineEvent::Ready`] once commands will
    /// be honoured.
    pub fn spawn(
        make_session: impl FnOnce(Sender<EngineCmd>) -> SessionSync,
        events: Sender<EngineEvent>,
    ) -> Self {
        Self::spawn_with(RodioOutput::open_default, make_session, events)
    }

    pub fn spawn_with<O, F>(
        open_output: F,
        make_session: impl FnOnce(Sender<EngineCmd>) -> SessionSync,
        events: Sender<EngineEvent>,
    ) -> Self
    where
        O: Output,
        F: FnOnce() -> Result<O, EngineError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let status: StatusHandle = Arc::new(Mutex::new(EngineStatus::default()));
        let session = make_session(tx.clone());
        let surface = session.surface_handle();

        let join = spawn_engine_thread(open_output, rx, status.clone(), events, session);

        Self {
            tx,
            status,
            surface,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn surface_handle(&self) -> SurfaceHandle {
        self.surface.clone()
    }

    fn send(&self, cmd: EngineCmd) {
        if let Err(e) = self.tx.send(cmd) {
            debug!(cmd = ?e.0, "engine thread gone, command dropped");
        }
    }

    /// Stop the engine thread and wait for it to release the output.
    pub fn shutdown(&self) {
        self.send(EngineCmd::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl PlaybackService for EngineHandle {
    fn load_and_play(&self, track: &Track, autoplay: bool) {
        self.send(EngineCmd::LoadAndPlay {
            track: Box::new(track.clone()),
            autoplay,
        });
    }

    fn toggle_play_pause(&self) {
        self.send(EngineCmd::TogglePlayPause);
    }

    fn seek(&self, position: Duration) {
        self.send(EngineCmd::Seek(position));
    }

    fn set_speed(&self, factor: f32) {
        self.send(EngineCmd::SetSpeed(factor));
    }

    fn status(&self) -> EngineStatus {
        self.status.lock().map(|s| s.clone()).unwrap_or_default()
    }
}
