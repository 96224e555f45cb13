//! Test doubles: a scriptable `Output` that needs no audio device, and a
//! recording `PlaybackService` for coordinator tests.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::{Track, TrackId};

use super::output::{EngineError, Output};
use super::types::{EngineStatus, PlaybackService};

#[derive(Debug, Default)]
pub struct FakeState {
    pub bound: Option<PathBuf>,
    pub playing: bool,
    pub position: Duration,
    pub duration: Duration,
    pub speed: f32,
    pub finished: bool,
    pub broken: HashSet<PathBuf>,
    pub speed_unsupported: bool,
}

#[derive(Clone, Default)]
pub struct FakeOutput {
    pub state: Arc<Mutex<FakeState>>,
}

impl Output for FakeOutput {
    fn open(&mut self, track: &Track) -> Result<(), EngineError> {
        let mut s = self.state.lock().unwrap();
        if s.broken.contains(&track.path) {
            return Err(EngineError::Decode {
                path: track.path.clone(),
                reason: "corrupt".to_string(),
            });
        }
        s.bound = Some(track.path.clone());
        s.playing = false;
        s.position = Duration::ZERO;
        s.duration = track.duration;
        s.finished = false;
        Ok(())
    }

    fn play(&mut self) {
        self.state.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.state.lock().unwrap().playing = false;
    }

    fn stop(&mut self) {
        let mut s = self.state.lock().unwrap();
        s.bound = None;
        s.playing = false;
    }

    fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
        self.state.lock().unwrap().position = position;
        Ok(())
    }

    fn set_speed(&mut self, factor: f32) -> Result<(), EngineError> {
        let mut s = self.state.lock().unwrap();
        if s.speed_unsupported && factor != 1.0 {
            return Err(EngineError::UnsupportedSpeed(factor));
        }
        s.speed = factor;
        Ok(())
    }

    fn position(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    fn duration(&self) -> Duration {
        self.state.lock().unwrap().duration
    }

    fn finished(&self) -> bool {
        self.state.lock().unwrap().finished
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(TrackId, bool),
    Toggle,
    Seek(Duration),
    Speed(f32),
}

#[derive(Clone, Default)]
pub struct FakeService {
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub status: Rc<RefCell<EngineStatus>>,
}

impl FakeService {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl PlaybackService for FakeService {
    fn load_and_play(&self, track: &Track, autoplay: bool) {
        self.calls.borrow_mut().push(Call::Load(track.id, autoplay));
    }

    fn toggle_play_pause(&self) {
        self.calls.borrow_mut().push(Call::Toggle);
    }

    fn seek(&self, position: Duration) {
        self.calls.borrow_mut().push(Call::Seek(position));
    }

    fn set_speed(&self, factor: f32) {
        self.calls.borrow_mut().push(Call::Speed(factor));
    }

    fn status(&self) -> EngineStatus {
        self.status.borrow().clone()
    }
}
