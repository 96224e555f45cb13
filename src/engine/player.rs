//! Synchronous engine core, independent of threads and channels.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::library::Track;

use super::output::{EngineError, Output};
use super::types::{EngineStatus, TransportState};

pub struct Engine<O: Output> {
    output: O,
    current: Option<Track>,
    state: TransportState,
    speed: f32,
}

impl<O: Output> Engine<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            current: None,
            state: TransportState::Idle,
            speed: 1.0,
        }
    }

    /// Bind `track` and optionally start it.
    ///
    /// A track that cannot be opened is logged and ignored; whatever was bound
    /// before keeps playing. Returns whether the new track was bound.
    pub fn load_and_play(&mut self, track: &Track, autoplay: bool) -> bool {
        if let Err(e) = self.output.open(track) {
            warn!(track = %track.title, error = %e, "failed to bind track");
            return false;
        }

        self.current = Some(track.clone());
        if autoplay {
            self.output.play();
            self.state = TransportState::Playing;
        } else {
            self.state = TransportState::Loaded;
        }
        info!(track = %track.title, autoplay, "track bound");
        true
    }

    /// Flip between playing and paused. Returns the new playing flag, or
    /// `None` when nothing is bound.
    pub fn toggle_play_pause(&mut self) -> Option<bool> {
        self.current.as_ref()?;
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        Some(self.state.is_playing())
    }

    /// Start output if a track is bound and not already playing.
    pub fn play(&mut self) -> bool {
        if self.current.is_none() || self.state.is_playing() {
            return false;
        }
        self.output.play();
        self.state = TransportState::Playing;
        true
    }

    pub fn pause(&mut self) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.output.pause();
        self.state = TransportState::Paused;
        true
    }

    pub fn seek(&mut self, position: Duration) {
        if self.current.is_none() {
            return;
        }
        let duration = self.duration();
        let target = if duration.is_zero() {
            position
        } else {
            position.min(duration)
        };
        if let Err(e) = self.output.seek(target) {
            warn!(error = %e, "seek ignored");
        }
    }

    /// Adjust the playback rate, falling back to normal speed when the output refuses.
    pub fn set_speed(&mut self, factor: f32) {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            1.0
        };

        match self.output.set_speed(factor) {
            Ok(()) => self.speed = factor,
            Err(EngineError::UnsupportedSpeed(f)) => {
                debug!(speed = f, "speed unsupported, using normal rate");
                let _ = self.output.set_speed(1.0);
                self.speed = 1.0;
            }
            Err(e) => warn!(error = %e, "failed to change speed"),
        }
    }

    pub fn position(&self) -> Duration {
        if self.current.is_none() {
            return Duration::ZERO;
        }
        let pos = self.output.position();
        let duration = self.duration();
        if duration.is_zero() {
            pos
        } else {
            pos.min(duration)
        }
    }

    pub fn duration(&self) -> Duration {
        if self.current.is_none() {
            return Duration::ZERO;
        }
        self.output.duration()
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Detect the end of the bound content. Fires once per playthrough.
    pub fn take_finished(&mut self) -> bool {
        if self.state.is_playing() && self.output.finished() {
            self.state = TransportState::Paused;
            return true;
        }
        false
    }

    pub fn stop(&mut self) {
        self.output.stop();
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            track: self.current.clone(),
            state: self.state,
            position: self.position(),
            duration: self.duration(),
            speed: self.speed,
        }
    }
}
