//! `rodio`-backed output.
//!
//! Opening a track decodes it into a fresh paused `Sink`; the previous sink is
//! only stopped once the new one is ready, so a failed open leaves the old
//! content bound.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::library::Track;

use super::output::{EngineError, Output};

pub struct RodioOutput {
    stream: OutputStream,
    sink: Option<Sink>,
    duration: Duration,
    speed: f32,
}

impl RodioOutput {
    /// Open the default output device. Must be called on the thread that will own it.
    pub fn open_default() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::NoDevice(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped; that would garble the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            duration: Duration::ZERO,
            speed: 1.0,
        })
    }
}

impl Output for RodioOutput {
    fn open(&mut self, track: &Track) -> Result<(), EngineError> {
        let file = File::open(&track.path).map_err(|source| EngineError::Open {
            path: track.path.clone(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
            path: track.path.clone(),
            reason: e.to_string(),
        })?;

        let duration = source
            .total_duration()
            .filter(|d| !d.is_zero())
            .unwrap_or(track.duration);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.pause();
        sink.set_speed(self.speed);
        sink.append(source);

        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.duration = duration;
        Ok(())
    }

    fn play(&mut self) {
        if let Some(s) = &self.sink {
            s.play();
        }
    }

    fn pause(&mut self) {
        if let Some(s) = &self.sink {
            s.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.duration = Duration::ZERO;
    }

    fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
        match &self.sink {
            Some(s) => s
                .try_seek(position)
                .map_err(|e| EngineError::Seek(e.to_string())),
            None => Ok(()),
        }
    }

    fn set_speed(&mut self, factor: f32) -> Result<(), EngineError> {
        self.speed = factor;
        if let Some(s) = &self.sink {
            s.set_speed(factor);
        }
        Ok(())
    }

    fn position(&self) -> Duration {
        self.sink.as_ref().map_or(Duration::ZERO, |s| s.get_pos())
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn finished(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.empty())
    }
}
