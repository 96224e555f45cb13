use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::library::Track;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audio output device: {0}")]
    NoDevice(String),
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("cannot decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("seek failed: {0}")]
    Seek(String),
    #[error("playback speed {0} is not supported by this output")]
    UnsupportedSpeed(f32),
}

/// A decode/output pipeline the engine drives.
///
/// `open` replaces whatever was bound before, leaving the new content paused
/// at the start. On error the previous content must stay bound.
pub trait Output {
    fn open(&mut self, track: &Track) -> Result<(), EngineError>;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn seek(&mut self, position: Duration) -> Result<(), EngineError>;
    fn set_speed(&mut self, factor: f32) -> Result<(), EngineError>;
    fn position(&self) -> Duration;
    fn duration(&self) -> Duration;
    /// True once the bound content has been played out.
    fn finished(&self) -> bool;
}
