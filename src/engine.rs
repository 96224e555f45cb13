//! Playback engine: owns the single decode/output pipeline.
//!
//! The engine runs on its own thread (the output stream is not `Send`), takes
//! commands over a channel and publishes a status snapshot after every
//! transition. Callers hold an [`EngineHandle`], the connection through which
//! all transport operations flow.

mod handle;
mod output;
mod player;
mod sink;
mod thread;
mod types;

pub use handle::EngineHandle;
pub use output::{EngineError, Output};
pub use player::Engine;
pub use types::*;

#[cfg(test)]
pub(crate) mod fake;
