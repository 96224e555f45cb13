//! Library index: walks the music directory and produces `Track` records.
//!
//! Scanning is a one-shot operation; the coordinator runs it off the runtime
//! thread and treats the returned order (by title) as authoritative.

mod lyrics;
mod model;
mod scan;

pub use lyrics::resolve_lyrics;
pub use model::*;
pub use scan::{DirectoryIndex, LibraryIndex, scan};

#[cfg(test)]
mod tests;
