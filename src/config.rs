//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive runtime
//! behavior and helpers to locate config, state and cache files on disk.

mod load;
mod schema;

pub use schema::*;
