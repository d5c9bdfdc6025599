//! Turns the binary point chunks of a Potree-style chunker into LAS 1.4
//! files, one per chunk, keeping position and color.

pub mod converter;
pub mod error;
pub mod model;
pub mod reader;
pub mod writer;

pub use converter::{run, run_with_cancel, BatchSummary, CancelToken, Config};
pub use error::{Error, Result};
