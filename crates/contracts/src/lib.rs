//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Fixes and samples are stamped with wall-clock seconds (f64, Unix epoch)
//! - Replay sources keep the relative spacing of their recorded groups

mod blueprint;
mod clock;
mod error;
mod geo;
mod heading;
mod overlay;
mod sample;
mod screen;
mod sentence;
mod source;
mod transform;

pub use blueprint::*;
pub use clock::epoch_seconds;
pub use error::*;
pub use geo::*;
pub use heading::*;
pub use overlay::*;
pub use sample::*;
pub use screen::*;
pub use sentence::*;
pub use source::{ByteChunk, ChunkCallback, InertialSource, SampleCallback, SentenceTransport};
pub use transform::ScreenTransform;
