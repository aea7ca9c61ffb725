//! Overlay backend implementations
//!
//! Contains LogOverlay and FileOverlay.

mod file;
mod log;

pub use self::file::FileOverlay;
pub use self::log::LogOverlay;
