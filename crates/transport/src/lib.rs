//! # Transport
//!
//! Sentence transport and inertial source module.
//!
//! Responsibilities:
//! - Build data sources from the mission blueprint
//! - Replay recorded sentence logs group by group
//! - Generate mock NMEA and inertial traffic for development
//! - Own the serial device boundary behind `SentenceTransport`
//!
//! ## Feature Flags
//!
//! - `real-serial`: Enable real serial device transport (requires serialport crate)

pub mod error;
pub mod factory;
pub mod mock;
pub mod replay;

#[cfg(feature = "real-serial")]
pub mod serial;

pub use contracts::{ByteChunk, ChunkCallback, InertialSource, SampleCallback, SentenceTransport};
pub use error::{Result, TransportError};
pub use factory::{build_inertial_source, build_transport};
pub use mock::{MockInertialConfig, MockInertialSource, MockTransport, MockTransportConfig};
pub use replay::{ReplayConfig, ReplayTransport};

#[cfg(feature = "real-serial")]
pub use serial::{SerialConfig, SerialTransport};
