//! Source traits - Transport and sensor abstraction
//!
//! Defines unified interfaces for the byte transport and the inertial
//! sample source, decoupling the pipeline from concrete backends.
//! Real serial hardware, file replay and mock generators all share them.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{ContractError, RawSample};

/// Raw byte delivery unit from the serial data service.
///
/// The service multiplexes several logical channels over one device; each
/// chunk is tagged so consumers can filter to the channel they own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByteChunk {
    /// Logical channel id (position sentences arrive on channel 2).
    pub channel: u8,

    /// Raw bytes as delivered, no line framing applied yet.
    pub payload: Bytes,

    /// Delivery timestamp (Unix epoch seconds).
    pub timestamp: f64,
}

/// Byte chunk callback type
///
/// When the transport produces data it sends a `ByteChunk` through this
/// callback. Uses `Arc` to allow callback sharing across contexts.
pub type ChunkCallback = Arc<dyn Fn(ByteChunk) + Send + Sync>;

/// Sentence transport trait
///
/// Abstracts the serial data service boundary. Implementations own the
/// underlying connection exclusively.
///
/// # Example
///
/// ```ignore
/// let transport: Box<dyn SentenceTransport> = build_transport(&config)?;
/// transport.start(Arc::new(|chunk| {
///     println!("chunk on channel {}", chunk.channel);
/// }))?;
/// // ... consume ...
/// transport.stop();
/// ```
pub trait SentenceTransport: Send + Sync {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Logical channel this transport delivers.
    fn channel(&self) -> u8;

    /// Establish delivery of byte chunks.
    ///
    /// Repeated calls while running are idempotent. Only resource
    /// acquisition failures (device open, file open) are returned;
    /// everything after a successful start is absorbed or latched.
    ///
    /// # Errors
    /// Returns a bind error when the underlying resource cannot be opened.
    fn start(&self, callback: ChunkCallback) -> Result<(), ContractError>;

    /// Tear down delivery and release the connection.
    ///
    /// Pending buffered data is discarded; there is no drain-before-close.
    fn stop(&self);

    /// Check whether delivery is currently established.
    fn is_running(&self) -> bool;

    /// Latched transport fault, if the feed died after a successful start.
    ///
    /// Connection loss is fatal to the data flow: no automatic reconnect,
    /// the owner polls this and decides whether to rebuild the pipeline.
    fn fault(&self) -> Option<String> {
        None
    }
}

/// Inertial sample callback type
pub type SampleCallback = Arc<dyn Fn(RawSample) + Send + Sync>;

/// Inertial/magnetic sample source trait
///
/// Mirrors the device sensor framework: callbacks fire on the source's own
/// context with no ordering guarantee relative to other sources, and must
/// only do bounded, non-blocking work.
pub trait InertialSource: Send + Sync {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Register the sample callback and begin delivery.
    ///
    /// # Errors
    /// Returns a bind error when the sensor cannot be acquired.
    fn start(&self, callback: SampleCallback) -> Result<(), ContractError>;

    /// Unregister and stop delivery.
    fn stop(&self);

    /// Check whether delivery is currently established.
    fn is_running(&self) -> bool;
}
