//! DirectionOverlay trait - Overlay output interface
//!
//! Defines the abstract interface for direction overlays.

use serde::{Deserialize, Serialize};

use crate::{ContractError, GeoPoint};

/// The drawn pointer segment, in geographic space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayLine {
    /// Current position (segment origin).
    pub origin: GeoPoint,

    /// Viewport exit point mapped back to geographic space.
    pub exit: GeoPoint,

    /// Heading the segment points along (degrees, [0, 360)).
    pub heading_deg: f64,

    /// When the projection was computed (Unix epoch seconds).
    pub computed_at: f64,
}

/// One projector recomputation result: a replacement line, or nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayUpdate {
    /// Replace the previous segment with this one.
    Line(OverlayLine),

    /// Remove whatever segment is currently shown.
    Clear,
}

/// Direction overlay trait
///
/// All overlay backends implement this trait. Per recomputation the core
/// delivers exactly zero or one segment; `replace` swaps out the previous
/// segment wholesale, backends never accumulate history.
#[trait_variant::make(DirectionOverlay: Send)]
pub trait LocalDirectionOverlay {
    /// Overlay name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Replace the currently shown segment
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn replace(&mut self, line: &OverlayLine) -> Result<(), ContractError>;

    /// Remove the currently shown segment, if any
    async fn clear(&mut self) -> Result<(), ContractError>;

    /// Close the backend
    async fn close(&mut self) -> Result<(), ContractError>;
}
