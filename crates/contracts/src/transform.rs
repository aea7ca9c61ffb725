//! ScreenTransform trait - External map transform boundary
//!
//! The surrounding map component supplies both coordinate directions plus
//! the current viewport. The core borrows them per projection and makes no
//! assumption about datum or projection beyond round-trip consistency
//! within the displayed viewport.

use crate::{GeoPoint, ScreenPoint, Viewport};

/// Geo ↔ screen transform pair owned by the external map component.
pub trait ScreenTransform: Send + Sync {
    /// Map a geographic point into viewport pixel space.
    fn geo_to_screen(&self, point: GeoPoint) -> ScreenPoint;

    /// Map a viewport pixel back to geographic space.
    fn screen_to_geo(&self, point: ScreenPoint) -> GeoPoint;

    /// Current viewport rectangle in pixels.
    fn viewport(&self) -> Viewport;
}
