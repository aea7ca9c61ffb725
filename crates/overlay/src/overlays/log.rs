//! LogOverlay - traces each replace/clear via structured logging

use contracts::{ContractError, DirectionOverlay, OverlayLine};
use tracing::{info, instrument};

/// Overlay backend that logs the current segment for debugging
pub struct LogOverlay {
    name: String,
}

impl LogOverlay {
    /// Create a new LogOverlay with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DirectionOverlay for LogOverlay {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_overlay_replace",
        skip(self, line),
        fields(overlay = %self.name)
    )]
    async fn replace(&mut self, line: &OverlayLine) -> Result<(), ContractError> {
        info!(
            overlay = %self.name,
            heading = line.heading_deg,
            origin_lat = line.origin.latitude,
            origin_lon = line.origin.longitude,
            exit_lat = line.exit.latitude,
            exit_lon = line.exit.longitude,
            "direction segment replaced"
        );
        Ok(())
    }

    #[instrument(name = "log_overlay_clear", skip(self))]
    async fn clear(&mut self) -> Result<(), ContractError> {
        info!(overlay = %self.name, "direction segment cleared");
        Ok(())
    }

    #[instrument(name = "log_overlay_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(overlay = %self.name, "LogOverlay closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::GeoPoint;

    #[tokio::test]
    async fn test_log_overlay_replace() {
        let mut overlay = LogOverlay::new("test_log");
        let line = OverlayLine {
            origin: GeoPoint::new(40.0, -74.0),
            exit: GeoPoint::new(40.001, -74.0),
            heading_deg: 0.0,
            computed_at: 1.0,
        };

        assert!(overlay.replace(&line).await.is_ok());
        assert!(overlay.clear().await.is_ok());
    }

    #[tokio::test]
    async fn test_log_overlay_name() {
        let overlay = LogOverlay::new("my_logger");
        assert_eq!(overlay.name(), "my_logger");
    }
}
