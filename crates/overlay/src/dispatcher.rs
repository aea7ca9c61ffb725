//! OverlayDispatcher - main loop for fan-out to overlay backends

use metrics::counter;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{OverlayConfig, OverlayKind, OverlayUpdate};

use crate::error::OverlayError;
use crate::handle::OverlayHandle;
use crate::metrics::OverlaySnapshot;
use crate::overlays::{FileOverlay, LogOverlay};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Overlay backend configurations
    pub overlays: Vec<OverlayConfig>,
}

/// Builder for creating an OverlayDispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<OverlayUpdate>,
}

impl DispatcherBuilder {
    pub fn new(config: DispatcherConfig, input_rx: mpsc::Receiver<OverlayUpdate>) -> Self {
        Self { config, input_rx }
    }

    /// Build and start the dispatcher
    #[instrument(name = "overlay_dispatcher_build", skip(self))]
    pub fn build(self) -> Result<OverlayDispatcher, OverlayError> {
        let mut handles = Vec::with_capacity(self.config.overlays.len());
        for overlay_config in &self.config.overlays {
            handles.push(create_overlay_handle(overlay_config)?);
        }

        Ok(OverlayDispatcher {
            handles,
            input_rx: self.input_rx,
        })
    }
}

/// Create an OverlayHandle from configuration
#[instrument(
    name = "overlay_create_handle",
    skip(config),
    fields(overlay = %config.name, kind = ?config.kind)
)]
fn create_overlay_handle(config: &OverlayConfig) -> Result<OverlayHandle, OverlayError> {
    match config.kind {
        OverlayKind::Log => {
            let overlay = LogOverlay::new(&config.name);
            Ok(OverlayHandle::spawn(overlay, config.queue_capacity))
        }
        OverlayKind::File => {
            let path = config.path.as_ref().ok_or_else(|| {
                OverlayError::backend_creation(&config.name, "file overlay requires a path")
            })?;
            let overlay = FileOverlay::new(&config.name, path)
                .map_err(|e| OverlayError::backend_creation(&config.name, e.to_string()))?;
            Ok(OverlayHandle::spawn(overlay, config.queue_capacity))
        }
    }
}

/// Fans out projection updates to all configured overlay backends
///
/// 每个后端一个独立 worker + 有界队列,慢后端只丢自己的更新,
/// 不阻塞投影驱动。
pub struct OverlayDispatcher {
    handles: Vec<OverlayHandle>,
    input_rx: mpsc::Receiver<OverlayUpdate>,
}

impl OverlayDispatcher {
    /// Create a dispatcher with custom handles (for testing)
    pub fn with_handles(handles: Vec<OverlayHandle>, input_rx: mpsc::Receiver<OverlayUpdate>) -> Self {
        Self { handles, input_rx }
    }

    /// Get metrics for all overlay backends
    pub fn metrics(&self) -> Vec<(String, OverlaySnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the dispatcher main loop
    ///
    /// Consumes updates from input and fans out to all backends.
    /// Returns when input channel is closed.
    #[instrument(name = "overlay_dispatcher_run", skip(self))]
    pub async fn run(mut self) {
        info!(overlays = self.handles.len(), "overlay dispatcher started");

        let mut update_count: u64 = 0;

        while let Some(update) = self.input_rx.recv().await {
            update_count += 1;
            counter!("fieldnav_overlay_updates_total").increment(1);
            self.dispatch_update(&update);

            if update_count.is_multiple_of(100) {
                debug!(updates = update_count, "overlay dispatcher progress");
            }
        }

        info!(
            updates = update_count,
            "overlay dispatcher input closed, shutting down"
        );

        Self::shutdown_handles(self.handles).await;

        info!("overlay dispatcher shutdown complete");
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    fn dispatch_update(&self, update: &OverlayUpdate) {
        for handle in &self.handles {
            handle.try_send(*update);
        }
    }

    async fn shutdown_handles(handles: Vec<OverlayHandle>) {
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

/// Convenience function to create a dispatcher from overlay configs
#[instrument(name = "overlay_dispatcher_create", skip(overlay_configs, input_rx))]
pub fn create_dispatcher(
    overlay_configs: Vec<OverlayConfig>,
    input_rx: mpsc::Receiver<OverlayUpdate>,
) -> Result<OverlayDispatcher, OverlayError> {
    let config = DispatcherConfig {
        overlays: overlay_configs,
    };
    DispatcherBuilder::new(config, input_rx).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{GeoPoint, OverlayLine};

    fn line() -> OverlayLine {
        OverlayLine {
            origin: GeoPoint::new(40.0, -74.0),
            exit: GeoPoint::new(40.001, -74.0),
            heading_deg: 0.0,
            computed_at: 0.0,
        }
    }

    #[tokio::test]
    async fn test_dispatcher_fanout() {
        let (input_tx, input_rx) = mpsc::channel(10);

        let handles = vec![
            OverlayHandle::spawn(LogOverlay::new("first"), 10),
            OverlayHandle::spawn(LogOverlay::new("second"), 10),
        ];

        let dispatcher = OverlayDispatcher::with_handles(handles, input_rx);
        let handle = dispatcher.spawn();

        for _ in 0..5 {
            input_tx.send(OverlayUpdate::Line(line())).await.unwrap();
        }
        input_tx.send(OverlayUpdate::Clear).await.unwrap();

        drop(input_tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_create_dispatcher_from_config() {
        let (input_tx, input_rx) = mpsc::channel(10);

        let configs = vec![OverlayConfig {
            name: "test_log".to_string(),
            kind: OverlayKind::Log,
            queue_capacity: 8,
            path: None,
        }];

        let dispatcher = create_dispatcher(configs, input_rx).unwrap();
        let handle = dispatcher.spawn();

        input_tx.send(OverlayUpdate::Line(line())).await.unwrap();

        drop(input_tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_file_overlay_requires_path() {
        let (_input_tx, input_rx) = mpsc::channel(1);

        let configs = vec![OverlayConfig {
            name: "bad_file".to_string(),
            kind: OverlayKind::File,
            queue_capacity: 8,
            path: None,
        }];

        assert!(create_dispatcher(configs, input_rx).is_err());
    }
}
