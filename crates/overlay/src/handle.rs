//! OverlayHandle - manages an overlay backend with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{DirectionOverlay, OverlayUpdate};

use crate::metrics::OverlayMetrics;

/// Handle to a running overlay worker
pub struct OverlayHandle {
    /// Overlay name
    name: String,
    /// Channel to send updates to worker
    tx: mpsc::Sender<OverlayUpdate>,
    /// Shared metrics
    metrics: Arc<OverlayMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl OverlayHandle {
    /// Create a new OverlayHandle and spawn the worker task
    pub fn spawn<O: DirectionOverlay + Send + 'static>(overlay: O, queue_capacity: usize) -> Self {
        let name = overlay.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(OverlayMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            overlay_worker(overlay, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get overlay name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<OverlayMetrics> {
        &self.metrics
    }

    /// Send an update to the overlay (non-blocking)
    ///
    /// 队列满时直接丢:被丢的更新会被下一次重算结果取代,
    /// 从不重试。Returns true if sent.
    pub fn try_send(&self, update: OverlayUpdate) -> bool {
        match self.tx.try_send(update) {
            Ok(()) => {
                self.metrics.set_queue_len(self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.inc_dropped_count();
                warn!(overlay = %self.name, "queue full, update dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(overlay = %self.name, "overlay worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the overlay worker gracefully
    #[instrument(name = "overlay_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        // Drop sender to signal worker to stop
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(overlay = %self.name, error = ?e, "worker task panicked");
        }
        debug!(overlay = %self.name, "OverlayHandle shutdown complete");
    }
}

/// Worker task that consumes updates and applies them to the backend
#[instrument(
    name = "overlay_worker_loop",
    skip(overlay, rx, metrics),
    fields(overlay = %name)
)]
async fn overlay_worker<O: DirectionOverlay>(
    mut overlay: O,
    mut rx: mpsc::Receiver<OverlayUpdate>,
    metrics: Arc<OverlayMetrics>,
    name: String,
) {
    debug!(overlay = %name, "overlay worker started");

    while let Some(update) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        let result = match &update {
            OverlayUpdate::Line(line) => {
                let r = overlay.replace(line).await;
                if r.is_ok() {
                    metrics.inc_replace_count();
                }
                r
            }
            OverlayUpdate::Clear => {
                let r = overlay.clear().await;
                if r.is_ok() {
                    metrics.inc_clear_count();
                }
                r
            }
        };

        if let Err(e) = result {
            metrics.inc_failure_count();
            error!(overlay = %name, error = %e, "overlay update failed");
            // 单次失败不拖垮 worker,继续消费
        }
    }

    if let Err(e) = overlay.close().await {
        error!(overlay = %name, error = %e, "close failed on shutdown");
    }

    debug!(overlay = %name, "overlay worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, GeoPoint, OverlayLine};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    fn line(heading: f64) -> OverlayLine {
        OverlayLine {
            origin: GeoPoint::new(40.0, -74.0),
            exit: GeoPoint::new(40.001, -74.0),
            heading_deg: heading,
            computed_at: 0.0,
        }
    }

    /// Mock overlay for testing
    struct MockOverlay {
        name: String,
        replace_count: Arc<AtomicU64>,
        clear_count: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl MockOverlay {
        fn new(name: &str) -> (Self, Arc<AtomicU64>, Arc<AtomicU64>) {
            let replaces = Arc::new(AtomicU64::new(0));
            let clears = Arc::new(AtomicU64::new(0));
            (
                Self {
                    name: name.to_string(),
                    replace_count: Arc::clone(&replaces),
                    clear_count: Arc::clone(&clears),
                    should_fail: false,
                    delay_ms: 0,
                },
                replaces,
                clears,
            )
        }
    }

    impl DirectionOverlay for MockOverlay {
        fn name(&self) -> &str {
            &self.name
        }

        async fn replace(&mut self, _line: &OverlayLine) -> Result<(), ContractError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(ContractError::overlay_write(&self.name, "mock failure"));
            }
            self.replace_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn clear(&mut self) -> Result<(), ContractError> {
            self.clear_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_overlay_handle_basic() {
        let (overlay, replaces, clears) = MockOverlay::new("test");
        let handle = OverlayHandle::spawn(overlay, 10);

        for i in 0..5 {
            assert!(handle.try_send(OverlayUpdate::Line(line(i as f64))));
        }
        assert!(handle.try_send(OverlayUpdate::Clear));

        handle.shutdown().await;
        assert_eq!(replaces.load(Ordering::Relaxed), 5);
        assert_eq!(clears.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_overlay_handle_queue_full_drops() {
        let (mut overlay, _, _) = MockOverlay::new("slow");
        overlay.delay_ms = 100;

        let handle = OverlayHandle::spawn(overlay, 2);

        for i in 0..10 {
            handle.try_send(OverlayUpdate::Line(line(i as f64)));
        }

        assert!(handle.metrics().dropped_count() > 0);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_overlay_handle_failure_isolation() {
        let (mut overlay, _, _) = MockOverlay::new("failing");
        overlay.should_fail = true;

        let handle = OverlayHandle::spawn(overlay, 10);

        for i in 0..3 {
            handle.try_send(OverlayUpdate::Line(line(i as f64)));
        }

        sleep(Duration::from_millis(50)).await;
        assert!(handle.metrics().failure_count() > 0);

        handle.shutdown().await;
    }
}
