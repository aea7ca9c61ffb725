//! Serial Pipeline Demo
//!
//! Reads NMEA sentences from a real serial receiver and drives the
//! direction pipeline until Ctrl+C. Requires the `real-serial` feature
//! and a device delivering position sentences on channel 2.
//!
//! Run with: cargo run --bin serial_pipeline --features real-serial [device] [baud]

use std::sync::Arc;
use std::time::Duration;

use contracts::{
    FusionStrategy, InertialConfig, InertialMode, OverlayConfig, OverlayKind, OverlayUpdate,
    TransportConfig, TransportMode, ViewportConfig,
};
use fusion::FusionPipeline;
use ingestion::{BackpressureConfig, IngestionPipeline};
use overlay::create_dispatcher;
use projector::{PlanarTransform, ProjectionDriver};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize observability (Tracing + Prometheus)
    observability::init()?;

    info!("Starting Serial Pipeline Demo");

    let device = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());
    let baud_rate = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(9600u32);

    info!(device = %device, baud_rate, "Opening serial receiver");

    let transport_config = TransportConfig {
        mode: TransportMode::Serial,
        channel: 2,
        device: Some(device),
        baud_rate,
        replay_path: None,
        speed_multiplier: 1.0,
        loop_playback: false,
        mock_rate_hz: 1.0,
    };
    let sentence_transport = transport::build_transport(&transport_config)?;
    let mut ingestion = IngestionPipeline::new(sentence_transport, BackpressureConfig::default());
    ingestion.start()?;
    let fix_rx = ingestion
        .take_fix_receiver()
        .ok_or("fix receiver already taken")?;

    // 没有真实惯性硬件时用固定朝北的合成源顶替
    let source = transport::build_inertial_source(&InertialConfig {
        mode: InertialMode::Mock,
        sample_rate_hz: 10.0,
        start_heading_deg: 0.0,
        sweep_dps: 0.0,
    })?
    .ok_or("mock inertial source expected")?;
    let mut fusion = FusionPipeline::new(source, FusionStrategy::RotationVector, None);
    fusion.start()?;
    let heading_rx = fusion
        .take_heading_receiver()
        .ok_or("heading receiver already taken")?;

    let transform = Arc::new(PlanarTransform::from_config(&ViewportConfig {
        width: 800.0,
        height: 600.0,
        center_latitude: 40.0,
        center_longitude: -74.0,
        pixels_per_meter: 1.0,
    }));
    let (update_tx, update_rx) = mpsc::channel::<OverlayUpdate>(32);
    let driver = ProjectionDriver::new(transform, Some(10.0), fix_rx, heading_rx, update_tx);
    let driver_handle = tokio::spawn(driver.run());

    let dispatcher = create_dispatcher(
        vec![OverlayConfig {
            name: "console".to_string(),
            kind: OverlayKind::Log,
            queue_capacity: 8,
            path: None,
        }],
        update_rx,
    )?;
    let dispatcher_handle = dispatcher.spawn();

    info!("Pipeline running - press Ctrl+C to stop");

    let mut fault_check = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C");
                break;
            }
            _ = fault_check.tick() => {
                if let Some(message) = ingestion.transport_fault() {
                    warn!(error = %message, "Transport fault - stopping");
                    break;
                }
            }
        }
    }

    info!("Shutting down...");
    ingestion.shutdown().await;
    let fusion_stats = fusion.shutdown().await;
    let projection_stats = tokio::time::timeout(Duration::from_secs(2), driver_handle)
        .await
        .map(|r| r.unwrap_or_default())
        .unwrap_or_default();
    let _ = tokio::time::timeout(Duration::from_secs(2), dispatcher_handle).await;

    info!(
        fused = fusion_stats.fused,
        projected = projection_stats.projected,
        "Serial Pipeline Demo finished"
    );
    Ok(())
}
