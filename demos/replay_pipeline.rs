//! Replay Pipeline Demo
//!
//! Replays a recorded sentence log through the direction pipeline and
//! mirrors the resulting segment into `direction.json`. When no log path
//! is given, a small bundled recording is written to the temp directory.
//!
//! Run with: cargo run --bin replay_pipeline [replay_log]

use std::path::PathBuf;
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
use tracing::info;

/// 内置样例录制:向北走三步，夹一条无效定位
const SAMPLE_LOG: &str = "\
1: $GPFIX,valid,40.0000,-74.0000\n\
2: $GPFIX,valid,40.0001,-74.0000\n\
2: $GPFIX,invalid,41.0,-70.0\n\
3: $GPFIX,valid,40.0002,-74.0000\n";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting Replay Pipeline Demo");

    let replay_path = resolve_replay_path()?;
    info!(path = %replay_path.display(), "Using replay log");

    // ==== Transport + Ingestion ====
    let transport_config = TransportConfig {
        mode: TransportMode::Replay,
        channel: 2,
        device: None,
        baud_rate: 9600,
        replay_path: Some(replay_path),
        speed_multiplier: 2.0,
        loop_playback: false,
        mock_rate_hz: 1.0,
    };
    let sentence_transport = transport::build_transport(&transport_config)?;
    let mut ingestion = IngestionPipeline::new(sentence_transport, BackpressureConfig::default());
    ingestion.start()?;
    let fix_rx = ingestion
        .take_fix_receiver()
        .ok_or("fix receiver already taken")?;

    // ==== Fixed-heading inertial + Fusion ====
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

    // ==== Projection + File overlay ====
    let transform = Arc::new(PlanarTransform::from_config(&ViewportConfig {
        width: 200.0,
        height: 200.0,
        center_latitude: 40.0,
        center_longitude: -74.0,
        pixels_per_meter: 1.0,
    }));
    let (update_tx, update_rx) = mpsc::channel::<OverlayUpdate>(32);
    let driver = ProjectionDriver::new(transform, None, fix_rx, heading_rx, update_tx);
    let driver_handle = tokio::spawn(driver.run());

    let state_path = PathBuf::from("direction.json");
    let dispatcher = create_dispatcher(
        vec![
            OverlayConfig {
                name: "console".to_string(),
                kind: OverlayKind::Log,
                queue_capacity: 8,
                path: None,
            },
            OverlayConfig {
                name: "state_file".to_string(),
                kind: OverlayKind::File,
                queue_capacity: 8,
                path: Some(state_path.clone()),
            },
        ],
        update_rx,
    )?;
    let dispatcher_handle = dispatcher.spawn();

    // ==== Let the single replay pass run to the end, then tear down ====
    // 2x 速度下组间 0.5 秒,样例录制三组 1.5 秒播完
    info!("Replaying...");
    tokio::time::sleep(Duration::from_secs(3)).await;

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
        state_file = %state_path.display(),
        "Replay Pipeline Demo finished"
    );
    Ok(())
}

fn resolve_replay_path() -> std::io::Result<PathBuf> {
    if let Some(path) = std::env::args().nth(1) {
        return Ok(PathBuf::from(path));
    }

    let path = std::env::temp_dir().join("fieldnav_demo_fixes.log");
    std::fs::write(&path, SAMPLE_LOG)?;
    Ok(path)
}
