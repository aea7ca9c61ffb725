//! Mock Pipeline Demo
//!
//! Runs the full direction pipeline against synthetic sources: a mock
//! receiver walking northeast and a mock inertial source sweeping its
//! heading. No serial hardware required.
//!
//! Run with: cargo run --bin mock_pipeline [config_path]

use std::sync::Arc;
use std::time::Duration;

use config_loader::ConfigLoader;
use contracts::{
    ConfigVersion, FusionConfig, FusionStrategy, InertialConfig, InertialMode, MissionBlueprint,
    OverlayConfig, OverlayKind, OverlayUpdate, TransportConfig, TransportMode, ViewportConfig,
};
use fusion::FusionPipeline;
use ingestion::{BackpressureConfig, IngestionPipeline};
use overlay::create_dispatcher;
use projector::{PlanarTransform, ProjectionDriver};
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting Mock Pipeline Demo");

    // ==== Stage 1: Use default blueprint or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        info!(path = %path, "Loading mission blueprint");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        create_demo_blueprint()
    };

    // ==== Stage 2: Transport + Ingestion ====
    let sentence_transport = transport::build_transport(&blueprint.transport)?;
    let mut ingestion = IngestionPipeline::new(sentence_transport, BackpressureConfig::default());
    ingestion.start()?;
    let fix_rx = ingestion
        .take_fix_receiver()
        .ok_or("fix receiver already taken")?;
    info!(channel = blueprint.transport.channel, "Ingestion started");

    // ==== Stage 3: Inertial + Fusion ====
    let source = transport::build_inertial_source(&blueprint.inertial)?
        .ok_or("demo blueprint requires a mock inertial source")?;
    let mut fusion = FusionPipeline::new(
        source,
        blueprint.fusion.strategy,
        blueprint.fusion.smoothing(),
    );
    fusion.start()?;
    let heading_rx = fusion
        .take_heading_receiver()
        .ok_or("heading receiver already taken")?;
    info!(
        strategy = blueprint.fusion.strategy.as_str(),
        "Fusion started"
    );

    // ==== Stage 4: Projection + Overlays ====
    let transform = Arc::new(PlanarTransform::from_config(&blueprint.viewport));
    let (update_tx, mut update_rx) = mpsc::channel::<OverlayUpdate>(32);
    let driver = ProjectionDriver::new(
        transform,
        blueprint.fusion.max_fix_age(),
        fix_rx,
        heading_rx,
        update_tx,
    );
    let driver_handle = tokio::spawn(driver.run());

    let (overlay_tx, overlay_rx) = mpsc::channel::<OverlayUpdate>(32);
    let dispatcher = create_dispatcher(blueprint.overlays.clone(), overlay_rx)?;
    let dispatcher_handle = dispatcher.spawn();
    info!(overlays = blueprint.overlays.len(), "Dispatcher started");

    // ==== Stage 5: Run for a fixed update budget ====
    let target_updates = 20u64;
    let forward_handle = tokio::spawn(async move {
        let mut forwarded = 0u64;

        while let Some(update) = update_rx.recv().await {
            match &update {
                OverlayUpdate::Line(line) => info!(
                    heading = format!("{:.1}", line.heading_deg),
                    lat = line.origin.latitude,
                    lon = line.origin.longitude,
                    "Direction update"
                ),
                OverlayUpdate::Clear => info!("Direction cleared"),
            }

            if overlay_tx.send(update).await.is_err() {
                break;
            }

            forwarded += 1;
            if forwarded >= target_updates {
                break;
            }
        }

        forwarded
    });

    let result = tokio::time::timeout(Duration::from_secs(30), forward_handle).await;

    // ==== Stage 6: Graceful Shutdown ====
    info!("Shutting down...");
    ingestion.shutdown().await;
    let fusion_stats = fusion.shutdown().await;
    let projection_stats = tokio::time::timeout(Duration::from_secs(2), driver_handle)
        .await
        .map(|r| r.unwrap_or_default())
        .unwrap_or_default();
    let _ = tokio::time::timeout(Duration::from_secs(2), dispatcher_handle).await;

    match result {
        Ok(Ok(count)) => info!(
            updates = count,
            fused = fusion_stats.fused,
            projected = projection_stats.projected,
            "Pipeline completed successfully"
        ),
        Ok(Err(e)) => info!("Forward task error: {:?}", e),
        Err(_) => info!("Pipeline timed out"),
    }

    info!("Mock Pipeline Demo finished");
    Ok(())
}

/// 无需配置文件的演示蓝图:慢速合成接收机 + 缓慢扫掠的航向
fn create_demo_blueprint() -> MissionBlueprint {
    MissionBlueprint {
        version: ConfigVersion::V1,
        transport: TransportConfig {
            mode: TransportMode::Mock,
            channel: 2,
            device: None,
            baud_rate: 9600,
            replay_path: None,
            speed_multiplier: 1.0,
            loop_playback: true,
            mock_rate_hz: 5.0,
        },
        inertial: InertialConfig {
            mode: InertialMode::Mock,
            sample_rate_hz: 20.0,
            start_heading_deg: 45.0,
            sweep_dps: 15.0,
        },
        fusion: FusionConfig {
            strategy: FusionStrategy::RotationVector,
            smoothing_alpha: 0.3,
            max_fix_age_s: 0.0,
        },
        viewport: ViewportConfig {
            width: 400.0,
            height: 400.0,
            center_latitude: 40.0,
            center_longitude: -74.0,
            pixels_per_meter: 2.0,
        },
        overlays: vec![OverlayConfig {
            name: "console".to_string(),
            kind: OverlayKind::Log,
            queue_capacity: 8,
            path: None,
        }],
    }
}
