//! Pipeline orchestrator - coordinates all components.
//!
//! 按依赖顺序搭建:transport → ingestion → fusion → projector →
//! overlay dispatcher;拆除按反序,最后等 overlay worker 收尾。

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{HeadingEstimate, MissionBlueprint, OverlayUpdate};
use ingestion::{BackpressureConfig, DropPolicy, IngestionPipeline};
use projector::{PlanarTransform, ProjectionDriver};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The mission blueprint
    pub blueprint: MissionBlueprint,

    /// Maximum number of overlay updates to produce (None = unlimited)
    pub max_updates: Option<u64>,

    /// Run duration (None = until shutdown signal)
    pub duration: Option<Duration>,

    /// Channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Transport + Ingestion
        info!(mode = ?blueprint.transport.mode, "Building transport...");
        let sentence_transport =
            transport::build_transport(&blueprint.transport).context("Failed to build transport")?;

        let backpressure = BackpressureConfig::new(self.config.buffer_size, DropPolicy::DropNewest);
        let mut ingestion = IngestionPipeline::new(sentence_transport, backpressure);
        ingestion.start().context("Failed to start ingestion")?;
        let fix_rx = ingestion
            .take_fix_receiver()
            .context("Failed to get fix receiver")?;

        info!(
            channel = blueprint.transport.channel,
            "Ingestion pipeline started"
        );

        // Inertial source + Fusion
        let (mut fusion_pipeline, heading_rx, _idle_heading_tx) =
            start_fusion(blueprint).context("Failed to start fusion")?;

        // Projection driver
        let transform = Arc::new(PlanarTransform::from_config(&blueprint.viewport));
        let max_fix_age = blueprint.fusion.max_fix_age();

        let (update_tx, mut update_rx) = mpsc::channel::<OverlayUpdate>(self.config.buffer_size);
        let driver = ProjectionDriver::new(
            transform,
            max_fix_age,
            fix_rx,
            heading_rx,
            update_tx,
        );
        let driver_handle = tokio::spawn(driver.run());

        info!(
            width = blueprint.viewport.width,
            height = blueprint.viewport.height,
            max_fix_age = ?max_fix_age,
            "Projection driver started"
        );

        // Overlay dispatcher
        if blueprint.overlays.is_empty() {
            warn!("No overlays configured - projection updates will be dropped");
        }

        let (overlay_tx, overlay_rx) = mpsc::channel::<OverlayUpdate>(self.config.buffer_size);
        let dispatcher = overlay::create_dispatcher(blueprint.overlays.clone(), overlay_rx)
            .context("Failed to create overlay dispatcher")?;
        let active_overlays = blueprint.overlays.len();
        let dispatcher_handle = dispatcher.spawn();

        info!(active_overlays, "Overlay dispatcher started");

        // Forward loop: driver -> dispatcher, with update budget and
        // transport fault polling
        let max_updates = self.config.max_updates;
        let mut fault: Option<String> = None;
        let mut stats = PipelineStats {
            active_overlays,
            ..Default::default()
        };

        let forward_loop = async {
            let mut fault_check = tokio::time::interval(Duration::from_millis(500));
            fault_check.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    update = update_rx.recv() => {
                        let Some(update) = update else {
                            break;
                        };

                        match update {
                            OverlayUpdate::Line(ref line) => {
                                stats.lines_drawn += 1;
                                stats.nav_metrics.heading_stats.push(line.heading_deg);
                                observability::record_projection(true);
                                info!(
                                    heading = format!("{:.1}", line.heading_deg),
                                    origin_lat = line.origin.latitude,
                                    origin_lon = line.origin.longitude,
                                    "Direction update"
                                );
                            }
                            OverlayUpdate::Clear => {
                                stats.clears += 1;
                                observability::record_projection(false);
                                info!("Direction cleared");
                            }
                        }
                        stats.updates_forwarded += 1;

                        if overlay_tx.send(update).await.is_err() {
                            warn!("Overlay dispatcher channel closed");
                            break;
                        }

                        if let Some(max) = max_updates {
                            if stats.updates_forwarded >= max {
                                info!(updates = stats.updates_forwarded, "Reached update budget");
                                break;
                            }
                        }
                    }
                    _ = fault_check.tick() => {
                        if let Some(message) = ingestion.transport_fault() {
                            warn!(error = %message, "Transport fault detected");
                            fault = Some(message);
                            break;
                        }
                    }
                }
            }
        };

        // Run with optional duration bound
        if let Some(duration) = self.config.duration {
            if tokio::time::timeout(duration, forward_loop).await.is_err() {
                info!(duration_secs = duration.as_secs(), "Run duration elapsed");
            }
        } else {
            forward_loop.await;
        }

        // Teardown in reverse order
        info!("Shutting down pipeline...");
        ingestion.shutdown().await;
        let ingest_snapshot = ingestion.metrics().snapshot();

        let fusion_stats = match fusion_pipeline.as_mut() {
            Some(pipeline) => pipeline.shutdown().await,
            None => fusion::FusionStats::default(),
        };
        drop(fusion_pipeline);
        drop(_idle_heading_tx);

        // Fix/heading senders are gone now, the driver exits on its own
        let projection_stats = driver_handle
            .await
            .unwrap_or_default();

        drop(overlay_tx);
        let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

        stats.chunks_received = ingest_snapshot.chunks_received;
        stats.nav_metrics.lines_dropped = ingest_snapshot.lines_dropped;
        stats.nav_metrics.fixes_accepted = ingest_snapshot.fixes_accepted;
        stats.nav_metrics.fixes_rejected = ingest_snapshot.fixes_rejected;
        stats.nav_metrics.fusions = fusion_stats.fused;
        stats.nav_metrics.fusions_degenerate = fusion_stats.degenerate;
        stats.nav_metrics.projections = projection_stats.projected;
        stats.nav_metrics.projections_empty = projection_stats.empty;
        stats.nav_metrics.overlay_updates = stats.updates_forwarded;
        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            updates = stats.updates_forwarded,
            "Pipeline shutdown complete"
        );

        if let Some(message) = fault {
            return Err(anyhow::anyhow!("transport fault: {message}"))
                .context("Pipeline stopped on transport fault");
        }

        Ok(stats)
    }
}

/// 构建惯性源与融合管线
///
/// inertial.mode = "none" 时没有融合管线;返回一个永远停在
/// None 的航向通道 (叠加层因此从不绘制),并把发送端交给调用方
/// 保活到拆除为止。
type IdleHeadingSender = Option<watch::Sender<Option<HeadingEstimate>>>;

fn start_fusion(
    blueprint: &MissionBlueprint,
) -> Result<(
    Option<fusion::FusionPipeline>,
    watch::Receiver<Option<HeadingEstimate>>,
    IdleHeadingSender,
)> {
    let source =
        transport::build_inertial_source(&blueprint.inertial).context("Failed to build inertial source")?;

    match source {
        Some(source) => {
            let mut pipeline = fusion::FusionPipeline::new(
                source,
                blueprint.fusion.strategy,
                blueprint.fusion.smoothing(),
            );
            pipeline.start().context("Failed to start fusion")?;
            let heading_rx = pipeline
                .take_heading_receiver()
                .context("Failed to get heading receiver")?;

            info!(
                strategy = blueprint.fusion.strategy.as_str(),
                sample_rate_hz = blueprint.inertial.sample_rate_hz,
                "Fusion pipeline started"
            );
            Ok((Some(pipeline), heading_rx, None))
        }
        None => {
            warn!("Inertial mode 'none' - heading unavailable, overlay will stay empty");
            let (tx, rx) = watch::channel(None);
            Ok((None, rx, Some(tx)))
        }
    }
}
