//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::TransportMode;
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading blueprint");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Blueprint file not found: {}", args.config.display());
    }

    // Load and parse blueprint
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load blueprint from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref replay) = args.replay {
        info!(path = %replay.display(), "Overriding transport with file replay");
        blueprint.transport.mode = TransportMode::Replay;
        blueprint.transport.replay_path = Some(replay.clone());
    }
    if let Some(speed) = args.speed {
        info!(speed, "Overriding replay speed from CLI");
        blueprint.transport.speed_multiplier = speed;
    }
    if let Some(channel) = args.channel {
        info!(channel, "Overriding position channel from CLI");
        blueprint.transport.channel = channel;
    }
    if let Some(max_fix_age) = args.max_fix_age {
        info!(max_fix_age, "Overriding fix staleness bound from CLI");
        blueprint.fusion.max_fix_age_s = max_fix_age;
    }

    info!(
        mode = ?blueprint.transport.mode,
        channel = blueprint.transport.channel,
        strategy = blueprint.fusion.strategy.as_str(),
        overlays = blueprint.overlays.len(),
        "Blueprint loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - blueprint is valid, exiting");
        print_blueprint_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_updates: if args.max_updates == 0 {
            None
        } else {
            Some(args.max_updates)
        },
        duration: if args.duration == 0 {
            None
        } else {
            Some(Duration::from_secs(args.duration))
        },
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        updates = stats.updates_forwarded,
                        fixes_accepted = stats.nav_metrics.fixes_accepted,
                        duration_secs = stats.duration.as_secs_f64(),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("FieldNav finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print blueprint summary for dry-run mode
fn print_blueprint_summary(blueprint: &contracts::MissionBlueprint) {
    println!("\n=== Blueprint Summary ===\n");
    println!("Transport:");
    println!("  Mode: {:?}", blueprint.transport.mode);
    println!("  Channel: {}", blueprint.transport.channel);
    if let Some(ref path) = blueprint.transport.replay_path {
        println!("  Replay: {}", path.display());
    }
    if let Some(ref device) = blueprint.transport.device {
        println!(
            "  Device: {} @ {} baud",
            device, blueprint.transport.baud_rate
        );
    }

    println!("\nFusion:");
    println!("  Strategy: {}", blueprint.fusion.strategy.as_str());
    println!("  Smoothing alpha: {}", blueprint.fusion.smoothing_alpha);
    println!("  Max fix age (s): {}", blueprint.fusion.max_fix_age_s);

    println!("\nViewport:");
    println!(
        "  {}x{} px, center ({}, {}), {} px/m",
        blueprint.viewport.width,
        blueprint.viewport.height,
        blueprint.viewport.center_latitude,
        blueprint.viewport.center_longitude,
        blueprint.viewport.pixels_per_meter
    );

    if !blueprint.overlays.is_empty() {
        println!("\nOverlays ({}):", blueprint.overlays.len());
        for overlay in &blueprint.overlays {
            println!("  - {} ({:?})", overlay.name, overlay.kind);
        }
    }

    println!();
}
