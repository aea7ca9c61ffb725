//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Blueprint info for JSON output
#[derive(Serialize)]
struct BlueprintInfo {
    version: String,
    transport: TransportInfo,
    inertial: InertialInfo,
    fusion: FusionInfo,
    viewport: ViewportInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    overlays: Vec<OverlayInfo>,
}

#[derive(Serialize)]
struct TransportInfo {
    mode: String,
    channel: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replay_path: Option<String>,
    speed_multiplier: f64,
}

#[derive(Serialize)]
struct InertialInfo {
    mode: String,
    sample_rate_hz: f64,
}

#[derive(Serialize)]
struct FusionInfo {
    strategy: String,
    smoothing_alpha: f64,
    max_fix_age_s: f64,
}

#[derive(Serialize)]
struct ViewportInfo {
    width: f64,
    height: f64,
    center_latitude: f64,
    center_longitude: f64,
    pixels_per_meter: f64,
}

#[derive(Serialize)]
struct OverlayInfo {
    name: String,
    kind: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading blueprint info");

    if !args.config.exists() {
        anyhow::bail!("Blueprint file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load blueprint from {}", args.config.display()))?;

    if args.json {
        let info = build_blueprint_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize blueprint info")?;
        println!("{}", json);
    } else {
        print_blueprint_info(&blueprint, args);
    }

    Ok(())
}

fn build_blueprint_info(blueprint: &contracts::MissionBlueprint, args: &InfoArgs) -> BlueprintInfo {
    let overlays = if args.overlays {
        blueprint
            .overlays
            .iter()
            .map(|o| OverlayInfo {
                name: o.name.clone(),
                kind: format!("{:?}", o.kind),
                queue_capacity: o.queue_capacity,
                path: o.path.as_ref().map(|p| p.display().to_string()),
            })
            .collect()
    } else {
        Vec::new()
    };

    BlueprintInfo {
        version: format!("{:?}", blueprint.version),
        transport: TransportInfo {
            mode: format!("{:?}", blueprint.transport.mode),
            channel: blueprint.transport.channel,
            device: blueprint.transport.device.clone(),
            replay_path: blueprint
                .transport
                .replay_path
                .as_ref()
                .map(|p| p.display().to_string()),
            speed_multiplier: blueprint.transport.speed_multiplier,
        },
        inertial: InertialInfo {
            mode: format!("{:?}", blueprint.inertial.mode),
            sample_rate_hz: blueprint.inertial.sample_rate_hz,
        },
        fusion: FusionInfo {
            strategy: blueprint.fusion.strategy.as_str().to_string(),
            smoothing_alpha: blueprint.fusion.smoothing_alpha,
            max_fix_age_s: blueprint.fusion.max_fix_age_s,
        },
        viewport: ViewportInfo {
            width: blueprint.viewport.width,
            height: blueprint.viewport.height,
            center_latitude: blueprint.viewport.center_latitude,
            center_longitude: blueprint.viewport.center_longitude,
            pixels_per_meter: blueprint.viewport.pixels_per_meter,
        },
        overlays,
    }
}

fn print_blueprint_info(blueprint: &contracts::MissionBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  FieldNav Mission Blueprint                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Transport
    println!("📡 Transport");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Mode: {:?}", blueprint.transport.mode);
    println!("   ├─ Channel: {}", blueprint.transport.channel);
    match (&blueprint.transport.device, &blueprint.transport.replay_path) {
        (Some(device), _) => {
            println!(
                "   └─ Device: {} @ {} baud",
                device, blueprint.transport.baud_rate
            );
        }
        (None, Some(path)) => {
            println!(
                "   └─ Replay: {} (x{}, loop={})",
                path.display(),
                blueprint.transport.speed_multiplier,
                blueprint.transport.loop_playback
            );
        }
        (None, None) => {
            println!("   └─ Synthetic @ {} Hz", blueprint.transport.mock_rate_hz);
        }
    }

    // Inertial + Fusion
    println!("\n🧭 Heading");
    println!("   ├─ Inertial mode: {:?}", blueprint.inertial.mode);
    println!("   ├─ Sample rate: {} Hz", blueprint.inertial.sample_rate_hz);
    println!("   ├─ Strategy: {}", blueprint.fusion.strategy.as_str());
    if let Some(alpha) = blueprint.fusion.smoothing() {
        println!("   ├─ Smoothing alpha: {}", alpha);
    } else {
        println!("   ├─ Smoothing: disabled");
    }
    match blueprint.fusion.max_fix_age() {
        Some(age) => println!("   └─ Max fix age: {}s", age),
        None => println!("   └─ Max fix age: unbounded"),
    }

    // Viewport
    println!("\n🗺  Viewport");
    println!(
        "   ├─ Size: {}x{} px",
        blueprint.viewport.width, blueprint.viewport.height
    );
    println!(
        "   ├─ Center: ({}, {})",
        blueprint.viewport.center_latitude, blueprint.viewport.center_longitude
    );
    println!("   └─ Scale: {} px/m", blueprint.viewport.pixels_per_meter);

    // Overlays
    if !blueprint.overlays.is_empty() {
        println!("\n📤 Overlays ({})", blueprint.overlays.len());
        for (i, overlay) in blueprint.overlays.iter().enumerate() {
            let is_last = i == blueprint.overlays.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };

            if args.overlays {
                let path = overlay
                    .path
                    .as_ref()
                    .map(|p| format!(", path={}", p.display()))
                    .unwrap_or_default();
                println!(
                    "   {} {} ({:?}, queue={}{})",
                    prefix, overlay.name, overlay.kind, overlay.queue_capacity, path
                );
            } else {
                println!("   {} {} ({:?})", prefix, overlay.name, overlay.kind);
            }
        }
    }

    println!();
}
