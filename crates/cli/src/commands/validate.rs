//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{InertialMode, OverlayKind, TransportMode};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<BlueprintSummary>,
}

#[derive(Serialize)]
struct BlueprintSummary {
    version: String,
    transport_mode: String,
    fusion_strategy: String,
    viewport: String,
    overlay_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating blueprint");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Blueprint validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(BlueprintSummary {
                    version: format!("{:?}", blueprint.version),
                    transport_mode: format!("{:?}", blueprint.transport.mode),
                    fusion_strategy: blueprint.fusion.strategy.as_str().to_string(),
                    viewport: format!(
                        "{}x{} @ ({}, {})",
                        blueprint.viewport.width,
                        blueprint.viewport.height,
                        blueprint.viewport.center_latitude,
                        blueprint.viewport.center_longitude
                    ),
                    overlay_count: blueprint.overlays.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect blueprint warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::MissionBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.overlays.is_empty() {
        warnings.push("No overlays configured - projection updates will be dropped".to_string());
    }

    if blueprint.transport.mode == TransportMode::Mock {
        warnings.push("Mock transport in use - positions are synthetic".to_string());
    }

    if blueprint.inertial.mode == InertialMode::None {
        warnings.push(
            "Inertial mode 'none' - heading will never be available, overlay stays empty"
                .to_string(),
        );
    }

    if blueprint.fusion.max_fix_age().is_none() {
        warnings.push(
            "No fix staleness bound - last-known position is used indefinitely".to_string(),
        );
    }

    for overlay in &blueprint.overlays {
        if overlay.kind == OverlayKind::File && overlay.queue_capacity < 2 {
            warnings.push(format!(
                "Overlay '{}' has a queue capacity of {} - updates will drop under load",
                overlay.name, overlay.queue_capacity
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Blueprint is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Transport: {}", summary.transport_mode);
            println!("  Fusion strategy: {}", summary.fusion_strategy);
            println!("  Viewport: {}", summary.viewport);
            println!("  Overlays: {}", summary.overlay_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Blueprint is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
