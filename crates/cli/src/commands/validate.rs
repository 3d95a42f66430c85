//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{ReplayBlueprint, SensorKind};
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
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    vehicle: String,
    rate_hz: f64,
    camera_count: usize,
    sensor_count: usize,
    channel_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

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
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            error: Some(format!("File not found: {config_path}")),
            config_path,
            warnings: Vec::new(),
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let descriptors = blueprint.descriptors();
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: collect_warnings(&blueprint),
                summary: Some(ConfigSummary {
                    vehicle: blueprint.replay.vehicle_name.clone(),
                    rate_hz: blueprint.replay.rate_hz,
                    camera_count: blueprint.cameras.len(),
                    sensor_count: descriptors.len(),
                    channel_count: descriptors.iter().map(|d| d.channels.len()).sum(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

/// 不致命但值得提示的配置问题
fn collect_warnings(blueprint: &ReplayBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.descriptors().is_empty() {
        warnings.push("No sensors configured; output will only contain static transforms and the input tail".into());
    }
    if !blueprint.replay.input_log.exists() {
        warnings.push(format!(
            "Input log does not exist yet: {}",
            blueprint.replay.input_log.display()
        ));
    }
    for descriptor in blueprint.descriptors() {
        if matches!(descriptor.kind, SensorKind::Camera) && descriptor.channels.len() == 1 {
            warnings.push(format!(
                "Camera '{}' records only the scene stream",
                descriptor.id
            ));
        }
    }
    if blueprint.replay.rate_hz > 100.0 {
        warnings.push(format!(
            "High replay rate ({} Hz); the backend may not keep up",
            blueprint.replay.rate_hz
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);
        if let Some(summary) = &result.summary {
            println!("  Vehicle: {}", summary.vehicle);
            println!("  Rate: {} Hz", summary.rate_hz);
            println!("  Cameras: {}", summary.camera_count);
            println!(
                "  Sensors: {} ({} channels)",
                summary.sensor_count, summary.channel_count
            );
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(error) = &result.error {
            println!("  Error: {}", error);
        }
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  ⚠ {}", warning);
        }
    }
}
