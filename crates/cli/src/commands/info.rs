//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{ReplayBlueprint, ScanLayout, SensorDescriptor, SensorKind};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    replay: ReplayInfo,
    backend: BackendInfo,
    stereo: bool,
    sensor_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sensors: Vec<SensorDescriptor>,
}

#[derive(Serialize)]
struct ReplayInfo {
    vehicle_name: String,
    rate_hz: f64,
    period_s: f64,
    pose_channel: String,
    static_channel: String,
    input_log: String,
    output_log: String,
}

#[derive(Serialize)]
struct BackendInfo {
    host: String,
    port: u16,
    timeout_s: f64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args.sensors);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args.sensors);
    }

    Ok(())
}

fn build_config_info(blueprint: &ReplayBlueprint, with_sensors: bool) -> ConfigInfo {
    let replay = &blueprint.replay;
    let descriptors = blueprint.descriptors();

    ConfigInfo {
        replay: ReplayInfo {
            vehicle_name: replay.vehicle_name.clone(),
            rate_hz: replay.rate_hz,
            period_s: replay.period(),
            pose_channel: replay.pose_channel.clone(),
            static_channel: replay.static_channel.clone(),
            input_log: replay.input_log.display().to_string(),
            output_log: replay.output_log.display().to_string(),
        },
        backend: BackendInfo {
            host: blueprint.backend.host.clone(),
            port: blueprint.backend.port,
            timeout_s: blueprint.backend.timeout_s,
        },
        stereo: blueprint.stereo.enabled,
        sensor_count: descriptors.len(),
        sensors: if with_sensors {
            descriptors
        } else {
            Vec::new()
        },
    }
}

fn kind_label(kind: &SensorKind) -> String {
    match kind {
        SensorKind::Camera => "camera".into(),
        SensorKind::ScanRange(ScanLayout::Echo) => "echo".into(),
        SensorKind::ScanRange(ScanLayout::Lidar) => "lidar".into(),
        SensorKind::GpuRange => "gpu_lidar".into(),
        SensorKind::RfRanging(family) => family.as_str().to_string(),
        SensorKind::ObjectPose => "object".into(),
    }
}

fn print_config_info(blueprint: &ReplayBlueprint, with_sensors: bool) {
    let replay = &blueprint.replay;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Trajectory Recorder Config                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    println!("🚁 Replay");
    println!("   ├─ Vehicle: {}", replay.vehicle_name);
    println!(
        "   ├─ Rate: {} Hz (period {:.3}s)",
        replay.rate_hz,
        replay.period()
    );
    println!("   ├─ Pose channel: {}", replay.pose_channel);
    println!("   ├─ Static channel: {}", replay.static_channel);
    println!("   ├─ Input: {}", replay.input_log.display());
    println!("   └─ Output: {}", replay.output_log.display());
    println!();

    println!("🔌 Backend");
    println!(
        "   ├─ Address: {}:{}",
        blueprint.backend.host, blueprint.backend.port
    );
    println!("   └─ Timeout: {}s", blueprint.backend.timeout_s);
    println!();

    let descriptors = blueprint.descriptors();
    println!(
        "📡 Sensors ({}){}",
        descriptors.len(),
        if blueprint.stereo.enabled {
            " [stereo]"
        } else {
            ""
        }
    );
    for (i, sensor) in descriptors.iter().enumerate() {
        let is_last = i == descriptors.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child = if is_last { "   " } else { "│  " };

        println!("   {} {} ({})", prefix, sensor.id, kind_label(&sensor.kind));
        if with_sensors {
            for channel in &sensor.channels {
                println!("   {}  ├─ channel: {}", child, channel);
            }
            println!("   {}  └─ frames: {}", child, sensor.frames.join(", "));
        }
    }
    println!();
}
