//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::ReplayBlueprint;
use record_log::TrajectoryReader;
use replay_engine::ShutdownSignal;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args)?;

    info!(
        vehicle = %blueprint.replay.vehicle_name,
        rate_hz = blueprint.replay.rate_hz,
        host = %blueprint.backend.host,
        port = blueprint.backend.port,
        sensors = blueprint.descriptors().len(),
        "Configuration loaded"
    );

    if !blueprint.replay.input_log.exists() {
        return Err(CliError::input_log_not_found(&blueprint.replay.input_log).into());
    }

    // Dry run - scan the input log and exit
    if args.dry_run {
        let reader = TrajectoryReader::open(
            &blueprint.replay.input_log,
            &blueprint.replay.pose_channel,
            &blueprint.replay.static_channel,
        )
        .context("Failed to scan input log")?;
        info!("Dry run mode - configuration is valid, exiting");
        print_dry_run_summary(&blueprint, &reader);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        max_ticks: (args.max_ticks != 0).then_some(args.max_ticks),
    });

    let shutdown = ShutdownSignal::new();
    let signal_task = tokio::spawn(wait_for_shutdown(shutdown.clone()));

    info!("Starting replay...");
    let result = pipeline.run(shutdown).await;
    signal_task.abort();

    let stats = result.context("Replay failed")?;
    info!(
        ticks = stats.replay.ticks_committed,
        readings = stats.replay.readings_written,
        stop_reason = ?stats.replay.stop_reason,
        duration_secs = stats.replay.duration.as_secs_f64(),
        "Replay completed"
    );
    stats.print_summary();

    info!("Trajectory Recorder finished");
    Ok(())
}

/// 把命令行覆盖项写入配置，并重新校验
fn apply_overrides(blueprint: &mut ReplayBlueprint, args: &RunArgs) -> Result<()> {
    if let Some(ref input) = args.input {
        info!(input = %input.display(), "Overriding input log from CLI");
        blueprint.replay.input_log = input.clone();
    }
    if let Some(ref output) = args.output {
        info!(output = %output.display(), "Overriding output log from CLI");
        blueprint.replay.output_log = output.clone();
    }
    if let Some(rate) = args.rate {
        info!(rate_hz = rate, "Overriding replay rate from CLI");
        blueprint.replay.rate_hz = rate;
    }

    config_loader::validate(blueprint).map_err(|e| CliError::config_validation(e.to_string()))?;
    Ok(())
}

/// 等待 Ctrl+C / SIGTERM 并触发关闭信号
async fn wait_for_shutdown(shutdown: ShutdownSignal) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %CliError::signal("Ctrl+C", &e), "Shutdown on Ctrl+C unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %CliError::signal("SIGTERM", &e), "Shutdown on SIGTERM unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    shutdown.trigger();
}

/// Print configuration summary for dry-run mode
fn print_dry_run_summary(blueprint: &ReplayBlueprint, reader: &TrajectoryReader) {
    let replay = &blueprint.replay;
    let meta = reader.metadata();

    println!("\n=== Replay Summary ===\n");
    println!("Replay:");
    println!("  Vehicle: {}", replay.vehicle_name);
    println!("  Rate: {} Hz (period {:.3}s)", replay.rate_hz, replay.period());
    println!("  Input: {}", replay.input_log.display());
    println!("  Output: {}", replay.output_log.display());
    println!(
        "  Backend: {}:{}",
        blueprint.backend.host, blueprint.backend.port
    );

    println!("\nInput log:");
    println!("  Records: {}", meta.record_count);
    println!("  Poses on {}: {}", replay.pose_channel, meta.pose_count);
    if let Some(t) = meta.first_pose_time {
        println!("  First pose at: {t:.3}s");
    }
    println!("  Static transforms: {}", meta.static_transforms.len());

    let sensors = blueprint.descriptors();
    println!("\nSensors ({}):", sensors.len());
    for sensor in &sensors {
        println!("  - {} ({:?})", sensor.id, sensor.kind);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    const CONFIG: &str = r#"
[replay]
vehicle_name = "drone_1"
input_log = "in.jsonl"
output_log = "out.jsonl"
"#;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["trajectory-recorder", "run"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_overrides_applied() {
        let mut blueprint =
            config_loader::ConfigLoader::load_from_str(CONFIG, config_loader::ConfigFormat::Toml)
                .unwrap();
        let args = run_args(&["--output", "merged.jsonl", "--rate", "20"]);

        apply_overrides(&mut blueprint, &args).unwrap();
        assert_eq!(blueprint.replay.output_log.to_str(), Some("merged.jsonl"));
        assert_eq!(blueprint.replay.rate_hz, 20.0);
        assert_eq!(blueprint.replay.input_log.to_str(), Some("in.jsonl"));
    }

    #[test]
    fn test_backend_address_is_not_a_run_flag() {
        for flag in ["--host", "--port"] {
            let argv = ["trajectory-recorder", "run", flag, "9000"];
            assert!(Cli::try_parse_from(argv).is_err(), "{flag} accepted");
        }
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut blueprint =
            config_loader::ConfigLoader::load_from_str(CONFIG, config_loader::ConfigFormat::Toml)
                .unwrap();
        let args = run_args(&["--output", "in.jsonl"]);

        let err = apply_overrides(&mut blueprint, &args).unwrap_err();
        assert!(err.downcast_ref::<CliError>().is_some());
    }

    #[tokio::test]
    async fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let args = run_args(&["-c", dir.path().join("nope.toml").to_str().unwrap()]);

        let err = run_pipeline(&args).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::ConfigNotFound { .. })
        ));
    }
}
