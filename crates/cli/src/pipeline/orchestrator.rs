//! Pipeline orchestrator - 串联配置、后端、日志读写与回放引擎。
//!
//! 传输层不在本工具范围内，后端固定使用内置 mock 客户端。

use std::path::PathBuf;

use anyhow::{Context, Result};
use contracts::ReplayBlueprint;
use record_log::{LogWriter, TrajectoryReader};
use replay_engine::{EngineConfig, ReplayEngine, ShutdownSignal};
use sim_client::MockSimClient;
use tracing::{info, instrument, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The replay blueprint (CLI overrides already applied)
    pub blueprint: ReplayBlueprint,

    /// Maximum number of committed ticks (None = unlimited)
    pub max_ticks: Option<u64>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the replay to completion (or until shutdown / max ticks)
    #[instrument(name = "pipeline_run", skip_all, fields(vehicle = %self.config.blueprint.replay.vehicle_name))]
    pub async fn run(self, shutdown: ShutdownSignal) -> Result<PipelineStats> {
        let blueprint = &self.config.blueprint;
        let replay = &blueprint.replay;

        // 先扫描输入，再创建输出
        let reader =
            TrajectoryReader::open(&replay.input_log, &replay.pose_channel, &replay.static_channel)
                .with_context(|| format!("Failed to open input log {}", replay.input_log.display()))?;
        info!(
            poses = reader.metadata().pose_count,
            records = reader.metadata().record_count,
            "Input log scanned"
        );

        let client = MockSimClient::new();
        warn!(
            host = %blueprint.backend.host,
            port = blueprint.backend.port,
            "Using built-in mock simulation backend; backend address is not dialed"
        );

        let engine = ReplayEngine::prepare(
            &client,
            blueprint,
            shutdown,
            EngineConfig {
                max_ticks: self.config.max_ticks,
            },
        )
        .await
        .context("Failed to prepare replay")?;
        let adapters = engine.adapters().len();
        let discovered = engine.discovered_transforms().len();

        let writer = LogWriter::create(&replay.output_log).with_context(|| {
            format!("Failed to create output log {}", replay.output_log.display())
        })?;

        let outcome = engine.run(&reader, writer).await?;

        Ok(PipelineStats {
            replay: outcome.stats,
            metrics: outcome.metrics,
            adapters,
            discovered_transforms: discovered,
            records_written: outcome.sink.written(),
            output: PathBuf::from(outcome.sink.path()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Header, Message, Pose, PoseStamped, Quaternion, Vector3};
    use record_log::LogRecord;
    use replay_engine::StopReason;
    use std::io::Write;

    fn pose_line(t: f64, x: f64) -> String {
        let record = LogRecord {
            channel: "/pose".into(),
            log_time: t,
            message: Message::Pose(PoseStamped {
                header: Header::new(t, "world"),
                pose: Pose::new(Vector3::new(x, 0.0, 0.0), Quaternion::identity()),
            }),
        };
        serde_json::to_string(&record).unwrap()
    }

    #[tokio::test]
    async fn test_pipeline_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.jsonl");
        let output = dir.path().join("out").join("merged.jsonl");

        let mut file = std::fs::File::create(&input).unwrap();
        for i in 0..5 {
            writeln!(file, "{}", pose_line(i as f64 * 0.1, i as f64)).unwrap();
        }

        let toml = format!(
            r#"
[replay]
pose_channel = "/pose"
input_log = "{}"
output_log = "{}"

[[objects]]
name = "target"
topic = "/target/pose"
"#,
            input.display(),
            output.display()
        );
        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        let stats = Pipeline::new(PipelineConfig {
            blueprint,
            max_ticks: None,
        })
        .run(ShutdownSignal::new())
        .await
        .unwrap();

        assert_eq!(stats.replay.stop_reason, StopReason::Exhausted);
        assert_eq!(stats.adapters, 1);
        assert_eq!(stats.replay.tail_records, 5);
        assert_eq!(stats.output, output);

        let content = std::fs::read_to_string(&output).unwrap();
        let records: Vec<LogRecord> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len() as u64, stats.records_written);
        assert_eq!(records[0].channel, "/tf_static");
        assert!(records.iter().any(|r| r.channel == "/target/pose"));
    }
}
