//! Pipeline statistics.

use std::path::PathBuf;

use observability::MetricsSummary;
use replay_engine::{ReplayStats, StopReason};

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// 回放引擎统计
    pub replay: ReplayStats,

    /// 逐 tick 指标摘要
    pub metrics: MetricsSummary,

    /// 活跃适配器数量
    pub adapters: usize,

    /// 启动时发现的传感器变换数量
    pub discovered_transforms: usize,

    /// 输出日志总行数
    pub records_written: u64,

    /// 输出日志路径
    pub output: PathBuf,
}

impl PipelineStats {
    /// Committed ticks per wall-clock second
    pub fn ticks_per_second(&self) -> f64 {
        let secs = self.replay.duration.as_secs_f64();
        if secs > 0.0 {
            self.replay.ticks_committed as f64 / secs
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let replay = &self.replay;

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Replay Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", replay.duration.as_secs_f64());
        println!("   ├─ Stop reason: {}", stop_reason_label(replay.stop_reason));
        println!("   ├─ Throughput: {:.2} ticks/s", self.ticks_per_second());
        println!("   └─ Adapters: {}", self.adapters);
        println!();

        println!("🧭 Trajectory");
        println!(
            "   ├─ Samples read: {} of {}",
            replay.samples_read, replay.samples_total
        );
        println!("   ├─ Ticks committed: {}", replay.ticks_committed);
        println!("   └─ Skipped by clock: {}", replay.samples_skipped);
        println!();

        println!("📝 Output");
        println!(
            "   ├─ Static transforms: {} ({} discovered)",
            replay.static_transforms, self.discovered_transforms
        );
        println!("   ├─ Readings: {}", replay.readings_written);
        println!("   ├─ Duplicates suppressed: {}", replay.duplicates);
        println!("   ├─ Recoverable skips: {}", replay.recoverable_skips);
        println!("   ├─ Tail records: {}", replay.tail_records);
        println!(
            "   └─ {} ({} records)",
            self.output.display(),
            self.records_written
        );
        println!();

        println!("{}", self.metrics);
    }
}

fn stop_reason_label(reason: StopReason) -> &'static str {
    match reason {
        StopReason::Exhausted => "trajectory exhausted",
        StopReason::Shutdown => "shutdown requested",
        StopReason::MaxTicks => "tick limit reached",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ticks_per_second() {
        let stats = PipelineStats {
            replay: ReplayStats {
                ticks_committed: 50,
                duration: Duration::from_secs(5),
                ..Default::default()
            },
            metrics: MetricsSummary::default(),
            adapters: 3,
            discovered_transforms: 0,
            records_written: 0,
            output: PathBuf::from("out.jsonl"),
        };
        assert!((stats.ticks_per_second() - 10.0).abs() < 1e-9);
    }
}
