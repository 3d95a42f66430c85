//! 回放指标收集模块
//!
//! 基于 TickMeta 收集和统计回放引擎的运行指标。

use contracts::TickMeta;
use metrics::{counter, gauge, histogram};

/// 从 TickMeta 记录指标
///
/// 每个已提交的 tick 结束后调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_tick_metrics;
///
/// let meta = engine.tick(&sample).await?;
/// record_tick_metrics(&meta);
/// ```
pub fn record_tick_metrics(meta: &TickMeta) {
    counter!("trajectory_recorder_ticks_total").increment(1);

    // tick 序号 (用于观察进度)
    gauge!("trajectory_recorder_last_tick").set(meta.index as f64);
    gauge!("trajectory_recorder_last_log_time").set(meta.log_time);

    // 耗时 (秒 -> 毫秒)
    histogram!("trajectory_recorder_tick_duration_ms").record(meta.duration_s * 1000.0);

    histogram!("trajectory_recorder_readings_per_tick").record(meta.readings as f64);

    if meta.duplicates > 0 {
        counter!("trajectory_recorder_tick_duplicates_total").increment(meta.duplicates);
    }
    if meta.skipped > 0 {
        counter!("trajectory_recorder_tick_skips_total").increment(meta.skipped);
    }
}

/// 记录被时钟跳过的轨迹样本
pub fn record_sample_skipped() {
    counter!("trajectory_recorder_samples_skipped_total").increment(1);
}

/// 记录回放进度
pub fn record_progress(sample_index: usize, sample_count: usize) {
    gauge!("trajectory_recorder_samples_read").set(sample_index as f64);
    gauge!("trajectory_recorder_samples_total").set(sample_count as f64);
}

/// 记录透传的尾部记录数
pub fn record_tail_copied(records: u64) {
    counter!("trajectory_recorder_tail_records_total").increment(records);
}

/// 回放指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct ReplayMetricsAggregator {
    /// 已提交 tick 数
    pub total_ticks: u64,

    /// 时钟跳过的样本数
    pub samples_skipped: u64,

    /// 写入的读数
    pub total_readings: u64,

    /// 重复抑制次数
    pub total_duplicates: u64,

    /// 可恢复跳过次数
    pub total_skipped: u64,

    /// 每 tick 耗时统计 (毫秒)
    pub tick_duration_stats: RunningStats,

    /// 每 tick 读数统计
    pub readings_stats: RunningStats,
}

impl ReplayMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, meta: &TickMeta) {
        self.total_ticks += 1;
        self.total_readings += meta.readings as u64;
        self.total_duplicates += meta.duplicates;
        self.total_skipped += meta.skipped;

        self.tick_duration_stats.push(meta.duration_s * 1000.0);
        self.readings_stats.push(meta.readings as f64);
    }

    /// 记录一个被时钟跳过的样本
    pub fn record_sample_skipped(&mut self) {
        self.samples_skipped += 1;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let seen = self.total_ticks + self.samples_skipped;
        MetricsSummary {
            total_ticks: self.total_ticks,
            samples_skipped: self.samples_skipped,
            total_readings: self.total_readings,
            total_duplicates: self.total_duplicates,
            total_skipped: self.total_skipped,
            commit_rate: if seen > 0 {
                self.total_ticks as f64 / seen as f64 * 100.0
            } else {
                0.0
            },
            tick_duration_ms: StatsSummary::from(&self.tick_duration_stats),
            readings_per_tick: StatsSummary::from(&self.readings_stats),
        }
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_ticks: u64,
    pub samples_skipped: u64,
    pub total_readings: u64,
    pub total_duplicates: u64,
    pub total_skipped: u64,
    /// 已提交样本占比 (%)
    pub commit_rate: f64,
    pub tick_duration_ms: StatsSummary,
    pub readings_per_tick: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Replay Metrics Summary ===")?;
        writeln!(
            f,
            "Committed ticks: {} ({:.2}% of samples)",
            self.total_ticks, self.commit_rate
        )?;
        writeln!(f, "Samples skipped by clock: {}", self.samples_skipped)?;
        writeln!(f, "Readings written: {}", self.total_readings)?;
        writeln!(f, "Duplicates suppressed: {}", self.total_duplicates)?;
        writeln!(f, "Recoverable skips: {}", self.total_skipped)?;
        writeln!(f, "Tick duration (ms): {}", self.tick_duration_ms)?;
        writeln!(f, "Readings per tick: {}", self.readings_per_tick)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(index: u64, readings: usize, duration_s: f64) -> TickMeta {
        TickMeta {
            index,
            log_time: index as f64 * 0.1,
            readings,
            duplicates: 1,
            skipped: 0,
            duration_s,
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [2.0, 4.0, 4.0, 6.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 4);
        assert!((stats.mean() - 4.0).abs() < 1e-10);
        assert!((stats.min() - 2.0).abs() < 1e-10);
        assert!((stats.max() - 6.0).abs() < 1e-10);
        assert!((stats.variance() - 8.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = ReplayMetricsAggregator::new();
        aggregator.update(&tick(0, 5, 0.010));
        aggregator.update(&tick(1, 3, 0.020));
        aggregator.record_sample_skipped();
        aggregator.record_sample_skipped();

        let summary = aggregator.summary();
        assert_eq!(summary.total_ticks, 2);
        assert_eq!(summary.total_readings, 8);
        assert_eq!(summary.total_duplicates, 2);
        assert_eq!(summary.samples_skipped, 2);
        assert!((summary.commit_rate - 50.0).abs() < 1e-10);
        assert!((summary.tick_duration_ms.mean - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = ReplayMetricsAggregator::new();
        aggregator.update(&tick(0, 4, 0.005));

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Committed ticks: 1"));
        assert!(output.contains("100.00%"));
        assert!(output.contains("Readings written: 4"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = ReplayMetricsAggregator::new().summary();
        assert_eq!(summary.commit_rate, 0.0);
        assert_eq!(format!("{}", summary.tick_duration_ms), "N/A");
    }
}
