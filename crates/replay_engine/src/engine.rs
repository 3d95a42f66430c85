//! Replay engine - 逐样本回放主循环

use std::time::{Duration, Instant};

use contracts::{
    ConvertedReading, RecordSink, ReplayBlueprint, StaticTransform, TickMeta, TrajectorySample,
};
use ingestion::{
    AdapterSet, DedupTracker, IngestionStats, PollContext, ReplayTick, SensorDiscovery,
    WarningTracker,
};
use observability::{MetricsSummary, ReplayMetricsAggregator};
use record_log::{LogMerger, TrajectoryReader};
use sim_client::SimClient;
use tracing::{error, info, instrument, trace, warn};

use crate::actuator::PoseActuator;
use crate::clock::ReplayClock;
use crate::error::Result;
use crate::shutdown::ShutdownSignal;

/// 引擎运行参数
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// 提交 tick 的上限 (None = 不限)
    pub max_ticks: Option<u64>,
}

/// 回放结束原因
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    /// 样本读完
    #[default]
    Exhausted,
    /// 收到关闭信号
    Shutdown,
    /// 达到 max_ticks
    MaxTicks,
}

/// 回放统计
#[derive(Debug, Clone, Default)]
pub struct ReplayStats {
    /// 输入日志中的位姿数量
    pub samples_total: usize,
    pub samples_read: u64,
    pub ticks_committed: u64,
    /// 被时钟跳过的样本
    pub samples_skipped: u64,
    pub readings_written: u64,
    pub duplicates: u64,
    pub recoverable_skips: u64,
    /// 聚合记录中的静态变换数量
    pub static_transforms: usize,
    pub tail_records: u64,
    pub stop_reason: StopReason,
    pub duration: Duration,
}

/// 回放结果
pub struct ReplayOutcome<S> {
    pub sink: S,
    pub stats: ReplayStats,
    pub metrics: MetricsSummary,
}

/// 回放引擎
///
/// 独占后端调用顺序、去重状态与输出日志；一次只处理一个样本。
pub struct ReplayEngine<'a, C: SimClient> {
    client: &'a C,
    blueprint: &'a ReplayBlueprint,
    adapters: AdapterSet,
    discovered: Vec<StaticTransform>,
    clock: ReplayClock,
    actuator: PoseActuator,
    dedup: DedupTracker,
    warnings: WarningTracker,
    ingestion: IngestionStats,
    aggregator: ReplayMetricsAggregator,
    shutdown: ShutdownSignal,
    config: EngineConfig,
    ticks: u64,
}

impl<'a, C: SimClient> ReplayEngine<'a, C> {
    /// 连接后端并解析全部传感器
    #[instrument(
        name = "replay_engine_prepare",
        skip_all,
        fields(
            vehicle = %blueprint.replay.vehicle_name,
            rate_hz = blueprint.replay.rate_hz
        )
    )]
    pub async fn prepare(
        client: &'a C,
        blueprint: &'a ReplayBlueprint,
        shutdown: ShutdownSignal,
        config: EngineConfig,
    ) -> Result<Self> {
        sim_client::connect(client, &blueprint.backend).await?;

        let report = SensorDiscovery::new(client).discover(blueprint).await?;
        let adapters = AdapterSet::build(blueprint, &report);
        info!(
            adapters = adapters.len(),
            static_transforms = report.transforms.len(),
            "sensors resolved"
        );

        let period = blueprint.replay.period();
        Ok(Self {
            client,
            blueprint,
            adapters,
            discovered: report.transforms,
            clock: ReplayClock::with_period(period),
            actuator: PoseActuator::new(&blueprint.replay.vehicle_name, period),
            dedup: DedupTracker::new(),
            warnings: WarningTracker::new(),
            ingestion: IngestionStats::new(),
            aggregator: ReplayMetricsAggregator::new(),
            shutdown,
            config,
            ticks: 0,
        })
    }

    pub fn adapters(&self) -> &AdapterSet {
        &self.adapters
    }

    /// 启动时发现的静态变换
    pub fn discovered_transforms(&self) -> &[StaticTransform] {
        &self.discovered
    }

    pub fn ticks_committed(&self) -> u64 {
        self.ticks
    }

    /// 处理一个样本；`None` 表示被时钟跳过，没有任何后端调用
    pub async fn step(
        &mut self,
        sample: &TrajectorySample,
    ) -> Result<Option<(TickMeta, Vec<ConvertedReading>)>> {
        if !self.clock.should_commit(sample.log_time) {
            trace!(log_time = sample.log_time, "sample skipped by clock");
            self.aggregator.record_sample_skipped();
            observability::record_sample_skipped();
            return Ok(None);
        }

        let started = Instant::now();
        let index = self.ticks;
        self.actuator.commit(self.client, index, sample).await?;

        let tick = ReplayTick {
            index,
            log_time: sample.log_time,
            stamp: sample.stamp,
        };
        let before = self.ingestion;
        let mut ctx = PollContext::new(
            tick,
            &self.blueprint.replay.vehicle_name,
            &mut self.dedup,
            &mut self.warnings,
            &mut self.ingestion,
        );
        let readings = self.adapters.poll_all(self.client, &mut ctx).await?;
        self.ticks += 1;

        let meta = TickMeta {
            index,
            log_time: sample.log_time,
            readings: readings.len(),
            duplicates: self.ingestion.duplicates - before.duplicates,
            skipped: self.ingestion.skipped - before.skipped,
            duration_s: started.elapsed().as_secs_f64(),
        };
        observability::record_tick_metrics(&meta);
        self.aggregator.update(&meta);

        Ok(Some((meta, readings)))
    }

    /// 完整回放：静态变换聚合 -> 逐 tick 读数 -> 透传尾部
    ///
    /// 致命错误时仍会关闭输出日志，再返回错误。
    #[instrument(
        name = "replay_engine_run",
        skip_all,
        fields(input = %reader.path().display(), output = %sink.name())
    )]
    pub async fn run<S: RecordSink>(
        mut self,
        reader: &TrajectoryReader,
        sink: S,
    ) -> Result<ReplayOutcome<S>> {
        let started = Instant::now();
        let metadata = reader.metadata();

        let mut aggregate = self.discovered.clone();
        aggregate.extend(metadata.static_transforms.iter().cloned());
        let first_log_time = metadata.first_pose_time.unwrap_or(0.0);
        if metadata.first_pose_time.is_none() {
            warn!("input log has no trajectory samples");
        }

        let mut merger = LogMerger::begin(
            sink,
            &self.blueprint.replay.static_channel,
            &aggregate,
            first_log_time,
        )
        .await?;

        let mut stats = ReplayStats {
            samples_total: metadata.pose_count,
            static_transforms: aggregate.len(),
            ..Default::default()
        };

        match self.replay_samples(reader, &mut merger, &mut stats).await {
            Ok(reason) => stats.stop_reason = reason,
            Err(e) => {
                error!(error = %e, "replay aborted, closing output log");
                if let Err(close_err) = merger.finish().await {
                    warn!(error = %close_err, "failed to close output log");
                }
                return Err(e);
            }
        }

        stats.tail_records = merger.write_tail(reader.tail()?).await?;
        observability::record_tail_copied(stats.tail_records);

        let (sink, merged) = merger.finish().await?;
        stats.readings_written = merged.readings;
        stats.ticks_committed = self.ticks;
        stats.duplicates = self.ingestion.duplicates;
        stats.recoverable_skips = self.ingestion.skipped;
        stats.duration = started.elapsed();

        info!(
            ticks = stats.ticks_committed,
            skipped = stats.samples_skipped,
            readings = stats.readings_written,
            tail = stats.tail_records,
            stop_reason = ?stats.stop_reason,
            "replay finished"
        );

        Ok(ReplayOutcome {
            sink,
            stats,
            metrics: self.aggregator.summary(),
        })
    }

    async fn replay_samples<S: RecordSink>(
        &mut self,
        reader: &TrajectoryReader,
        merger: &mut LogMerger<S>,
        stats: &mut ReplayStats,
    ) -> Result<StopReason> {
        let total = stats.samples_total;

        for (i, sample) in reader.samples()?.enumerate() {
            if self.shutdown.is_triggered() {
                info!(samples_read = stats.samples_read, "stopping replay on shutdown");
                return Ok(StopReason::Shutdown);
            }
            if self.config.max_ticks.is_some_and(|max| self.ticks >= max) {
                info!(ticks = self.ticks, "reached max ticks limit");
                return Ok(StopReason::MaxTicks);
            }

            let sample = sample?;
            stats.samples_read += 1;
            observability::record_progress(i + 1, total);

            match self.step(&sample).await? {
                Some((meta, readings)) => {
                    info!(
                        tick = meta.index,
                        readings = meta.readings,
                        "pose {} of {}",
                        i + 1,
                        total
                    );
                    merger.write_readings(readings).await?;
                }
                None => stats.samples_skipped += 1,
            }
        }

        Ok(StopReason::Exhausted)
    }
}
