//! 传感器适配器 trait

use std::future::Future;

use contracts::{ConvertedReading, Message, SensorKind};
use sim_client::SimClient;

use crate::dedup::{DedupTracker, WarningTracker};
use crate::error::Result;
use crate::stats::IngestionStats;

/// 一个已提交的回放 tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayTick {
    /// 已提交 tick 的序号 (从 0 开始)
    pub index: u64,
    /// 轨迹样本的日志时间
    pub log_time: f64,
    /// 轨迹样本的 header 时间戳
    pub stamp: f64,
}

/// 单次轮询的上下文
///
/// 状态由引擎持有，适配器只在一次轮询期间借用。
pub struct PollContext<'a> {
    pub tick: ReplayTick,
    pub vehicle: &'a str,
    pub dedup: &'a mut DedupTracker,
    pub warnings: &'a mut WarningTracker,
    pub stats: &'a mut IngestionStats,
}

impl<'a> PollContext<'a> {
    pub fn new(
        tick: ReplayTick,
        vehicle: &'a str,
        dedup: &'a mut DedupTracker,
        warnings: &'a mut WarningTracker,
        stats: &'a mut IngestionStats,
    ) -> Self {
        Self {
            tick,
            vehicle,
            dedup,
            warnings,
            stats,
        }
    }

    /// 生成一条读数，时间全部取自当前 tick
    pub fn reading(
        &mut self,
        sensor_id: &str,
        channel: &str,
        message: Message,
    ) -> ConvertedReading {
        let reading = ConvertedReading {
            sensor_id: sensor_id.to_string(),
            channel: channel.to_string(),
            log_time: self.tick.log_time,
            message,
        };
        self.stats.record_reading(&reading);
        reading
    }
}

/// 传感器适配器 trait
///
/// 为每类传感器实现此 trait，负责：
/// 1. 每个 tick 调用一次后端
/// 2. 重复抑制
/// 3. 转换为输出坐标系与编码
/// 4. 生成 `ConvertedReading`
///
/// 可恢复的问题在适配器内部记录并跳过，只有致命错误才返回 `Err`。
pub trait SensorAdapter: Send + Sync {
    /// 获取传感器 ID
    fn sensor_id(&self) -> &str;

    /// 获取传感器类别
    fn kind(&self) -> SensorKind;

    /// 拉取并转换当前 tick 的读数
    fn poll<C: SimClient>(
        &self,
        client: &C,
        ctx: &mut PollContext<'_>,
    ) -> impl Future<Output = Result<Vec<ConvertedReading>>> + Send;
}
