//! LogMerger - 有序合并输出日志
//!
//! 写入顺序固定：
//! 1. 静态变换聚合记录 (仅一次，时间取首个轨迹样本)
//! 2. 逐 tick 的转换读数
//! 3. 输入日志的透传尾部

use contracts::{ConvertedReading, LogRecord, Message, RecordSink, StaticTransform, TfMessage};
use tracing::{info, instrument};

use crate::error::{RecordLogError, Result};

/// 合并统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// 聚合记录中的静态变换数量
    pub static_transforms: usize,
    /// 写入的转换读数
    pub readings: u64,
    /// 透传的原始记录
    pub tail_records: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Readings,
    Tail,
    Closed,
}

/// 有序合并器
pub struct LogMerger<S: RecordSink> {
    sink: S,
    phase: Phase,
    last_log_time: f64,
    stats: MergeStats,
}

impl<S: RecordSink> LogMerger<S> {
    /// 写入静态变换聚合记录并返回合并器
    #[instrument(
        name = "log_merger_begin",
        skip(sink, transforms),
        fields(output = %sink.name(), transforms = transforms.len())
    )]
    pub async fn begin(
        mut sink: S,
        static_channel: &str,
        transforms: &[StaticTransform],
        log_time: f64,
    ) -> Result<Self> {
        let aggregate = LogRecord {
            channel: static_channel.to_string(),
            log_time,
            message: Message::StaticTransforms(TfMessage {
                transforms: transforms.iter().map(|t| t.to_stamped(log_time)).collect(),
            }),
        };
        sink.append(&aggregate).await?;
        info!(log_time, "static transform aggregate written");

        Ok(Self {
            sink,
            phase: Phase::Readings,
            last_log_time: log_time,
            stats: MergeStats {
                static_transforms: transforms.len(),
                ..Default::default()
            },
        })
    }

    /// 写入一个 tick 的读数
    pub async fn write_readings(&mut self, readings: Vec<ConvertedReading>) -> Result<()> {
        self.expect_phase(Phase::Readings, "readings")?;
        for reading in readings {
            if reading.log_time < self.last_log_time {
                return Err(RecordLogError::OutOfOrder {
                    log_time: reading.log_time,
                    previous: self.last_log_time,
                });
            }
            self.last_log_time = reading.log_time;
            self.sink.append(&reading.into_record()).await?;
            self.stats.readings += 1;
        }
        Ok(())
    }

    /// 透传原始记录行
    #[instrument(name = "log_merger_tail", skip(self, tail), fields(sink = %self.sink.name()))]
    pub async fn write_tail<I>(&mut self, tail: I) -> Result<u64>
    where
        I: IntoIterator<Item = Result<String>>,
        I::IntoIter: Send,
    {
        if self.phase == Phase::Readings {
            self.phase = Phase::Tail;
        }
        self.expect_phase(Phase::Tail, "tail")?;

        let before = self.stats.tail_records;
        for line in tail {
            self.sink.append_raw(&line?).await?;
            self.stats.tail_records += 1;
        }
        let copied = self.stats.tail_records - before;
        info!(records = copied, "input tail copied");
        Ok(copied)
    }

    pub fn stats(&self) -> MergeStats {
        self.stats
    }

    /// 关闭 sink，返回 sink 与统计
    pub async fn finish(mut self) -> Result<(S, MergeStats)> {
        if self.phase != Phase::Closed {
            self.sink.close().await?;
            self.phase = Phase::Closed;
        }
        Ok((self.sink, self.stats))
    }

    fn expect_phase(&self, expected: Phase, operation: &'static str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(RecordLogError::Phase {
                operation,
                phase: format!("{:?}", self.phase),
            })
        }
    }
}
