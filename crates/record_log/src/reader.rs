//! TrajectoryReader - 输入日志读取
//!
//! 打开时先做一遍元数据扫描 (位姿数量、首个位姿时间、静态变换)，
//! 之后按需惰性地重新打开文件：
//! - `samples()` 只产出位姿通道上的轨迹样本
//! - `tail()` 原样产出除静态变换通道外的全部记录行

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use contracts::{LogRecord, Message, StaticTransform, TrajectorySample};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::error::{RecordLogError, Result};

/// 只解析记录信封，消息体保持原样
#[derive(Debug, Deserialize)]
struct Envelope {
    channel: String,
    log_time: f64,
}

/// 输入日志元数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogMetadata {
    /// 非空记录行总数
    pub record_count: usize,
    /// 位姿通道上的记录数
    pub pose_count: usize,
    /// 首个位姿记录的日志时间
    pub first_pose_time: Option<f64>,
    /// 静态变换通道上已有的变换
    pub static_transforms: Vec<StaticTransform>,
    /// 每个通道的记录数
    pub channels: BTreeMap<String, usize>,
}

/// 轨迹日志读取器
#[derive(Debug)]
pub struct TrajectoryReader {
    path: PathBuf,
    pose_channel: String,
    static_channel: String,
    metadata: LogMetadata,
}

impl TrajectoryReader {
    /// 打开输入日志并扫描元数据
    #[instrument(
        name = "trajectory_reader_open",
        skip(path, pose_channel, static_channel),
        fields(log = %path.as_ref().display())
    )]
    pub fn open(
        path: impl AsRef<Path>,
        pose_channel: impl Into<String>,
        static_channel: impl Into<String>,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let pose_channel = pose_channel.into();
        let static_channel = static_channel.into();

        let mut metadata = LogMetadata::default();
        for entry in RecordLines::open(&path)? {
            let (line_no, line) = entry?;
            let envelope = parse_envelope(line_no, &line)?;

            metadata.record_count += 1;
            *metadata
                .channels
                .entry(envelope.channel.clone())
                .or_default() += 1;

            if envelope.channel == pose_channel {
                metadata.pose_count += 1;
                metadata.first_pose_time.get_or_insert(envelope.log_time);
            } else if envelope.channel == static_channel {
                let record = parse_record(line_no, &line)?;
                if let Message::StaticTransforms(tf) = &record.message {
                    metadata
                        .static_transforms
                        .extend(tf.transforms.iter().map(StaticTransform::from));
                }
            }
        }

        info!(
            records = metadata.record_count,
            poses = metadata.pose_count,
            static_transforms = metadata.static_transforms.len(),
            "input log scanned"
        );

        Ok(Self {
            path,
            pose_channel,
            static_channel,
            metadata,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &LogMetadata {
        &self.metadata
    }

    /// 位姿通道上的轨迹样本，按文件顺序
    pub fn samples(&self) -> Result<SampleIter> {
        Ok(SampleIter {
            lines: RecordLines::open(&self.path)?,
            pose_channel: self.pose_channel.clone(),
        })
    }

    /// 原始记录行，跳过静态变换通道
    pub fn tail(&self) -> Result<TailIter> {
        Ok(TailIter {
            lines: RecordLines::open(&self.path)?,
            static_channel: self.static_channel.clone(),
        })
    }
}

/// 轨迹样本迭代器
pub struct SampleIter {
    lines: RecordLines,
    pose_channel: String,
}

impl Iterator for SampleIter {
    type Item = Result<TrajectorySample>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (line_no, line) = match self.lines.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };
            match parse_envelope(line_no, &line) {
                Ok(envelope) if envelope.channel != self.pose_channel => continue,
                Ok(_) => return Some(to_sample(line_no, &line)),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// 透传记录迭代器
pub struct TailIter {
    lines: RecordLines,
    static_channel: String,
}

impl Iterator for TailIter {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (line_no, line) = match self.lines.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };
            match parse_envelope(line_no, &line) {
                Ok(envelope) if envelope.channel == self.static_channel => {
                    debug!(line = line_no, "static transform record left out of tail");
                    continue;
                }
                Ok(_) => return Some(Ok(line)),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// 逐行读取，跳过空行；行号从 1 开始
struct RecordLines {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl RecordLines {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| RecordLogError::open(path, e))?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl Iterator for RecordLines {
    type Item = Result<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(Ok((self.line_no, line))),
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

fn parse_envelope(line_no: usize, line: &str) -> Result<Envelope> {
    serde_json::from_str(line).map_err(|e| RecordLogError::parse(line_no, e))
}

fn parse_record(line_no: usize, line: &str) -> Result<LogRecord> {
    serde_json::from_str(line).map_err(|e| RecordLogError::parse(line_no, e))
}

fn to_sample(line_no: usize, line: &str) -> Result<TrajectorySample> {
    let record = parse_record(line_no, line)?;
    match record.message {
        Message::Pose(pose) => Ok(TrajectorySample {
            log_time: record.log_time,
            stamp: pose.header.stamp,
            pose: pose.pose,
        }),
        other => Err(RecordLogError::NotAPose {
            line: line_no,
            channel: record.channel,
            kind: other.kind(),
        }),
    }
}
