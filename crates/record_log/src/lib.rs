//! # Record Log
//!
//! 记录日志读写。
//!
//! 负责：
//! - 读取输入轨迹日志 (`TrajectoryReader`)
//! - 写出行分隔 JSON 输出日志 (`LogWriter`)
//! - 按固定顺序合并静态变换、转换读数与透传尾部 (`LogMerger`)

pub mod error;
pub mod merger;
pub mod reader;
pub mod writer;

#[cfg(test)]
mod testing;

pub use contracts::{LogRecord, RecordSink};
pub use error::{RecordLogError, Result};
pub use merger::{LogMerger, MergeStats};
pub use reader::{LogMetadata, SampleIter, TailIter, TrajectoryReader};
pub use writer::{LogWriter, MemorySink};
