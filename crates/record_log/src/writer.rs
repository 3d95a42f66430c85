//! 输出日志 sink
//!
//! - `LogWriter`: 行分隔 JSON 文件
//! - `MemorySink`: 内存中的记录行 (测试与 dry-run)

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{ContractError, LogRecord, RecordSink};
use tracing::{debug, error, info, instrument};

use crate::error::{RecordLogError, Result};

/// JSONL 输出日志
pub struct LogWriter {
    name: String,
    path: PathBuf,
    out: Option<BufWriter<File>>,
    written: u64,
}

impl LogWriter {
    /// 创建输出文件 (必要时创建父目录)，已有文件会被截断
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RecordLogError::open(parent, e))?;
        }
        let file = File::create(&path).map_err(|e| RecordLogError::open(&path, e))?;

        Ok(Self {
            name: path.display().to_string(),
            path,
            out: Some(BufWriter::new(file)),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 已写入的记录数
    pub fn written(&self) -> u64 {
        self.written
    }

    fn write_line(&mut self, line: &str) -> std::result::Result<(), ContractError> {
        let out = self
            .out
            .as_mut()
            .ok_or_else(|| ContractError::log_write(&self.name, "log already closed"))?;
        out.write_all(line.as_bytes())
            .and_then(|()| out.write_all(b"\n"))
            .map_err(|e| {
                error!(log = %self.name, error = %e, "write failed");
                ContractError::log_write(&self.name, e.to_string())
            })?;
        self.written += 1;
        Ok(())
    }
}

impl RecordSink for LogWriter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn append(&mut self, record: &LogRecord) -> std::result::Result<(), ContractError> {
        let line = serde_json::to_string(record)
            .map_err(|e| ContractError::log_write(&self.name, e.to_string()))?;
        self.write_line(&line)
    }

    async fn append_raw(&mut self, line: &str) -> std::result::Result<(), ContractError> {
        self.write_line(line)
    }

    #[instrument(name = "log_writer_close", skip(self), fields(log = %self.name))]
    async fn close(&mut self) -> std::result::Result<(), ContractError> {
        if let Some(mut out) = self.out.take() {
            out.flush()
                .map_err(|e| ContractError::log_write(&self.name, e.to_string()))?;
            info!(records = self.written, "output log closed");
        }
        Ok(())
    }
}

/// 内存 sink
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Vec<String>,
    closed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 解析全部记录行
    pub fn records(&self) -> std::result::Result<Vec<LogRecord>, serde_json::Error> {
        self.lines.iter().map(|l| serde_json::from_str(l)).collect()
    }
}

impl RecordSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&mut self, record: &LogRecord) -> std::result::Result<(), ContractError> {
        let line = serde_json::to_string(record)
            .map_err(|e| ContractError::log_write("memory", e.to_string()))?;
        self.lines.push(line);
        Ok(())
    }

    async fn append_raw(&mut self, line: &str) -> std::result::Result<(), ContractError> {
        self.lines.push(line.to_string());
        Ok(())
    }

    async fn close(&mut self) -> std::result::Result<(), ContractError> {
        debug!(records = self.lines.len(), "memory sink closed");
        self.closed = true;
        Ok(())
    }
}
