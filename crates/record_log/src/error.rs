//! Record log error types

use std::path::PathBuf;

use contracts::ContractError;
use thiserror::Error;

/// Record-log specific errors
#[derive(Debug, Error)]
pub enum RecordLogError {
    /// Input/output log could not be opened or created
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed record line
    #[error("malformed record at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Record on the pose channel that is not a pose
    #[error("record at line {line} on channel '{channel}' is not a pose (kind '{kind}')")]
    NotAPose {
        line: usize,
        channel: String,
        kind: &'static str,
    },

    /// Reading older than one already written
    #[error("reading at log_time {log_time} written after {previous}")]
    OutOfOrder { log_time: f64, previous: f64 },

    /// Merge operation issued in the wrong phase
    #[error("cannot write {operation} in phase {phase}")]
    Phase {
        operation: &'static str,
        phase: String,
    },

    /// Sink write error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecordLogError {
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    pub fn parse(line: usize, source: serde_json::Error) -> Self {
        Self::Parse { line, source }
    }
}

impl From<RecordLogError> for ContractError {
    fn from(err: RecordLogError) -> Self {
        match err {
            RecordLogError::Contract(inner) => inner,
            RecordLogError::Io(inner) => ContractError::Io(inner),
            RecordLogError::Parse { line, source } => ContractError::LogRead {
                line,
                message: source.to_string(),
            },
            RecordLogError::NotAPose {
                line,
                channel,
                kind,
            } => ContractError::LogRead {
                line,
                message: format!("'{channel}' carries '{kind}', expected a pose"),
            },
            other => ContractError::Other(other.to_string()),
        }
    }
}

/// Result type alias for record log operations
pub type Result<T> = std::result::Result<T, RecordLogError>;
