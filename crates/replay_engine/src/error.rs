//! Replay engine error types

use ingestion::IngestionError;
use record_log::RecordLogError;
use sim_client::SimClientError;
use thiserror::Error;

/// Fatal replay errors
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Backend unreachable or call failed outside a tick
    #[error("backend error: {0}")]
    Backend(#[from] SimClientError),

    /// Pose could not be committed; the run cannot continue
    #[error("failed to commit pose {index} (log_time {log_time}): {source}")]
    PoseCommit {
        index: u64,
        log_time: f64,
        #[source]
        source: SimClientError,
    },

    /// Discovery or sensor protocol failure
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    /// Input or output log failure
    #[error(transparent)]
    Log(#[from] RecordLogError),
}

impl ReplayError {
    pub fn pose_commit(index: u64, log_time: f64, source: SimClientError) -> Self {
        Self::PoseCommit {
            index,
            log_time,
            source,
        }
    }
}

impl From<contracts::ContractError> for ReplayError {
    fn from(err: contracts::ContractError) -> Self {
        Self::Log(RecordLogError::Contract(err))
    }
}

/// Result type alias for replay operations
pub type Result<T> = std::result::Result<T, ReplayError>;
