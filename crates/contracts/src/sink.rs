//! RecordSink trait - output log interface
//!
//! Defines the abstract interface for append-only record logs.

use crate::{ContractError, LogRecord};

/// Append-only record output
///
/// All output log implementations must implement this trait.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Append a typed record
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn append(&mut self, record: &LogRecord) -> Result<(), ContractError>;

    /// Append an already-encoded record verbatim
    async fn append_raw(&mut self, line: &str) -> Result<(), ContractError>;

    /// Flush and close; called exactly once
    async fn close(&mut self) -> Result<(), ContractError>;
}
