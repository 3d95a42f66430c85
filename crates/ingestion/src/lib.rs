//! # Ingestion
//!
//! Per-tick sensor capture.
//!
//! Responsibilities:
//! - Resolve sensor mounts at startup into static transforms (`SensorDiscovery`)
//! - Poll every configured sensor once per tick through `SensorAdapter`s
//! - Suppress duplicate readings by backend timestamp (`DedupTracker`)
//! - Convert backend payloads into output-convention records (`FrameConverter`)
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{AdapterSet, PollContext, SensorDiscovery};
//!
//! let report = SensorDiscovery::new(&client).discover(&blueprint).await?;
//! let adapters = AdapterSet::build(&blueprint, &report);
//!
//! let mut ctx = PollContext::new(tick, &vehicle, &mut dedup, &mut warnings, &mut stats);
//! let readings = adapters.poll_all(&client, &mut ctx).await?;
//! ```

mod adapter;
mod adapters;
mod converter;
mod dedup;
mod discovery;
mod error;
mod rf;
mod stats;

// Re-exports
pub use adapter::{PollContext, ReplayTick, SensorAdapter};
pub use adapters::{
    AdapterSet, CameraAdapter, CameraSetup, GpuRangeAdapter, ImageStream, ObjectPoseAdapter,
    RfRangingAdapter, ScanRangeAdapter,
};
pub use converter::{ConvertError, FrameConverter};
pub use dedup::{DedupKey, DedupTracker, WarningTracker};
pub use discovery::{optical_rotation, DiscoveryReport, SensorDiscovery};
pub use error::{IngestionError, Result};
pub use rf::{output_anchor_id, ConsolidatedRange, RfSnapshot, TagPacket};
pub use stats::{IngestionStats, SkipReason};
