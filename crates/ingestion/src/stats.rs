//! Per-run ingestion counters
//!
//! Kept in memory for the run summary and mirrored to `metrics` counters.

use contracts::ConvertedReading;
use metrics::counter;

/// Why a reading was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Backend returned a 0×0 image
    EmptyImage,
    /// Image payload length does not match its dimensions
    ImageSize,
    /// Fewer floats than one point
    ShortPayload,
    /// Object position is NaN
    NanPose,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            SkipReason::EmptyImage => "empty_image",
            SkipReason::ImageSize => "image_size",
            SkipReason::ShortPayload => "short_payload",
            SkipReason::NanPose => "nan_pose",
        }
    }
}

/// Ingestion counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionStats {
    /// Readings produced
    pub readings: u64,
    /// Samples suppressed as duplicates
    pub duplicates: u64,
    /// Recoverable skips
    pub skipped: u64,
}

impl IngestionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_reading(&mut self, reading: &ConvertedReading) {
        self.readings += 1;
        counter!(
            "trajectory_recorder_readings_total",
            "sensor_id" => reading.sensor_id.clone(),
            "kind" => reading.message.kind()
        )
        .increment(1);
    }

    pub fn record_duplicate(&mut self, sensor_id: &str) {
        self.duplicates += 1;
        counter!(
            "trajectory_recorder_duplicates_total",
            "sensor_id" => sensor_id.to_string()
        )
        .increment(1);
    }

    pub fn record_skip(&mut self, sensor_id: &str, reason: SkipReason) {
        self.skipped += 1;
        counter!(
            "trajectory_recorder_skipped_total",
            "sensor_id" => sensor_id.to_string(),
            "reason" => reason.as_str()
        )
        .increment(1);
    }
}
