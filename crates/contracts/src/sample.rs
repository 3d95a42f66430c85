//! Replay-time data: trajectory samples, static transforms, converted readings
//! and per-tick bookkeeping.

use crate::{Header, LogRecord, Message, Pose, Quaternion, Transform, TransformStamped, Vector3};

/// One recorded pose from the input trajectory.
///
/// Immutable once read; consumed once by the pose actuator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    /// Record time in the input log (seconds)
    pub log_time: f64,
    /// Header stamp of the recorded pose (seconds)
    pub stamp: f64,
    /// Pose in output convention
    pub pose: Pose,
}

/// Fixed spatial relationship between two named frames
#[derive(Debug, Clone, PartialEq)]
pub struct StaticTransform {
    pub parent_frame: String,
    pub child_frame: String,
    pub translation: Vector3,
    pub rotation: Quaternion,
}

impl StaticTransform {
    pub fn new(
        parent_frame: impl Into<String>,
        child_frame: impl Into<String>,
        translation: Vector3,
        rotation: Quaternion,
    ) -> Self {
        Self {
            parent_frame: parent_frame.into(),
            child_frame: child_frame.into(),
            translation,
            rotation,
        }
    }

    pub fn to_stamped(&self, stamp: f64) -> TransformStamped {
        TransformStamped {
            header: Header::new(stamp, self.parent_frame.clone()),
            child_frame_id: self.child_frame.clone(),
            transform: Transform {
                translation: self.translation,
                rotation: self.rotation,
            },
        }
    }
}

impl From<&TransformStamped> for StaticTransform {
    fn from(stamped: &TransformStamped) -> Self {
        Self {
            parent_frame: stamped.header.frame_id.clone(),
            child_frame: stamped.child_frame_id.clone(),
            translation: stamped.transform.translation,
            rotation: stamped.transform.rotation,
        }
    }
}

/// Canonical output produced by a sensor adapter for one tick.
///
/// `log_time` and the header stamp inside `message` always come from the
/// tick's trajectory sample, never from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedReading {
    /// Sensor (or object) that produced the reading
    pub sensor_id: String,
    /// Output channel
    pub channel: String,
    pub log_time: f64,
    pub message: Message,
}

impl ConvertedReading {
    pub fn into_record(self) -> LogRecord {
        LogRecord {
            channel: self.channel,
            log_time: self.log_time,
            message: self.message,
        }
    }
}

/// Bookkeeping for one committed replay tick
///
/// Counts are per tick, not cumulative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickMeta {
    /// Committed tick index (0-based)
    pub index: u64,
    /// Log time of the trajectory sample driving the tick
    pub log_time: f64,
    /// Readings written for this tick
    pub readings: usize,
    /// Samples suppressed as duplicates
    pub duplicates: u64,
    /// Recoverable skips (empty image, NaN pose, short payload, ...)
    pub skipped: u64,
    /// Wall time spent committing the pose and polling sensors (seconds)
    pub duration_s: f64,
}
