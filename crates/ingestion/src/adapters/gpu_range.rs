//! GPU lidar adapter

use contracts::{ConvertedReading, Header, Message, RangeSensorConfig, SensorKind};
use sim_client::SimClient;
use tracing::{instrument, trace, warn};

use crate::adapter::{PollContext, SensorAdapter};
use crate::converter::FrameConverter;
use crate::dedup::DedupKey;
use crate::error::Result;
use crate::stats::SkipReason;

/// Floats per GPU lidar point: x, y, z, rgb, intensity
const GPU_POINT_FLOATS: usize = 5;

/// GPU lidar adapter
#[derive(Debug, Clone)]
pub struct GpuRangeAdapter {
    name: String,
    topic: String,
    frame: String,
}

impl GpuRangeAdapter {
    pub fn new(config: &RangeSensorConfig) -> Self {
        Self {
            name: config.name.clone(),
            topic: config.topic.clone(),
            frame: config.frame.clone(),
        }
    }
}

impl SensorAdapter for GpuRangeAdapter {
    fn sensor_id(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SensorKind {
        SensorKind::GpuRange
    }

    #[instrument(
        name = "gpu_range_adapter_poll",
        skip(self, client, ctx),
        fields(sensor_id = %self.name, tick = ctx.tick.index)
    )]
    async fn poll<C: SimClient>(
        &self,
        client: &C,
        ctx: &mut PollContext<'_>,
    ) -> Result<Vec<ConvertedReading>> {
        let data = client.get_gpu_range_data(&self.name, ctx.vehicle).await?;

        // dedup before the size check: an undersized scan still consumes its timestamp
        if !ctx.dedup.should_emit(DedupKey::range(&self.name), data.timestamp) {
            trace!(sensor_id = %self.name, timestamp = data.timestamp, "duplicate scan");
            ctx.stats.record_duplicate(&self.name);
            return Ok(Vec::new());
        }

        if data.point_cloud.len() < GPU_POINT_FLOATS {
            warn!(
                sensor_id = %self.name,
                floats = data.point_cloud.len(),
                "gpu scan has no complete point"
            );
            ctx.stats.record_skip(&self.name, SkipReason::ShortPayload);
            return Ok(Vec::new());
        }

        let header = Header::new(ctx.tick.stamp, &self.frame);
        let cloud = FrameConverter::gpu_cloud(header, &data.point_cloud);
        Ok(vec![ctx.reading(&self.name, &self.topic, Message::PointCloud(cloud))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::{DedupTracker, WarningTracker};
    use crate::stats::IngestionStats;
    use crate::ReplayTick;
    use contracts::{GpuRangeData, Pose};
    use sim_client::MockSimClient;

    fn gpu(timestamp: u64, floats: usize) -> GpuRangeData {
        GpuRangeData {
            timestamp,
            point_cloud: vec![1.0; floats],
            pose: Pose::default(),
        }
    }

    #[tokio::test]
    async fn test_short_scan_updates_last_seen() {
        let client = MockSimClient::new();
        client.push_gpu("gpu", gpu(100, 10));
        client.push_gpu("gpu", gpu(200, 3));
        client.push_gpu("gpu", gpu(200, 10));

        let adapter = GpuRangeAdapter::new(&RangeSensorConfig {
            name: "gpu".into(),
            topic: "/gpu".into(),
            frame: "gpu_link".into(),
        });
        let mut dedup = DedupTracker::new();
        let mut warnings = WarningTracker::new();
        let mut stats = IngestionStats::new();

        let mut counts = Vec::new();
        for index in 0..3 {
            let mut ctx = PollContext {
                tick: ReplayTick {
                    index,
                    log_time: index as f64,
                    stamp: index as f64,
                },
                vehicle: "car",
                dedup: &mut dedup,
                warnings: &mut warnings,
                stats: &mut stats,
            };
            counts.push(adapter.poll(&client, &mut ctx).await.unwrap().len());
        }

        assert_eq!(counts, vec![1, 0, 0]);
        assert_eq!(dedup.last_seen(&DedupKey::range("gpu")), Some(200));
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.duplicates, 1);
    }
}
