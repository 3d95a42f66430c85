//! Scanning range sensor adapter (echo / lidar)

use contracts::{
    ConvertedReading, Header, LabelArray, LidarConfig, Message, RangeSensorConfig, ScanLayout,
    SensorKind,
};
use sim_client::SimClient;
use tracing::{instrument, trace, warn};

use crate::adapter::{PollContext, SensorAdapter};
use crate::converter::FrameConverter;
use crate::dedup::DedupKey;
use crate::error::Result;
use crate::stats::SkipReason;

/// Echo / lidar adapter
#[derive(Debug, Clone)]
pub struct ScanRangeAdapter {
    name: String,
    topic: String,
    frame: String,
    layout: ScanLayout,
    /// Ground-truth label output (lidar only)
    label_topic: Option<String>,
}

impl ScanRangeAdapter {
    /// Echo sensor: 5 floats per point
    pub fn echo(config: &RangeSensorConfig) -> Self {
        Self {
            name: config.name.clone(),
            topic: config.topic.clone(),
            frame: config.frame.clone(),
            layout: ScanLayout::Echo,
            label_topic: None,
        }
    }

    /// Lidar: 3 floats per point, optional labels
    pub fn lidar(config: &LidarConfig) -> Self {
        Self {
            name: config.name.clone(),
            topic: config.topic.clone(),
            frame: config.frame.clone(),
            layout: ScanLayout::Lidar,
            label_topic: config.segmentation_topic.clone(),
        }
    }

    pub fn layout(&self) -> ScanLayout {
        self.layout
    }
}

impl SensorAdapter for ScanRangeAdapter {
    fn sensor_id(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SensorKind {
        SensorKind::ScanRange(self.layout)
    }

    #[instrument(
        name = "scan_range_adapter_poll",
        skip(self, client, ctx),
        fields(sensor_id = %self.name, tick = ctx.tick.index)
    )]
    async fn poll<C: SimClient>(
        &self,
        client: &C,
        ctx: &mut PollContext<'_>,
    ) -> Result<Vec<ConvertedReading>> {
        let data = client
            .get_scan_range_data(&self.name, ctx.vehicle, self.layout)
            .await?;

        // size is checked before dedup: an undersized scan leaves last-seen untouched
        if data.point_cloud.len() < self.layout.stride() {
            warn!(
                sensor_id = %self.name,
                floats = data.point_cloud.len(),
                "scan has no complete point"
            );
            ctx.stats.record_skip(&self.name, SkipReason::ShortPayload);
            return Ok(Vec::new());
        }

        if !ctx.dedup.should_emit(DedupKey::range(&self.name), data.timestamp) {
            trace!(sensor_id = %self.name, timestamp = data.timestamp, "duplicate scan");
            ctx.stats.record_duplicate(&self.name);
            return Ok(Vec::new());
        }

        let header = Header::new(ctx.tick.stamp, &self.frame);
        let cloud = match self.layout {
            ScanLayout::Echo => FrameConverter::echo_cloud(header.clone(), &data.point_cloud),
            ScanLayout::Lidar => FrameConverter::lidar_cloud(header.clone(), &data.point_cloud),
        };

        let mut out = vec![ctx.reading(&self.name, &self.topic, Message::PointCloud(cloud))];

        if let Some(topic) = &self.label_topic {
            let labels = LabelArray {
                header,
                labels: data.groundtruth,
            };
            out.push(ctx.reading(&self.name, topic, Message::Labels(labels)));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::{DedupTracker, WarningTracker};
    use crate::stats::IngestionStats;
    use crate::ReplayTick;
    use contracts::{Pose, ScanRangeData};
    use sim_client::MockSimClient;

    fn echo() -> ScanRangeAdapter {
        ScanRangeAdapter::echo(&RangeSensorConfig {
            name: "echo".into(),
            topic: "/echo".into(),
            frame: "echo_link".into(),
        })
    }

    fn scan(timestamp: u64, floats: usize) -> ScanRangeData {
        ScanRangeData {
            timestamp,
            point_cloud: (0..floats).map(|i| i as f32).collect(),
            groundtruth: Vec::new(),
            pose: Pose::default(),
        }
    }

    async fn poll(
        adapter: &ScanRangeAdapter,
        client: &MockSimClient,
        dedup: &mut DedupTracker,
        stats: &mut IngestionStats,
    ) -> Vec<ConvertedReading> {
        let mut warnings = WarningTracker::new();
        let mut ctx = PollContext {
            tick: ReplayTick {
                index: 0,
                log_time: 1.0,
                stamp: 2.0,
            },
            vehicle: "car",
            dedup,
            warnings: &mut warnings,
            stats,
        };
        adapter.poll(client, &mut ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_dedup_sequence() {
        let client = MockSimClient::new();
        client.push_scan("echo", scan(100, 10));
        client.push_scan("echo", scan(100, 10));
        client.push_scan("echo", scan(101, 10));

        let adapter = echo();
        let mut dedup = DedupTracker::new();
        let mut stats = IngestionStats::new();

        assert_eq!(poll(&adapter, &client, &mut dedup, &mut stats).await.len(), 1);
        assert!(poll(&adapter, &client, &mut dedup, &mut stats).await.is_empty());
        assert_eq!(poll(&adapter, &client, &mut dedup, &mut stats).await.len(), 1);
        assert_eq!(dedup.last_seen(&DedupKey::range("echo")), Some(101));
        assert_eq!(stats.duplicates, 1);
    }

    #[tokio::test]
    async fn test_short_scan_does_not_update_last_seen() {
        let client = MockSimClient::new();
        client.push_scan("echo", scan(100, 10));
        client.push_scan("echo", scan(200, 4));

        let adapter = echo();
        let mut dedup = DedupTracker::new();
        let mut stats = IngestionStats::new();

        poll(&adapter, &client, &mut dedup, &mut stats).await;
        assert!(poll(&adapter, &client, &mut dedup, &mut stats).await.is_empty());
        assert_eq!(dedup.last_seen(&DedupKey::range("echo")), Some(100));
        assert_eq!(stats.skipped, 1);
    }

    #[tokio::test]
    async fn test_echo_flip_and_stamp() {
        let client = MockSimClient::new();
        client.push_scan(
            "echo",
            ScanRangeData {
                timestamp: 5,
                point_cloud: vec![1.0, 2.0, 3.0, 0.5, 9.0],
                groundtruth: Vec::new(),
                pose: Pose::default(),
            },
        );

        let readings = poll(&echo(), &client, &mut DedupTracker::new(), &mut IngestionStats::new()).await;
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].log_time, 1.0);
        match &readings[0].message {
            Message::PointCloud(cloud) => {
                assert_eq!(cloud.header.stamp, 2.0);
                assert_eq!(cloud.header.frame_id, "echo_link");
                assert_eq!(cloud.width, 1);
                let y = f32::from_ne_bytes(cloud.data[4..8].try_into().unwrap());
                let d = f32::from_ne_bytes(cloud.data[16..20].try_into().unwrap());
                assert_eq!(y, -2.0);
                assert_eq!(d, 9.0);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lidar_labels() {
        let client = MockSimClient::new();
        let adapter = ScanRangeAdapter::lidar(&LidarConfig {
            name: "lidar".into(),
            topic: "/lidar".into(),
            frame: "lidar_link".into(),
            segmentation_topic: Some("/lidar/labels".into()),
        });

        let readings = poll(&adapter, &client, &mut DedupTracker::new(), &mut IngestionStats::new()).await;
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].channel, "/lidar/labels");
        match &readings[1].message {
            Message::Labels(labels) => assert_eq!(labels.labels.len(), 4),
            other => panic!("unexpected message {other:?}"),
        }
    }
}
