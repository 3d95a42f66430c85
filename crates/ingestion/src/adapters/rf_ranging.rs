//! RF-ranging adapter (UWB / Wi-Fi)
//!
//! One backend call per family per tick; one range array per tag.

use contracts::{
    ConvertedReading, Header, Message, Range, RangeArray, RfFamily, RfSensorConfig, SensorKind,
};
use sim_client::SimClient;
use tracing::{debug, instrument};

use crate::adapter::{PollContext, SensorAdapter};
use crate::error::Result;
use crate::rf::{output_anchor_id, RfSnapshot};

/// RF-ranging adapter
#[derive(Debug, Clone)]
pub struct RfRangingAdapter {
    family: RfFamily,
    topic: String,
}

impl RfRangingAdapter {
    pub fn new(family: RfFamily, config: &RfSensorConfig) -> Self {
        Self {
            family,
            topic: config.topic.clone(),
        }
    }

    pub fn family(&self) -> RfFamily {
        self.family
    }
}

impl SensorAdapter for RfRangingAdapter {
    fn sensor_id(&self) -> &str {
        self.family.as_str()
    }

    fn kind(&self) -> SensorKind {
        SensorKind::RfRanging(self.family)
    }

    #[instrument(
        name = "rf_ranging_adapter_poll",
        skip(self, client, ctx),
        fields(family = self.family.as_str(), tick = ctx.tick.index)
    )]
    async fn poll<C: SimClient>(
        &self,
        client: &C,
        ctx: &mut PollContext<'_>,
    ) -> Result<Vec<ConvertedReading>> {
        let raw = client.get_rf_ranging_data(self.family).await?;
        let snapshot = RfSnapshot::from_raw(self.family, raw)?;

        let stamp = ctx.tick.stamp;
        let mut out = Vec::with_capacity(snapshot.tags.len());

        for tag in &snapshot.tags {
            let ranges = snapshot
                .consolidate(tag)
                .into_iter()
                .map(|r| Range {
                    stamp,
                    anchor_id: output_anchor_id(self.family, &r.anchor_id).to_string(),
                    anchor_position: r.position,
                    valid_range: r.valid_range,
                    distance: r.distance,
                    rssi: r.rssi,
                })
                .collect::<Vec<_>>();

            debug!(tag_id = %tag.tag_id, anchors = ranges.len(), "tag ranges consolidated");

            let array = RangeArray {
                header: Header::new(stamp, ""),
                tag_id: tag.tag_id.clone(),
                tag_position: tag.position,
                ranges,
            };
            out.push(ctx.reading(self.sensor_id(), &self.topic, Message::Ranges(array)));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::{DedupTracker, WarningTracker};
    use crate::error::IngestionError;
    use crate::stats::IngestionStats;
    use crate::ReplayTick;
    use contracts::RfRangingData;
    use sim_client::{MockConfig, MockSimClient};

    async fn poll(
        adapter: &RfRangingAdapter,
        client: &MockSimClient,
    ) -> Result<Vec<ConvertedReading>> {
        let mut dedup = DedupTracker::new();
        let mut warnings = WarningTracker::new();
        let mut stats = IngestionStats::new();
        let mut ctx = PollContext {
            tick: ReplayTick {
                index: 3,
                log_time: 4.0,
                stamp: 5.0,
            },
            vehicle: "car",
            dedup: &mut dedup,
            warnings: &mut warnings,
            stats: &mut stats,
        };
        adapter.poll(client, &mut ctx).await
    }

    fn config() -> RfSensorConfig {
        RfSensorConfig {
            names: vec!["rf".into()],
            topic: "/rf".into(),
        }
    }

    #[tokio::test]
    async fn test_one_array_per_tag() {
        let client = MockSimClient::with_config(MockConfig {
            rf_anchors: 3,
            rf_tags: 2,
            ..Default::default()
        });
        let adapter = RfRangingAdapter::new(RfFamily::Uwb, &config());

        let readings = poll(&adapter, &client).await.unwrap();
        assert_eq!(readings.len(), 2);

        for reading in &readings {
            assert_eq!(reading.log_time, 4.0);
            match &reading.message {
                Message::Ranges(array) => {
                    assert_eq!(array.header.stamp, 5.0);
                    assert_eq!(array.ranges.len(), 3);
                    assert_eq!(array.ranges[0].anchor_id, "anchor_0");
                    // the stronger of the two observations
                    assert_eq!(array.ranges[0].rssi, -50.0);
                    assert_eq!(array.ranges[0].distance, 1.5);
                    assert!(array.ranges.iter().all(|r| r.stamp == 5.0));
                }
                other => panic!("unexpected message {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_wifi_ids_verbatim() {
        let client = MockSimClient::new();
        client.push_rf(
            RfFamily::Wifi,
            RfRangingData {
                anchor_pos_x: vec![0.0],
                anchor_pos_y: vec![0.0],
                anchor_pos_z: vec![0.0],
                distance: vec![3.0],
                rssi: vec![-40.0],
                timestamp: vec![1],
                anchor_id: vec!["net:ap".into()],
                valid_range: vec![true],
                tag_ranges: vec![vec![0]],
                tag_id: vec!["phone".into()],
                tag_pos_x: vec![1.0],
                tag_pos_y: vec![2.0],
                tag_pos_z: vec![3.0],
            },
        );
        let adapter = RfRangingAdapter::new(RfFamily::Wifi, &config());

        let readings = poll(&adapter, &client).await.unwrap();
        match &readings[0].message {
            Message::Ranges(array) => {
                assert_eq!(array.tag_id, "phone");
                assert_eq!(array.ranges[0].anchor_id, "net:ap");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mismatch_is_fatal() {
        let client = MockSimClient::new();
        client.push_rf(
            RfFamily::Uwb,
            RfRangingData {
                anchor_id: vec!["a".into(), "b".into()],
                rssi: vec![-1.0],
                ..Default::default()
            },
        );
        let adapter = RfRangingAdapter::new(RfFamily::Uwb, &config());

        let err = poll(&adapter, &client).await.unwrap_err();
        assert!(matches!(err, IngestionError::Protocol { .. }));
    }
}
