//! Tracked object pose adapter

use contracts::{ConvertedReading, Header, Message, ObjectConfig, PoseStamped, SensorKind};
use sim_client::SimClient;
use tracing::{instrument, warn};

use crate::adapter::{PollContext, SensorAdapter};
use crate::converter::FrameConverter;
use crate::error::Result;
use crate::stats::SkipReason;

/// Object pose adapter
#[derive(Debug, Clone)]
pub struct ObjectPoseAdapter {
    name: String,
    topic: String,
    frame: String,
    local: bool,
}

impl ObjectPoseAdapter {
    /// `frame` is the frame the pose is expressed in
    pub fn new(config: &ObjectConfig, frame: impl Into<String>) -> Self {
        Self {
            name: config.name.clone(),
            topic: config.topic.clone(),
            frame: frame.into(),
            local: config.local,
        }
    }
}

impl SensorAdapter for ObjectPoseAdapter {
    fn sensor_id(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SensorKind {
        SensorKind::ObjectPose
    }

    #[instrument(
        name = "object_pose_adapter_poll",
        skip(self, client, ctx),
        fields(object = %self.name, tick = ctx.tick.index)
    )]
    async fn poll<C: SimClient>(
        &self,
        client: &C,
        ctx: &mut PollContext<'_>,
    ) -> Result<Vec<ConvertedReading>> {
        let pose = client.get_object_pose(&self.name, self.local).await?;

        if pose.position.has_nan() {
            if ctx.warnings.raise(&self.name) {
                warn!(object = %self.name, "object could not be found");
            }
            ctx.stats.record_skip(&self.name, SkipReason::NanPose);
            return Ok(Vec::new());
        }
        ctx.warnings.clear(&self.name);

        let msg = PoseStamped {
            header: Header::new(ctx.tick.stamp, &self.frame),
            pose: FrameConverter::object_to_output(&pose),
        };
        Ok(vec![ctx.reading(&self.name, &self.topic, Message::Pose(msg))])
    }
}
