//! 位姿执行器
//!
//! 把轨迹样本的位姿转换到后端坐标系，并以一次阻塞调用
//! 设置位姿、推进一个回放周期。失败即致命。

use contracts::TrajectorySample;
use ingestion::FrameConverter;
use sim_client::SimClient;
use tracing::instrument;

use crate::error::{ReplayError, Result};

#[derive(Debug, Clone)]
pub struct PoseActuator {
    vehicle: String,
    period: f64,
}

impl PoseActuator {
    pub fn new(vehicle: impl Into<String>, period: f64) -> Self {
        Self {
            vehicle: vehicle.into(),
            period,
        }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// 提交位姿并推进仿真时间
    #[instrument(
        level = "debug",
        name = "pose_commit",
        skip(self, client, sample),
        fields(log_time = sample.log_time)
    )]
    pub async fn commit<C: SimClient>(
        &self,
        client: &C,
        index: u64,
        sample: &TrajectorySample,
    ) -> Result<()> {
        let pose = FrameConverter::to_backend_pose(&sample.pose);
        client
            .set_pose_and_advance(pose, true, &self.vehicle, self.period)
            .await
            .map_err(|source| ReplayError::pose_commit(index, sample.log_time, source))
    }
}
