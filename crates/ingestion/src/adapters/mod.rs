//! 传感器适配器模块
//!
//! 每个适配器负责把一类后端响应转换为 `ConvertedReading`。
//! `AdapterSet` 固定轮询顺序：相机、echo、lidar、GPU lidar、UWB、Wi-Fi、对象。

mod camera;
mod gpu_range;
mod object_pose;
mod rf_ranging;
mod scan_range;

pub use camera::{CameraAdapter, CameraSetup, ImageStream};
pub use gpu_range::GpuRangeAdapter;
pub use object_pose::ObjectPoseAdapter;
pub use rf_ranging::RfRangingAdapter;
pub use scan_range::ScanRangeAdapter;

use contracts::{ConvertedReading, ReplayBlueprint};
use sim_client::SimClient;
use tracing::debug;

use crate::adapter::{PollContext, SensorAdapter};
use crate::discovery::DiscoveryReport;
use crate::error::Result;

/// 全部已配置的适配器
pub struct AdapterSet {
    camera: Option<CameraAdapter>,
    scans: Vec<ScanRangeAdapter>,
    gpus: Vec<GpuRangeAdapter>,
    rf: Vec<RfRangingAdapter>,
    objects: Vec<ObjectPoseAdapter>,
}

impl AdapterSet {
    /// 根据配置与启动时发现的结果构建
    pub fn build(blueprint: &ReplayBlueprint, report: &DiscoveryReport) -> Self {
        let cameras: Vec<CameraSetup> = blueprint
            .cameras
            .iter()
            .enumerate()
            .map(|(index, config)| CameraSetup {
                config: config.clone(),
                fov: report.fov(&config.name).unwrap_or(90.0),
                baseline: if index == 1 {
                    report.stereo_baseline
                } else {
                    None
                },
            })
            .collect();

        let scans = blueprint
            .echo_sensors
            .iter()
            .map(ScanRangeAdapter::echo)
            .chain(blueprint.lidar_sensors.iter().map(ScanRangeAdapter::lidar))
            .collect();

        let gpus = blueprint
            .gpu_lidar_sensors
            .iter()
            .map(GpuRangeAdapter::new)
            .collect();

        let rf = blueprint
            .rf_sensors()
            .map(|(family, config)| RfRangingAdapter::new(family, config))
            .collect();

        let objects = blueprint
            .objects
            .iter()
            .map(|o| ObjectPoseAdapter::new(o, &blueprint.replay.pose_frame))
            .collect();

        Self {
            camera: (!cameras.is_empty()).then(|| CameraAdapter::new(cameras)),
            scans,
            gpus,
            rf,
            objects,
        }
    }

    /// 适配器数量
    pub fn len(&self) -> usize {
        usize::from(self.camera.is_some())
            + self.scans.len()
            + self.gpus.len()
            + self.rf.len()
            + self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按轮询顺序列出适配器 ID
    pub fn sensor_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.len());
        ids.extend(self.camera.iter().map(|a| a.sensor_id()));
        ids.extend(self.scans.iter().map(|a| a.sensor_id()));
        ids.extend(self.gpus.iter().map(|a| a.sensor_id()));
        ids.extend(self.rf.iter().map(|a| a.sensor_id()));
        ids.extend(self.objects.iter().map(|a| a.sensor_id()));
        ids
    }

    /// 依次轮询全部适配器，读数顺序稳定
    pub async fn poll_all<C: SimClient>(
        &self,
        client: &C,
        ctx: &mut PollContext<'_>,
    ) -> Result<Vec<ConvertedReading>> {
        let mut out = Vec::new();

        if let Some(camera) = &self.camera {
            out.extend(camera.poll(client, ctx).await?);
        }
        for adapter in &self.scans {
            out.extend(adapter.poll(client, ctx).await?);
        }
        for adapter in &self.gpus {
            out.extend(adapter.poll(client, ctx).await?);
        }
        for adapter in &self.rf {
            out.extend(adapter.poll(client, ctx).await?);
        }
        for adapter in &self.objects {
            out.extend(adapter.poll(client, ctx).await?);
        }

        debug!(tick = ctx.tick.index, readings = out.len(), "tick polled");
        Ok(out)
    }
}
