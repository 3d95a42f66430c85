//! 启动时的传感器发现
//!
//! 向后端查询每个已配置传感器的安装位姿，生成静态变换，
//! 并记录相机视场角与双目基线。任何传感器无法解析都是致命错误。

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;

use contracts::{
    CameraInfoResponse, Pose, Quaternion, ReplayBlueprint, ScanLayout, StaticTransform, Vector3,
};
use sim_client::SimClient;
use tracing::{info, instrument};

use crate::converter::FrameConverter;
use crate::error::{IngestionError, Result};

/// 相机坐标系 -> 光学坐标系的固定旋转
pub fn optical_rotation() -> Quaternion {
    Quaternion::from_euler(-FRAC_PI_2, 0.0, -FRAC_PI_2)
}

/// 发现结果
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    /// 静态变换，按 echo / lidar / GPU lidar / 相机 顺序
    pub transforms: Vec<StaticTransform>,
    /// 相机信息 (视场角 + 安装位姿)
    pub cameras: HashMap<String, CameraInfoResponse>,
    /// 前两台相机的距离 (输出坐标系)；仅在启用双目时计算
    pub stereo_baseline: Option<f64>,
}

impl DiscoveryReport {
    pub fn fov(&self, camera: &str) -> Option<f64> {
        self.cameras.get(camera).map(|c| c.fov)
    }
}

/// 传感器发现
pub struct SensorDiscovery<'a, C: SimClient> {
    client: &'a C,
}

impl<'a, C: SimClient> SensorDiscovery<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// 解析全部传感器
    #[instrument(
        name = "sensor_discovery",
        skip(self, blueprint),
        fields(cameras = blueprint.cameras.len())
    )]
    pub async fn discover(&self, blueprint: &ReplayBlueprint) -> Result<DiscoveryReport> {
        let base = &blueprint.replay.base_frame;
        let vehicle = &blueprint.replay.vehicle_name;
        let mut report = DiscoveryReport::default();

        for sensor in &blueprint.echo_sensors {
            let data = self
                .client
                .get_scan_range_data(&sensor.name, vehicle, ScanLayout::Echo)
                .await
                .map_err(|source| unresolved(&sensor.name, source))?;
            report
                .transforms
                .push(mount_transform(base, &sensor.frame, &data.pose));
            info!(sensor_id = %sensor.name, "static transform for echo sensor");
        }

        for sensor in &blueprint.lidar_sensors {
            let data = self
                .client
                .get_scan_range_data(&sensor.name, vehicle, ScanLayout::Lidar)
                .await
                .map_err(|source| unresolved(&sensor.name, source))?;
            report
                .transforms
                .push(mount_transform(base, &sensor.frame, &data.pose));
            info!(sensor_id = %sensor.name, "static transform for lidar");
        }

        for sensor in &blueprint.gpu_lidar_sensors {
            let data = self
                .client
                .get_gpu_range_data(&sensor.name, vehicle)
                .await
                .map_err(|source| unresolved(&sensor.name, source))?;
            report
                .transforms
                .push(mount_transform(base, &sensor.frame, &data.pose));
            info!(sensor_id = %sensor.name, "static transform for gpu lidar");
        }

        let mut camera_positions: Vec<Vector3> = Vec::new();
        for camera in &blueprint.cameras {
            let camera_info = self
                .client
                .get_camera_info(&camera.name)
                .await
                .map_err(|source| unresolved(&camera.name, source))?;

            let mount = mount_transform(base, &camera.frame, &camera_info.pose);
            camera_positions.push(mount.translation);
            report.transforms.push(mount);
            report.transforms.push(StaticTransform::new(
                &camera.frame,
                &camera.optical_frame,
                Vector3::default(),
                optical_rotation(),
            ));
            report.cameras.insert(camera.name.clone(), camera_info);
            info!(camera = %camera.name, fov = camera_info.fov, "static transforms for camera");
        }

        if blueprint.stereo.enabled {
            if let [left, right, ..] = camera_positions.as_slice() {
                let baseline = left.distance_to(right);
                info!(baseline, "stereo baseline");
                report.stereo_baseline = Some(baseline);
            }
        }

        Ok(report)
    }
}

fn mount_transform(parent: &str, child: &str, mount: &Pose) -> StaticTransform {
    let (translation, rotation) = FrameConverter::mount_to_output(mount);
    StaticTransform::new(parent, child, translation, rotation)
}

fn unresolved(sensor_id: &str, source: sim_client::SimClientError) -> IngestionError {
    IngestionError::Unresolved {
        sensor_id: sensor_id.to_string(),
        source,
    }
}
