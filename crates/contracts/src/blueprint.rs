//! ReplayBlueprint - Config Loader 输出
//!
//! 描述一次回放的完整配置：回放速率、输入/输出日志、仿真后端、各类传感器与跟踪对象。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{ImageKind, RfFamily, ScanLayout};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的回放配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 回放设置
    pub replay: ReplaySettings,

    /// 仿真后端连接
    #[serde(default)]
    pub backend: BackendConfig,

    /// 相机列表
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,

    /// 双目设置
    #[serde(default)]
    pub stereo: StereoConfig,

    /// Echo 传感器 (5 floats / point)
    #[serde(default)]
    pub echo_sensors: Vec<RangeSensorConfig>,

    /// LiDAR 传感器 (3 floats / point)
    #[serde(default)]
    pub lidar_sensors: Vec<LidarConfig>,

    /// GPU LiDAR 传感器
    #[serde(default)]
    pub gpu_lidar_sensors: Vec<RangeSensorConfig>,

    /// UWB 测距
    #[serde(default)]
    pub uwb: Option<RfSensorConfig>,

    /// Wi-Fi 测距
    #[serde(default)]
    pub wifi: Option<RfSensorConfig>,

    /// 跟踪对象
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
}

/// 回放设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySettings {
    /// 回放速率 (Hz)，必须 > 0
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,

    /// 仿真中被驱动的载具名称
    #[serde(default = "default_vehicle_name")]
    pub vehicle_name: String,

    /// 载具基座坐标系
    #[serde(default = "default_base_frame")]
    pub base_frame: String,

    /// 输入日志中的轨迹通道
    #[serde(default = "default_pose_channel")]
    pub pose_channel: String,

    /// 轨迹/对象位姿所在坐标系
    #[serde(default = "default_pose_frame")]
    pub pose_frame: String,

    /// 静态变换通道
    #[serde(default = "default_static_channel")]
    pub static_channel: String,

    /// 输入轨迹日志
    pub input_log: PathBuf,

    /// 输出合并日志
    pub output_log: PathBuf,
}

impl ReplaySettings {
    /// 回放周期 (秒)
    pub fn period(&self) -> f64 {
        1.0 / self.rate_hz
    }
}

fn default_rate_hz() -> f64 {
    10.0
}

fn default_vehicle_name() -> String {
    "airsimvehicle".to_string()
}

fn default_base_frame() -> String {
    "base_link".to_string()
}

fn default_pose_channel() -> String {
    "/airsim/gtpose".to_string()
}

fn default_pose_frame() -> String {
    "world".to_string()
}

fn default_static_channel() -> String {
    "/tf_static".to_string()
}

/// 仿真后端连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// 后端地址
    #[serde(default = "default_backend_host")]
    pub host: String,

    /// 后端端口
    #[serde(default = "default_backend_port")]
    pub port: u16,

    /// 建立连接超时 (秒)
    #[serde(default = "default_backend_timeout")]
    pub timeout_s: f64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_backend_host(),
            port: default_backend_port(),
            timeout_s: default_backend_timeout(),
        }
    }
}

fn default_backend_host() -> String {
    "127.0.0.1".to_string()
}

fn default_backend_port() -> u16 {
    41451
}

fn default_backend_timeout() -> f64 {
    15.0
}

/// 相机配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// 后端相机名称
    pub name: String,

    /// 相机坐标系
    pub frame: String,

    /// 光学坐标系
    pub optical_frame: String,

    /// 场景图像输出通道
    pub scene_topic: String,

    /// JPEG 重压缩质量 (0 = 不压缩)
    #[serde(default)]
    pub scene_quality: u8,

    /// 输出灰度图
    #[serde(default)]
    pub mono: bool,

    /// 语义分割输出
    #[serde(default)]
    pub segmentation: Option<ChannelConfig>,

    /// 深度输出
    #[serde(default)]
    pub depth: Option<DepthConfig>,

    /// 相机内参输出
    #[serde(default)]
    pub camera_info: Option<ChannelConfig>,
}

/// 单通道输出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub topic: String,
}

/// 深度输出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthConfig {
    pub topic: String,

    /// 深度图类型，必须是浮点类型
    #[serde(default = "default_depth_kind")]
    pub kind: ImageKind,
}

fn default_depth_kind() -> ImageKind {
    ImageKind::DepthPlanner
}

/// 双目配置
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StereoConfig {
    /// 前两台相机构成双目对
    #[serde(default)]
    pub enabled: bool,
}

/// 扫描/GPU 测距传感器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSensorConfig {
    pub name: String,
    pub topic: String,
    pub frame: String,
}

/// LiDAR 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LidarConfig {
    pub name: String,
    pub topic: String,
    pub frame: String,

    /// Ground-truth 标签输出通道 (可选)
    #[serde(default)]
    pub segmentation_topic: Option<String>,
}

/// RF 测距配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfSensorConfig {
    /// 传感器名称，后端一次返回全部锚点/标签
    pub names: Vec<String>,

    /// 输出通道
    pub topic: String,
}

/// 跟踪对象配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectConfig {
    /// 后端对象名称
    pub name: String,

    /// 输出通道
    pub topic: String,

    /// 使用局部坐标
    #[serde(default)]
    pub local: bool,
}

/// 传感器类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Camera,
    ScanRange(ScanLayout),
    GpuRange,
    RfRanging(RfFamily),
    ObjectPose,
}

/// 统一的传感器描述 (只读)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorDescriptor {
    pub id: String,
    pub kind: SensorKind,
    pub channels: Vec<String>,
    pub frames: Vec<String>,
}

impl ReplayBlueprint {
    /// 按轮询顺序列出全部传感器描述
    pub fn descriptors(&self) -> Vec<SensorDescriptor> {
        let mut out = Vec::new();

        for camera in &self.cameras {
            let mut channels = vec![camera.scene_topic.clone()];
            channels.extend(camera.segmentation.iter().map(|c| c.topic.clone()));
            channels.extend(camera.depth.iter().map(|c| c.topic.clone()));
            channels.extend(camera.camera_info.iter().map(|c| c.topic.clone()));
            out.push(SensorDescriptor {
                id: camera.name.clone(),
                kind: SensorKind::Camera,
                channels,
                frames: vec![camera.frame.clone(), camera.optical_frame.clone()],
            });
        }

        for sensor in &self.echo_sensors {
            out.push(SensorDescriptor {
                id: sensor.name.clone(),
                kind: SensorKind::ScanRange(ScanLayout::Echo),
                channels: vec![sensor.topic.clone()],
                frames: vec![sensor.frame.clone()],
            });
        }

        for sensor in &self.lidar_sensors {
            let mut channels = vec![sensor.topic.clone()];
            channels.extend(sensor.segmentation_topic.iter().cloned());
            out.push(SensorDescriptor {
                id: sensor.name.clone(),
                kind: SensorKind::ScanRange(ScanLayout::Lidar),
                channels,
                frames: vec![sensor.frame.clone()],
            });
        }

        for sensor in &self.gpu_lidar_sensors {
            out.push(SensorDescriptor {
                id: sensor.name.clone(),
                kind: SensorKind::GpuRange,
                channels: vec![sensor.topic.clone()],
                frames: vec![sensor.frame.clone()],
            });
        }

        for (family, rf) in self.rf_sensors() {
            for name in &rf.names {
                out.push(SensorDescriptor {
                    id: name.clone(),
                    kind: SensorKind::RfRanging(family),
                    channels: vec![rf.topic.clone()],
                    frames: Vec::new(),
                });
            }
        }

        for object in &self.objects {
            out.push(SensorDescriptor {
                id: object.name.clone(),
                kind: SensorKind::ObjectPose,
                channels: vec![object.topic.clone()],
                frames: vec![self.replay.pose_frame.clone()],
            });
        }

        out
    }

    /// 已配置的 RF 测距族
    pub fn rf_sensors(&self) -> impl Iterator<Item = (RfFamily, &RfSensorConfig)> {
        [(RfFamily::Uwb, &self.uwb), (RfFamily::Wifi, &self.wifi)]
            .into_iter()
            .filter_map(|(family, cfg)| cfg.as_ref().map(|cfg| (family, cfg)))
    }
}
