//! Mock 仿真后端
//!
//! 生成确定性的合成数据，用于单元测试与无仿真器的离线运行。
//! 支持注入失败场景，以及按调用顺序返回预置 (scripted) 响应。

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use contracts::{
    CameraInfoResponse, GpuRangeData, ImageRequest, ImageResponse, Pose, RfFamily, RfRangingData,
    ScanLayout, ScanRangeData, Vector3,
};
use tracing::{debug, instrument};

use crate::client::SimClient;
use crate::error::{Result, SimClientError};

/// Mock 后端配置
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// confirm_connection 失败
    pub fail_connect: bool,
    /// confirm_connection 前的人为延迟 (用于超时测试)
    pub connect_delay: Option<Duration>,
    /// 第 N 次 (从 0 开始) set_pose_and_advance 失败
    pub fail_pose_at: Option<usize>,
    /// 后端无法解析的名称 (相机 / 传感器 / 对象)
    pub missing: Vec<String>,
    /// 返回 0×0 图像的相机
    pub blank_cameras: Vec<String>,
    /// 时间戳从不前进的传感器
    pub stale_sensors: Vec<String>,
    /// 位置为 NaN 的对象
    pub nan_objects: Vec<String>,
    /// 合成图像尺寸
    pub image_width: u32,
    pub image_height: u32,
    /// 相机水平视场角 (度)
    pub fov: f64,
    /// 每次扫描的点数
    pub scan_points: usize,
    /// RF 锚点数 / 标签数
    pub rf_anchors: usize,
    pub rf_tags: usize,
    /// 安装位姿 (后端坐标系)，未配置的为原点
    pub mounts: HashMap<String, Pose>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fail_connect: false,
            connect_delay: None,
            fail_pose_at: None,
            missing: Vec::new(),
            blank_cameras: Vec::new(),
            stale_sensors: Vec::new(),
            nan_objects: Vec::new(),
            image_width: 4,
            image_height: 3,
            fov: 90.0,
            scan_points: 4,
            rf_anchors: 2,
            rf_tags: 1,
            mounts: HashMap::new(),
        }
    }
}

/// 已记录的后端调用
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Connect,
    SetPose {
        pose: Pose,
        reset: bool,
        vehicle: String,
        duration: f64,
    },
    GetImages {
        requests: usize,
    },
    GetCameraInfo(String),
    GetScanRange(String),
    GetGpuRange(String),
    GetRfRanging(RfFamily),
    GetObjectPose(String),
}

/// 预置响应队列，先于合成数据返回
#[derive(Debug, Default)]
struct Script {
    images: VecDeque<Vec<ImageResponse>>,
    scans: HashMap<String, VecDeque<ScanRangeData>>,
    gpu: HashMap<String, VecDeque<GpuRangeData>>,
    rf: HashMap<RfFamily, VecDeque<RfRangingData>>,
    objects: HashMap<String, VecDeque<Pose>>,
}

#[derive(Debug, Default)]
struct MockState {
    /// 仿真时间 (ns)，每次 advance 前进一个周期
    sim_time_ns: u64,
    pose_calls: usize,
    vehicle_pose: Pose,
    calls: Vec<MockCall>,
    script: Script,
}

/// Mock 仿真后端
pub struct MockSimClient {
    config: MockConfig,
    state: Mutex<MockState>,
}

impl MockSimClient {
    /// 创建默认 mock 后端
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// 使用配置创建 mock 后端
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            state: Mutex::new(MockState::default()),
        }
    }

    /// 当前配置
    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// 全部已记录调用
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// 全部 set_pose_and_advance 收到的位姿
    pub fn committed_poses(&self) -> Vec<Pose> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                MockCall::SetPose { pose, .. } => Some(*pose),
                _ => None,
            })
            .collect()
    }

    /// 当前仿真时间 (ns)
    pub fn sim_time_ns(&self) -> u64 {
        self.state().sim_time_ns
    }

    /// 预置下一次 get_images 的响应
    pub fn push_images(&self, responses: Vec<ImageResponse>) {
        self.state().script.images.push_back(responses);
    }

    /// 预置某个扫描传感器的下一次响应
    pub fn push_scan(&self, sensor: impl Into<String>, data: ScanRangeData) {
        self.state()
            .script
            .scans
            .entry(sensor.into())
            .or_default()
            .push_back(data);
    }

    /// 预置某个 GPU 激光雷达的下一次响应
    pub fn push_gpu(&self, sensor: impl Into<String>, data: GpuRangeData) {
        self.state()
            .script
            .gpu
            .entry(sensor.into())
            .or_default()
            .push_back(data);
    }

    /// 预置某个 RF 族的下一次响应
    pub fn push_rf(&self, family: RfFamily, data: RfRangingData) {
        self.state()
            .script
            .rf
            .entry(family)
            .or_default()
            .push_back(data);
    }

    /// 预置某个对象的下一次位姿
    pub fn push_object_pose(&self, name: impl Into<String>, pose: Pose) {
        self.state()
            .script
            .objects
            .entry(name.into())
            .or_default()
            .push_back(pose);
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_known(&self, kind: &'static str, name: &str) -> Result<()> {
        if self.config.missing.iter().any(|m| m == name) {
            Err(SimClientError::not_found(kind, name))
        } else {
            Ok(())
        }
    }

    fn timestamp_for(&self, name: &str, now: u64) -> u64 {
        if self.config.stale_sensors.iter().any(|s| s == name) {
            1
        } else {
            now
        }
    }

    fn mount(&self, name: &str) -> Pose {
        self.config.mounts.get(name).copied().unwrap_or_default()
    }

    fn synth_image(&self, request: &ImageRequest, timestamp: u64) -> ImageResponse {
        if self.config.blank_cameras.contains(&request.camera_name) {
            return ImageResponse {
                timestamp,
                ..Default::default()
            };
        }

        let width = self.config.image_width;
        let height = self.config.image_height;
        let pixels = (width * height) as usize;

        if request.pixels_as_float {
            ImageResponse {
                width,
                height,
                timestamp,
                image_data_u8: Vec::new(),
                image_data_float: (0..pixels).map(|i| 1.0 + i as f32 * 0.25).collect(),
            }
        } else {
            ImageResponse {
                width,
                height,
                timestamp,
                image_data_u8: (0..pixels * 3).map(|i| (i % 256) as u8).collect(),
                image_data_float: Vec::new(),
            }
        }
    }

    fn synth_scan(&self, sensor: &str, layout: ScanLayout, timestamp: u64) -> ScanRangeData {
        let mut point_cloud = Vec::with_capacity(self.config.scan_points * layout.stride());
        let mut groundtruth = Vec::new();

        for i in 0..self.config.scan_points {
            let f = i as f32;
            point_cloud.extend_from_slice(&[f, f + 0.5, 1.0]);
            match layout {
                ScanLayout::Echo => point_cloud.extend_from_slice(&[0.8, 2.0 + f]),
                ScanLayout::Lidar => groundtruth.push(format!("class_{}", i % 3)),
            }
        }

        ScanRangeData {
            timestamp,
            point_cloud,
            groundtruth,
            pose: self.mount(sensor),
        }
    }

    fn synth_gpu(&self, sensor: &str, timestamp: u64) -> GpuRangeData {
        let mut point_cloud = Vec::with_capacity(self.config.scan_points * 5);
        for i in 0..self.config.scan_points {
            let f = i as f32;
            // rgb packed as 0xRRGGBB
            point_cloud.extend_from_slice(&[f, -f, 0.5, 16_711_680.0, 0.25 * f]);
        }
        GpuRangeData {
            timestamp,
            point_cloud,
            pose: self.mount(sensor),
        }
    }

    /// 每个标签收到一个包，包内每个锚点出现两次 (信号强度不同)
    fn synth_rf(&self, family: RfFamily, timestamp: u64) -> RfRangingData {
        let mut data = RfRangingData::default();

        for tag in 0..self.config.rf_tags {
            let mut packet = Vec::new();
            for repeat in 0..2 {
                for anchor in 0..self.config.rf_anchors {
                    packet.push(data.anchor_id.len());
                    data.anchor_id.push(match family {
                        RfFamily::Uwb => format!("uwb:anchor_{anchor}"),
                        RfFamily::Wifi => format!("ap_{anchor}"),
                    });
                    data.anchor_pos_x.push(anchor as f64 * 2.0);
                    data.anchor_pos_y.push(1.0);
                    data.anchor_pos_z.push(0.5);
                    data.distance.push(1.0 + anchor as f64 + repeat as f64 * 0.5);
                    data.rssi.push(-60.0 - anchor as f64 + repeat as f64 * 10.0);
                    data.timestamp.push(timestamp);
                    data.valid_range.push(true);
                }
            }
            data.tag_ranges.push(packet);
            data.tag_id.push(format!("tag_{tag}"));
            data.tag_pos_x.push(tag as f64);
            data.tag_pos_y.push(0.0);
            data.tag_pos_z.push(0.0);
        }

        data
    }
}

impl Default for MockSimClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClient for MockSimClient {
    #[instrument(name = "mock_sim_confirm_connection", skip(self))]
    async fn confirm_connection(&self) -> Result<()> {
        if let Some(delay) = self.config.connect_delay {
            tokio::time::sleep(delay).await;
        }
        self.state().calls.push(MockCall::Connect);
        if self.config.fail_connect {
            return Err(SimClientError::call_failed(
                "confirm_connection",
                "mock failure",
            ));
        }
        Ok(())
    }

    #[instrument(
        name = "mock_sim_set_pose_and_advance",
        skip(self, pose),
        fields(vehicle = %vehicle, duration)
    )]
    async fn set_pose_and_advance(
        &self,
        pose: Pose,
        reset: bool,
        vehicle: &str,
        duration: f64,
    ) -> Result<()> {
        let mut state = self.state();
        let index = state.pose_calls;
        state.pose_calls += 1;

        if self.config.fail_pose_at == Some(index) {
            return Err(SimClientError::call_failed(
                "set_pose_and_advance",
                format!("mock failure at call {index}"),
            ));
        }

        state.calls.push(MockCall::SetPose {
            pose,
            reset,
            vehicle: vehicle.to_string(),
            duration,
        });
        state.vehicle_pose = pose;
        state.sim_time_ns += (duration * 1e9).round() as u64;
        debug!(sim_time_ns = state.sim_time_ns, "mock simulation advanced");
        Ok(())
    }

    #[instrument(name = "mock_sim_get_images", skip(self, requests), fields(count = requests.len()))]
    async fn get_images(&self, requests: &[ImageRequest]) -> Result<Vec<ImageResponse>> {
        for request in requests {
            self.ensure_known("camera", &request.camera_name)?;
        }

        let mut state = self.state();
        state.calls.push(MockCall::GetImages {
            requests: requests.len(),
        });
        if let Some(scripted) = state.script.images.pop_front() {
            return Ok(scripted);
        }

        let now = state.sim_time_ns;
        drop(state);
        Ok(requests
            .iter()
            .map(|r| self.synth_image(r, self.timestamp_for(&r.camera_name, now)))
            .collect())
    }

    #[instrument(name = "mock_sim_get_camera_info", skip(self), fields(camera = %camera))]
    async fn get_camera_info(&self, camera: &str) -> Result<CameraInfoResponse> {
        self.state()
            .calls
            .push(MockCall::GetCameraInfo(camera.to_string()));
        self.ensure_known("camera", camera)?;
        Ok(CameraInfoResponse {
            fov: self.config.fov,
            pose: self.mount(camera),
        })
    }

    #[instrument(name = "mock_sim_get_scan_range_data", skip(self), fields(sensor = %sensor))]
    async fn get_scan_range_data(
        &self,
        sensor: &str,
        vehicle: &str,
        layout: ScanLayout,
    ) -> Result<ScanRangeData> {
        let _ = vehicle;
        let mut state = self.state();
        state.calls.push(MockCall::GetScanRange(sensor.to_string()));
        self.ensure_known("scan sensor", sensor)?;

        if let Some(scripted) = state
            .script
            .scans
            .get_mut(sensor)
            .and_then(VecDeque::pop_front)
        {
            return Ok(scripted);
        }
        let timestamp = self.timestamp_for(sensor, state.sim_time_ns);
        Ok(self.synth_scan(sensor, layout, timestamp))
    }

    #[instrument(name = "mock_sim_get_gpu_range_data", skip(self), fields(sensor = %sensor))]
    async fn get_gpu_range_data(&self, sensor: &str, vehicle: &str) -> Result<GpuRangeData> {
        let _ = vehicle;
        let mut state = self.state();
        state.calls.push(MockCall::GetGpuRange(sensor.to_string()));
        self.ensure_known("gpu lidar", sensor)?;

        if let Some(scripted) = state
            .script
            .gpu
            .get_mut(sensor)
            .and_then(VecDeque::pop_front)
        {
            return Ok(scripted);
        }
        let timestamp = self.timestamp_for(sensor, state.sim_time_ns);
        Ok(self.synth_gpu(sensor, timestamp))
    }

    #[instrument(name = "mock_sim_get_rf_ranging_data", skip(self), fields(family = family.as_str()))]
    async fn get_rf_ranging_data(&self, family: RfFamily) -> Result<RfRangingData> {
        let mut state = self.state();
        state.calls.push(MockCall::GetRfRanging(family));

        if let Some(scripted) = state
            .script
            .rf
            .get_mut(&family)
            .and_then(VecDeque::pop_front)
        {
            return Ok(scripted);
        }
        let timestamp = state.sim_time_ns;
        Ok(self.synth_rf(family, timestamp))
    }

    #[instrument(name = "mock_sim_get_object_pose", skip(self), fields(object = %name))]
    async fn get_object_pose(&self, name: &str, local: bool) -> Result<Pose> {
        let mut state = self.state();
        state.calls.push(MockCall::GetObjectPose(name.to_string()));

        if let Some(scripted) = state
            .script
            .objects
            .get_mut(name)
            .and_then(VecDeque::pop_front)
        {
            return Ok(scripted);
        }

        if self.config.nan_objects.iter().any(|o| o == name) {
            return Ok(Pose {
                position: Vector3::new(f64::NAN, f64::NAN, f64::NAN),
                ..Default::default()
            });
        }

        if local {
            Ok(self.mount(name))
        } else {
            let mut pose = state.vehicle_pose;
            pose.position.x += 1.0;
            Ok(pose)
        }
    }
}
