//! LogRecord - 记录日志的逻辑模型
//!
//! 每条记录 = 通道名 + 日志时间 + 带类型的消息。
//! 消息布局沿用机器人领域常见的 header / frame_id 约定，但不绑定任何具体文件格式。

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{Pose, Quaternion, Vector3};

/// 单条日志记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// 通道 (topic) 名称
    pub channel: String,

    /// 日志时间 (seconds, f64)，决定记录在日志中的位置
    pub log_time: f64,

    /// 消息体
    pub message: Message,
}

/// 消息类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Message {
    /// 带时间戳的位姿
    Pose(PoseStamped),

    /// 静态坐标变换集合
    StaticTransforms(TfMessage),

    /// 图像
    Image(ImageMessage),

    /// 相机内参
    CameraInfo(CameraInfo),

    /// 点云
    PointCloud(PointCloud),

    /// 字符串标签数组 (LiDAR ground truth)
    Labels(LabelArray),

    /// 测距记录 (UWB / Wi-Fi)
    Ranges(RangeArray),
}

impl Message {
    /// Short kind name, used for logging and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Pose(_) => "pose",
            Message::StaticTransforms(_) => "static_transforms",
            Message::Image(_) => "image",
            Message::CameraInfo(_) => "camera_info",
            Message::PointCloud(_) => "point_cloud",
            Message::Labels(_) => "labels",
            Message::Ranges(_) => "ranges",
        }
    }

    /// Message header; static transform sets carry one per transform instead
    pub fn header(&self) -> Option<&Header> {
        match self {
            Message::Pose(m) => Some(&m.header),
            Message::StaticTransforms(_) => None,
            Message::Image(m) => Some(&m.header),
            Message::CameraInfo(m) => Some(&m.header),
            Message::PointCloud(m) => Some(&m.header),
            Message::Labels(m) => Some(&m.header),
            Message::Ranges(m) => Some(&m.header),
        }
    }
}

/// 消息头
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// 消息时间戳 (seconds)
    pub stamp: f64,

    /// 坐标系名称
    pub frame_id: String,
}

impl Header {
    pub fn new(stamp: f64, frame_id: impl Into<String>) -> Self {
        Self {
            stamp,
            frame_id: frame_id.into(),
        }
    }
}

/// 带时间戳的位姿
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseStamped {
    pub header: Header,
    pub pose: Pose,
}

/// 坐标变换
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: Quaternion,
}

/// 带时间戳的父子坐标变换
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformStamped {
    pub header: Header,
    pub child_frame_id: String,
    pub transform: Transform,
}

/// 坐标变换集合
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfMessage {
    pub transforms: Vec<TransformStamped>,
}

/// 图像编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageEncoding {
    #[serde(rename = "rgb8")]
    Rgb8,
    #[serde(rename = "mono8")]
    Mono8,
    #[serde(rename = "32FC1")]
    Float32,
}

impl ImageEncoding {
    /// 每像素字节数
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            ImageEncoding::Rgb8 => 3,
            ImageEncoding::Mono8 => 1,
            ImageEncoding::Float32 => 4,
        }
    }
}

/// 图像消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMessage {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub encoding: ImageEncoding,
    pub is_bigendian: bool,
    /// 每行字节数
    pub step: u32,
    pub data: Bytes,
}

/// 相机内参 (针孔模型)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub distortion_model: String,
    /// 畸变参数
    pub d: Vec<f64>,
    /// 3x3 内参矩阵 (row-major)
    pub k: [f64; 9],
    /// 3x3 校正矩阵 (row-major)
    pub r: [f64; 9],
    /// 3x4 投影矩阵 (row-major)
    pub p: [f64; 12],
}

/// 点字段数据类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointFieldType {
    Float32,
    Uint32,
}

/// 点字段描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointField {
    pub name: String,
    /// 字段在点内的字节偏移
    pub offset: u32,
    pub datatype: PointFieldType,
    pub count: u32,
}

impl PointField {
    pub fn new(name: impl Into<String>, offset: u32, datatype: PointFieldType) -> Self {
        Self {
            name: name.into(),
            offset,
            datatype,
            count: 1,
        }
    }
}

/// 打包点云 (little-endian)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub fields: Vec<PointField>,
    pub is_bigendian: bool,
    /// 每点字节数
    pub point_step: u32,
    /// 每行字节数
    pub row_step: u32,
    pub data: Bytes,
    pub is_dense: bool,
}

/// 字符串标签数组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelArray {
    pub header: Header,
    pub labels: Vec<String>,
}

/// 单个锚点测距
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub stamp: f64,
    pub anchor_id: String,
    pub anchor_position: Vector3,
    pub valid_range: bool,
    pub distance: f64,
    /// 信号强度
    pub rssi: f64,
}

/// 单个标签的测距集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeArray {
    pub header: Header,
    pub tag_id: String,
    pub tag_position: Vector3,
    pub ranges: Vec<Range>,
}
