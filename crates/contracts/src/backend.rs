//! Backend DTOs
//!
//! Request/response shapes exchanged with the simulation backend. These mirror
//! the backend's native layout (flat buffers, parallel arrays, its own
//! handedness); conversion into the output convention happens in `ingestion`.

use serde::{Deserialize, Serialize};

use crate::{ImageEncoding, Pose};

/// Image modality served by a backend camera.
///
/// Each kind carries its encoding policy as data so nothing branches on
/// camera type names during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    Scene,
    Segmentation,
    DepthPerspective,
    DepthPlanner,
    DepthVis,
    Infrared,
    SurfaceNormals,
    DisparityNormalized,
}

/// Encoding policy attached to an [`ImageKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePolicy {
    /// Backend must return `image_data_float` instead of bytes
    pub pixels_as_float: bool,
    /// Output encoding of the raw payload
    pub encoding: ImageEncoding,
}

impl ImageKind {
    pub const fn policy(self) -> ImagePolicy {
        match self {
            ImageKind::Scene
            | ImageKind::Segmentation
            | ImageKind::Infrared
            | ImageKind::SurfaceNormals => ImagePolicy {
                pixels_as_float: false,
                encoding: ImageEncoding::Rgb8,
            },
            ImageKind::DepthPerspective
            | ImageKind::DepthPlanner
            | ImageKind::DepthVis
            | ImageKind::DisparityNormalized => ImagePolicy {
                pixels_as_float: true,
                encoding: ImageEncoding::Float32,
            },
        }
    }

    pub const fn is_float(self) -> bool {
        self.policy().pixels_as_float
    }
}

/// One entry of a batched image request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub camera_name: String,
    pub kind: ImageKind,
    pub pixels_as_float: bool,
    pub compress: bool,
}

impl ImageRequest {
    pub fn new(camera_name: impl Into<String>, kind: ImageKind) -> Self {
        Self {
            camera_name: camera_name.into(),
            kind,
            pixels_as_float: kind.is_float(),
            compress: false,
        }
    }
}

/// Backend image response; `0×0` means the image could not be rendered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageResponse {
    pub width: u32,
    pub height: u32,
    /// Backend-native timestamp
    pub timestamp: u64,
    #[serde(with = "serde_bytes")]
    pub image_data_u8: Vec<u8>,
    pub image_data_float: Vec<f32>,
}

impl ImageResponse {
    pub fn is_empty(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

/// Camera metadata
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraInfoResponse {
    /// Horizontal field of view (degrees)
    pub fov: f64,
    /// Mount pose relative to the vehicle, backend convention
    pub pose: Pose,
}

/// Point layout of a scanning range sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanLayout {
    /// x, y, z, amplitude, depth
    Echo,
    /// x, y, z
    Lidar,
}

impl ScanLayout {
    /// Floats per point
    pub const fn stride(self) -> usize {
        match self {
            ScanLayout::Echo => 5,
            ScanLayout::Lidar => 3,
        }
    }
}

/// Scanning range sensor response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanRangeData {
    /// Backend-native timestamp
    pub timestamp: u64,
    pub point_cloud: Vec<f32>,
    /// Per-point class labels (lidar only, may be empty)
    #[serde(default)]
    pub groundtruth: Vec<String>,
    /// Mount pose relative to the vehicle, backend convention
    pub pose: Pose,
}

/// GPU range sensor response; fixed 5 floats per point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuRangeData {
    /// Backend-native timestamp
    pub timestamp: u64,
    pub point_cloud: Vec<f32>,
    pub pose: Pose,
}

/// RF-ranging family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfFamily {
    Uwb,
    Wifi,
}

impl RfFamily {
    pub const fn as_str(self) -> &'static str {
        match self {
            RfFamily::Uwb => "uwb",
            RfFamily::Wifi => "wifi",
        }
    }
}

/// Raw RF-ranging response as parallel arrays.
///
/// Anchor-side arrays are indexed by observation; `tag_ranges[i]` lists the
/// observation indices of the packet received by tag `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RfRangingData {
    pub anchor_pos_x: Vec<f64>,
    pub anchor_pos_y: Vec<f64>,
    pub anchor_pos_z: Vec<f64>,
    pub distance: Vec<f64>,
    pub rssi: Vec<f64>,
    pub timestamp: Vec<u64>,
    pub anchor_id: Vec<String>,
    pub valid_range: Vec<bool>,

    pub tag_ranges: Vec<Vec<usize>>,
    pub tag_id: Vec<String>,
    pub tag_pos_x: Vec<f64>,
    pub tag_pos_y: Vec<f64>,
    pub tag_pos_z: Vec<f64>,
}
