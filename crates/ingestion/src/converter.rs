//! Frame & encoding conversion
//!
//! Backend data uses a right-handed, z-down convention; output records use
//! z-up. Everything that crosses that boundary goes through [`FrameConverter`].

use bytemuck::{Pod, Zeroable};
use bytes::Bytes;
use contracts::{
    CameraInfo, Header, ImageEncoding, ImageMessage, ImageResponse, PointCloud, PointField,
    PointFieldType, Pose, Quaternion, ScanLayout, Vector3,
};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use thiserror::Error;

/// Recoverable conversion failure; the reading is skipped
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("payload has {actual} elements, expected {expected} for {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// x, y, z, amplitude, depth
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct EchoPoint {
    x: f32,
    y: f32,
    z: f32,
    a: f32,
    d: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct XyzPoint {
    x: f32,
    y: f32,
    z: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct GpuPoint {
    x: f32,
    y: f32,
    z: f32,
    rgb: u32,
    intensity: f32,
}

/// Stateless conversion rules
pub struct FrameConverter;

impl FrameConverter {
    /// Output pose -> backend pose: `(x, -y, -z)`, orientation inverted
    pub fn to_backend_pose(pose: &Pose) -> Pose {
        Self::flip_pose(pose)
    }

    /// Backend mount pose -> output translation/rotation
    ///
    /// Same flip as [`Self::to_backend_pose`]; the mapping is an involution.
    pub fn mount_to_output(pose: &Pose) -> (Vector3, Quaternion) {
        let flipped = Self::flip_pose(pose);
        (flipped.position, flipped.orientation)
    }

    /// Backend object pose -> output pose: `(x, -y, z)`, orientation inverted
    pub fn object_to_output(pose: &Pose) -> Pose {
        let p = pose.position;
        Pose::new(Vector3::new(p.x, -p.y, p.z), pose.orientation.inverse())
    }

    fn flip_pose(pose: &Pose) -> Pose {
        let p = pose.position;
        Pose::new(Vector3::new(p.x, -p.y, -p.z), pose.orientation.inverse())
    }

    /// Negate y and z of every whole point; trailing partial points are dropped
    pub fn flip_scan(points: &[f32], layout: ScanLayout) -> Vec<f32> {
        let stride = layout.stride();
        let mut out = Vec::with_capacity(points.len() - points.len() % stride);
        for point in points.chunks_exact(stride) {
            out.push(point[0]);
            out.push(-point[1]);
            out.push(-point[2]);
            out.extend_from_slice(&point[3..]);
        }
        out
    }

    /// Echo cloud from backend floats (flipped here)
    pub fn echo_cloud(header: Header, points: &[f32]) -> PointCloud {
        let flipped = Self::flip_scan(points, ScanLayout::Echo);
        let packed: Vec<EchoPoint> = flipped
            .chunks_exact(5)
            .map(|p| EchoPoint {
                x: p[0],
                y: p[1],
                z: p[2],
                a: p[3],
                d: p[4],
            })
            .collect();

        pack_cloud(
            header,
            vec![
                PointField::new("x", 0, PointFieldType::Float32),
                PointField::new("y", 4, PointFieldType::Float32),
                PointField::new("z", 8, PointFieldType::Float32),
                PointField::new("a", 12, PointFieldType::Float32),
                PointField::new("d", 16, PointFieldType::Float32),
            ],
            &packed,
        )
    }

    /// xyz lidar cloud from backend floats (flipped here)
    pub fn lidar_cloud(header: Header, points: &[f32]) -> PointCloud {
        let flipped = Self::flip_scan(points, ScanLayout::Lidar);
        let packed: Vec<XyzPoint> = flipped
            .chunks_exact(3)
            .map(|p| XyzPoint {
                x: p[0],
                y: p[1],
                z: p[2],
            })
            .collect();

        pack_cloud(
            header,
            vec![
                PointField::new("x", 0, PointFieldType::Float32),
                PointField::new("y", 4, PointFieldType::Float32),
                PointField::new("z", 8, PointFieldType::Float32),
            ],
            &packed,
        )
    }

    /// GPU lidar cloud; already in output convention, no flip.
    ///
    /// The backend reports the packed colour as a float value.
    pub fn gpu_cloud(header: Header, points: &[f32]) -> PointCloud {
        let packed: Vec<GpuPoint> = points
            .chunks_exact(5)
            .map(|p| GpuPoint {
                x: p[0],
                y: p[1],
                z: p[2],
                rgb: p[3] as u32,
                intensity: p[4],
            })
            .collect();

        pack_cloud(
            header,
            vec![
                PointField::new("x", 0, PointFieldType::Float32),
                PointField::new("y", 4, PointFieldType::Float32),
                PointField::new("z", 8, PointFieldType::Float32),
                PointField::new("rgb", 12, PointFieldType::Uint32),
                PointField::new("intensity", 16, PointFieldType::Float32),
            ],
            &packed,
        )
    }

    /// Scene image: optional JPEG round trip (`quality` 1..=100), optional grayscale
    pub fn scene_image(
        header: Header,
        response: &ImageResponse,
        quality: u8,
        mono: bool,
    ) -> Result<ImageMessage, ConvertError> {
        let (width, height) = (response.width, response.height);
        check_len(width, height, 3, response.image_data_u8.len())?;

        let mut rgb = RgbImage::from_raw(width, height, response.image_data_u8.clone())
            .ok_or_else(|| ConvertError::SizeMismatch {
                width,
                height,
                expected: width as usize * height as usize * 3,
                actual: response.image_data_u8.len(),
            })?;

        if quality > 0 {
            let mut jpeg = Vec::new();
            JpegEncoder::new_with_quality(&mut jpeg, quality).encode_image(&rgb)?;
            rgb = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)?.to_rgb8();
        }

        if mono {
            let gray = DynamicImage::ImageRgb8(rgb).to_luma8();
            Ok(image_message(
                header,
                width,
                height,
                ImageEncoding::Mono8,
                Bytes::from(gray.into_raw()),
            ))
        } else {
            Ok(image_message(
                header,
                width,
                height,
                ImageEncoding::Rgb8,
                Bytes::from(rgb.into_raw()),
            ))
        }
    }

    /// Unconverted payload in the given encoding
    pub fn raw_image(
        header: Header,
        response: &ImageResponse,
        encoding: ImageEncoding,
    ) -> Result<ImageMessage, ConvertError> {
        match encoding {
            ImageEncoding::Rgb8 => Self::rgb_image(header, response),
            ImageEncoding::Float32 => Self::float_image(header, response),
            ImageEncoding::Mono8 => {
                let (width, height) = (response.width, response.height);
                check_len(width, height, 1, response.image_data_u8.len())?;
                Ok(image_message(
                    header,
                    width,
                    height,
                    ImageEncoding::Mono8,
                    Bytes::copy_from_slice(&response.image_data_u8),
                ))
            }
        }
    }

    /// Byte RGB image, passed through unchanged
    pub fn rgb_image(header: Header, response: &ImageResponse) -> Result<ImageMessage, ConvertError> {
        let (width, height) = (response.width, response.height);
        check_len(width, height, 3, response.image_data_u8.len())?;
        Ok(image_message(
            header,
            width,
            height,
            ImageEncoding::Rgb8,
            Bytes::copy_from_slice(&response.image_data_u8),
        ))
    }

    /// Single-channel float image
    pub fn float_image(
        header: Header,
        response: &ImageResponse,
    ) -> Result<ImageMessage, ConvertError> {
        let (width, height) = (response.width, response.height);
        check_len(width, height, 1, response.image_data_float.len())?;
        Ok(image_message(
            header,
            width,
            height,
            ImageEncoding::Float32,
            Bytes::copy_from_slice(bytemuck::cast_slice(&response.image_data_float)),
        ))
    }

    /// Pinhole focal length (pixels) from horizontal FOV (degrees)
    pub fn focal_length(width: u32, fov_deg: f64) -> f64 {
        (width as f64 / 2.0) / (fov_deg * std::f64::consts::PI / 360.0).tan()
    }

    /// Synthetic intrinsics: zero distortion, identity rectification.
    ///
    /// `baseline` is `Some` only for the second camera of a stereo pair.
    pub fn camera_info(
        header: Header,
        width: u32,
        height: u32,
        fov_deg: f64,
        baseline: Option<f64>,
    ) -> CameraInfo {
        let f = Self::focal_length(width, fov_deg);
        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;
        let tx = baseline.map_or(0.0, |b| -f * b);

        CameraInfo {
            header,
            height,
            width,
            distortion_model: "plumb_bob".to_string(),
            d: vec![0.0; 5],
            k: [f, 0.0, cx, 0.0, f, cy, 0.0, 0.0, 1.0],
            r: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            p: [f, 0.0, cx, tx, 0.0, f, cy, 0.0, 0.0, 0.0, 1.0, 0.0],
        }
    }
}

fn check_len(width: u32, height: u32, channels: usize, actual: usize) -> Result<(), ConvertError> {
    let expected = width as usize * height as usize * channels;
    if actual == expected {
        Ok(())
    } else {
        Err(ConvertError::SizeMismatch {
            width,
            height,
            expected,
            actual,
        })
    }
}

fn image_message(
    header: Header,
    width: u32,
    height: u32,
    encoding: ImageEncoding,
    data: Bytes,
) -> ImageMessage {
    ImageMessage {
        header,
        height,
        width,
        encoding,
        is_bigendian: encoding == ImageEncoding::Float32 && cfg!(target_endian = "big"),
        step: width * encoding.bytes_per_pixel(),
        data,
    }
}

fn pack_cloud<P: Pod>(header: Header, fields: Vec<PointField>, points: &[P]) -> PointCloud {
    let point_step = std::mem::size_of::<P>() as u32;
    let width = points.len() as u32;
    PointCloud {
        header,
        height: 1,
        width,
        fields,
        is_bigendian: cfg!(target_endian = "big"),
        point_step,
        row_step: point_step * width,
        data: Bytes::copy_from_slice(bytemuck::cast_slice(points)),
        is_dense: false,
    }
}
