//! Camera adapter
//!
//! All cameras share one batched image request per tick. The request list and
//! the `"<camera>_<stream>"` -> response index map are built once.

use std::collections::HashMap;

use contracts::{
    CameraConfig, ConvertedReading, Header, ImageKind, ImageMessage, ImageRequest, ImageResponse,
    Message, SensorKind,
};
use sim_client::SimClient;
use tracing::{instrument, warn};

use crate::adapter::{PollContext, SensorAdapter};
use crate::converter::FrameConverter;
use crate::dedup::DedupKey;
use crate::error::{IngestionError, Result};
use crate::stats::SkipReason;

/// Image stream of a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStream {
    Scene,
    Segmentation,
    Depth,
}

impl ImageStream {
    pub const fn as_str(self) -> &'static str {
        match self {
            ImageStream::Scene => "scene",
            ImageStream::Segmentation => "segmentation",
            ImageStream::Depth => "depth",
        }
    }
}

/// Per-camera setup resolved before replay
#[derive(Debug, Clone)]
pub struct CameraSetup {
    pub config: CameraConfig,
    /// Horizontal FOV (degrees), fetched once at startup
    pub fov: f64,
    /// Stereo baseline; set for the second camera of a stereo pair only
    pub baseline: Option<f64>,
}

/// Batched camera adapter
pub struct CameraAdapter {
    cameras: Vec<CameraSetup>,
    requests: Vec<ImageRequest>,
    slots: HashMap<String, usize>,
}

fn slot_key(camera: &str, stream: ImageStream) -> String {
    format!("{}_{}", camera, stream.as_str())
}

impl CameraAdapter {
    /// Build the request list; scene is always requested
    pub fn new(cameras: Vec<CameraSetup>) -> Self {
        let mut requests = Vec::new();
        let mut slots = HashMap::new();

        for setup in &cameras {
            let camera = &setup.config;

            slots.insert(slot_key(&camera.name, ImageStream::Scene), requests.len());
            requests.push(ImageRequest::new(&camera.name, ImageKind::Scene));

            if camera.segmentation.is_some() {
                slots.insert(
                    slot_key(&camera.name, ImageStream::Segmentation),
                    requests.len(),
                );
                requests.push(ImageRequest::new(&camera.name, ImageKind::Segmentation));
            }

            if let Some(depth) = &camera.depth {
                slots.insert(slot_key(&camera.name, ImageStream::Depth), requests.len());
                requests.push(ImageRequest::new(&camera.name, depth.kind));
            }
        }

        Self {
            cameras,
            requests,
            slots,
        }
    }

    /// Batched request sent every tick
    pub fn requests(&self) -> &[ImageRequest] {
        &self.requests
    }

    /// Response index of a camera stream
    pub fn slot(&self, camera: &str, stream: ImageStream) -> Option<usize> {
        self.slots.get(&slot_key(camera, stream)).copied()
    }

    /// Validate, deduplicate and convert one response
    fn convert_stream(
        &self,
        ctx: &mut PollContext<'_>,
        setup: &CameraSetup,
        stream: ImageStream,
        request: &ImageRequest,
        response: &ImageResponse,
    ) -> Option<ImageMessage> {
        let camera = &setup.config;
        let key = slot_key(&camera.name, stream);

        if response.is_empty() {
            warn!(
                camera = %camera.name,
                stream = stream.as_str(),
                "camera could not retrieve image"
            );
            ctx.stats.record_skip(&key, SkipReason::EmptyImage);
            return None;
        }

        let dedup_key = DedupKey::camera(&camera.name, stream.as_str());
        if !ctx.dedup.should_emit(dedup_key, response.timestamp) {
            ctx.stats.record_duplicate(&key);
            return None;
        }

        let header = Header::new(ctx.tick.stamp, &camera.optical_frame);
        let converted = match stream {
            ImageStream::Scene => {
                FrameConverter::scene_image(header, response, camera.scene_quality, camera.mono)
            }
            // 其余流按图像类型的编码策略原样转出
            ImageStream::Segmentation | ImageStream::Depth => {
                FrameConverter::raw_image(header, response, request.kind.policy().encoding)
            }
        };

        match converted {
            Ok(msg) => Some(msg),
            Err(e) => {
                warn!(
                    camera = %camera.name,
                    stream = stream.as_str(),
                    error = %e,
                    "camera image could not be converted"
                );
                ctx.stats.record_skip(&key, SkipReason::ImageSize);
                None
            }
        }
    }
}

impl SensorAdapter for CameraAdapter {
    fn sensor_id(&self) -> &str {
        "cameras"
    }

    fn kind(&self) -> SensorKind {
        SensorKind::Camera
    }

    #[instrument(
        name = "camera_adapter_poll",
        skip(self, client, ctx),
        fields(tick = ctx.tick.index, requests = self.requests.len())
    )]
    async fn poll<C: SimClient>(
        &self,
        client: &C,
        ctx: &mut PollContext<'_>,
    ) -> Result<Vec<ConvertedReading>> {
        if self.requests.is_empty() {
            return Ok(Vec::new());
        }

        let responses = client.get_images(&self.requests).await?;
        if responses.len() != self.requests.len() {
            return Err(IngestionError::protocol(
                self.sensor_id(),
                format!(
                    "requested {} images, received {}",
                    self.requests.len(),
                    responses.len()
                ),
            ));
        }

        let mut out = Vec::new();

        for setup in &self.cameras {
            let camera = &setup.config;
            // dims of the first emitted stream, scene preferred
            let mut info_dims: Option<(u32, u32)> = None;

            let streams = [
                (ImageStream::Scene, Some(camera.scene_topic.as_str())),
                (
                    ImageStream::Segmentation,
                    camera.segmentation.as_ref().map(|c| c.topic.as_str()),
                ),
                (
                    ImageStream::Depth,
                    camera.depth.as_ref().map(|c| c.topic.as_str()),
                ),
            ];

            for (stream, topic) in streams {
                let (Some(topic), Some(slot)) = (topic, self.slot(&camera.name, stream)) else {
                    continue;
                };
                let (request, response) = (&self.requests[slot], &responses[slot]);
                if let Some(msg) = self.convert_stream(ctx, setup, stream, request, response) {
                    info_dims.get_or_insert((msg.width, msg.height));
                    out.push(ctx.reading(&camera.name, topic, Message::Image(msg)));
                }
            }

            if let (Some(info), Some((width, height))) = (&camera.camera_info, info_dims) {
                let header = Header::new(ctx.tick.stamp, &camera.optical_frame);
                let msg =
                    FrameConverter::camera_info(header, width, height, setup.fov, setup.baseline);
                out.push(ctx.reading(&camera.name, &info.topic, Message::CameraInfo(msg)));
            }
        }

        Ok(out)
    }
}
