//! Simulation backend abstraction
//!
//! Defines the trait used to drive the simulated agent and pull sensor data,
//! supporting a real transport and mock testing behind one interface.

use std::future::Future;
use std::time::Duration;

use contracts::{
    BackendConfig, CameraInfoResponse, GpuRangeData, ImageRequest, ImageResponse, Pose,
    RfFamily, RfRangingData, ScanLayout, ScanRangeData,
};
use tracing::{info, instrument};

use crate::error::{Result, SimClientError};

/// Simulation backend trait
///
/// Every call is awaited to completion before the next one is issued; poses
/// and mount poses are exchanged in the backend's own axis convention.
pub trait SimClient: Send + Sync {
    /// Confirm the backend is reachable
    fn confirm_connection(&self) -> impl Future<Output = Result<()>> + Send;

    /// Set the vehicle pose and advance simulated time by `duration` seconds
    ///
    /// Returns once the backend has committed the pose and finished stepping.
    fn set_pose_and_advance(
        &self,
        pose: Pose,
        reset: bool,
        vehicle: &str,
        duration: f64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Batched image request
    ///
    /// # Returns
    /// One response per request, in request order
    fn get_images(
        &self,
        requests: &[ImageRequest],
    ) -> impl Future<Output = Result<Vec<ImageResponse>>> + Send;

    /// Camera field of view and mount pose
    fn get_camera_info(
        &self,
        camera: &str,
    ) -> impl Future<Output = Result<CameraInfoResponse>> + Send;

    /// Latest scan of an echo / lidar sensor
    fn get_scan_range_data(
        &self,
        sensor: &str,
        vehicle: &str,
        layout: ScanLayout,
    ) -> impl Future<Output = Result<ScanRangeData>> + Send;

    /// Latest scan of a GPU lidar
    fn get_gpu_range_data(
        &self,
        sensor: &str,
        vehicle: &str,
    ) -> impl Future<Output = Result<GpuRangeData>> + Send;

    /// All anchor/tag observations of one RF family
    fn get_rf_ranging_data(
        &self,
        family: RfFamily,
    ) -> impl Future<Output = Result<RfRangingData>> + Send;

    /// Object pose; an unknown object yields a NaN position
    fn get_object_pose(&self, name: &str, local: bool)
        -> impl Future<Output = Result<Pose>> + Send;
}

/// Confirm the backend connection, bounded by `config.timeout_s`
///
/// This is the only backend interaction with a timeout.
#[instrument(
    name = "sim_client_connect",
    skip(client, config),
    fields(host = %config.host, port = config.port)
)]
pub async fn connect<C: SimClient>(client: &C, config: &BackendConfig) -> Result<()> {
    let address = format!("{}:{}", config.host, config.port);
    let timeout = Duration::try_from_secs_f64(config.timeout_s).map_err(|e| {
        SimClientError::ConnectionFailed {
            address: address.clone(),
            message: format!("invalid timeout {}s: {e}", config.timeout_s),
        }
    })?;

    match tokio::time::timeout(timeout, client.confirm_connection()).await {
        Ok(Ok(())) => {
            info!(%address, "connected to simulation backend");
            Ok(())
        }
        Ok(Err(e)) => Err(SimClientError::ConnectionFailed {
            address,
            message: e.to_string(),
        }),
        Err(_) => Err(SimClientError::ConnectionTimeout {
            address,
            seconds: config.timeout_s,
        }),
    }
}
