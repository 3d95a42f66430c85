//! 配置校验模块
//!
//! 校验规则：
//! - rate_hz > 0
//! - 输入/输出日志不能相同
//! - 后端连接超时为有限正数
//! - 传感器 / 对象名称唯一
//! - 输出通道非空
//! - scene_quality <= 100，深度类型必须为浮点图像
//! - 启用双目时至少两台相机

use std::collections::HashSet;

use contracts::{ContractError, ReplayBlueprint};

/// 校验 ReplayBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &ReplayBlueprint) -> Result<(), ContractError> {
    validate_replay(blueprint)?;
    validate_backend(blueprint)?;
    validate_sensor_ids(blueprint)?;
    validate_channels(blueprint)?;
    validate_cameras(blueprint)?;
    validate_rf(blueprint)?;
    Ok(())
}

/// 校验回放设置
fn validate_replay(blueprint: &ReplayBlueprint) -> Result<(), ContractError> {
    let replay = &blueprint.replay;

    if !(replay.rate_hz.is_finite() && replay.rate_hz > 0.0) {
        return Err(ContractError::config_validation(
            "replay.rate_hz",
            format!("rate_hz must be > 0, got {}", replay.rate_hz),
        ));
    }

    if replay.input_log == replay.output_log {
        return Err(ContractError::config_validation(
            "replay.output_log",
            "output_log must differ from input_log",
        ));
    }

    if replay.pose_channel.is_empty() {
        return Err(ContractError::config_validation(
            "replay.pose_channel",
            "pose_channel cannot be empty",
        ));
    }

    Ok(())
}

/// 校验后端连接设置
fn validate_backend(blueprint: &ReplayBlueprint) -> Result<(), ContractError> {
    let timeout_s = blueprint.backend.timeout_s;

    // Duration 只能表示约 1.8e19 秒
    if !(timeout_s.is_finite() && timeout_s > 0.0 && timeout_s <= u32::MAX as f64) {
        return Err(ContractError::config_validation(
            "backend.timeout_s",
            format!(
                "timeout_s must be finite, > 0 and at most {}, got {timeout_s}",
                u32::MAX
            ),
        ));
    }

    Ok(())
}

/// 校验传感器名称唯一性 (全局)
fn validate_sensor_ids(blueprint: &ReplayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for descriptor in blueprint.descriptors() {
        if descriptor.id.is_empty() {
            return Err(ContractError::config_validation(
                format!("sensors[kind={:?}]", descriptor.kind),
                "sensor name cannot be empty",
            ));
        }
        if !seen.insert(descriptor.id.clone()) {
            return Err(ContractError::config_validation(
                format!("sensors[id={}]", descriptor.id),
                "duplicate sensor name",
            ));
        }
    }
    Ok(())
}

/// 校验输出通道
fn validate_channels(blueprint: &ReplayBlueprint) -> Result<(), ContractError> {
    for descriptor in blueprint.descriptors() {
        if descriptor.channels.iter().any(|c| c.is_empty()) {
            return Err(ContractError::config_validation(
                format!("sensors[id={}].topic", descriptor.id),
                "topic cannot be empty",
            ));
        }
    }
    Ok(())
}

/// 校验相机配置
fn validate_cameras(blueprint: &ReplayBlueprint) -> Result<(), ContractError> {
    for camera in &blueprint.cameras {
        if camera.scene_quality > 100 {
            return Err(ContractError::config_validation(
                format!("cameras[{}].scene_quality", camera.name),
                format!("scene_quality must be 0..=100, got {}", camera.scene_quality),
            ));
        }

        if let Some(depth) = &camera.depth {
            if !depth.kind.is_float() {
                return Err(ContractError::config_validation(
                    format!("cameras[{}].depth.kind", camera.name),
                    format!("{:?} is not a float image kind", depth.kind),
                ));
            }
        }
    }

    if blueprint.stereo.enabled && blueprint.cameras.len() < 2 {
        return Err(ContractError::config_validation(
            "stereo.enabled",
            format!(
                "stereo requires at least 2 cameras, got {}",
                blueprint.cameras.len()
            ),
        ));
    }

    Ok(())
}

/// 校验 RF 测距配置
fn validate_rf(blueprint: &ReplayBlueprint) -> Result<(), ContractError> {
    for (family, rf) in blueprint.rf_sensors() {
        if rf.names.is_empty() {
            return Err(ContractError::config_validation(
                format!("{}.names", family.as_str()),
                "at least one sensor name is required",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigFormat, ConfigLoader};
    use contracts::{
        BackendConfig, CameraConfig, ConfigVersion, DepthConfig, ImageKind, RangeSensorConfig,
        ReplaySettings, RfSensorConfig, StereoConfig,
    };

    fn camera(name: &str) -> CameraConfig {
        CameraConfig {
            name: name.into(),
            frame: format!("{name}_link"),
            optical_frame: format!("{name}_optical"),
            scene_topic: format!("/{name}/scene"),
            scene_quality: 0,
            mono: false,
            segmentation: None,
            depth: None,
            camera_info: None,
        }
    }

    fn minimal_blueprint() -> ReplayBlueprint {
        ReplayBlueprint {
            version: ConfigVersion::V1,
            replay: ReplaySettings {
                rate_hz: 10.0,
                vehicle_name: "car".into(),
                base_frame: "base_link".into(),
                pose_channel: "/pose".into(),
                pose_frame: "world".into(),
                static_channel: "/tf_static".into(),
                input_log: "route.jsonl".into(),
                output_log: "merged.jsonl".into(),
            },
            backend: BackendConfig::default(),
            cameras: vec![camera("left")],
            stereo: StereoConfig::default(),
            echo_sensors: vec![RangeSensorConfig {
                name: "echo".into(),
                topic: "/echo".into(),
                frame: "echo_link".into(),
            }],
            lidar_sensors: vec![],
            gpu_lidar_sensors: vec![],
            uwb: None,
            wifi: None,
            objects: vec![],
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_invalid_rate() {
        let mut bp = minimal_blueprint();
        bp.replay.rate_hz = 0.0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("rate_hz must be > 0"), "got: {err}");
    }

    #[test]
    fn test_backend_timeout_must_be_finite_and_positive() {
        for timeout_s in [f64::INFINITY, f64::NAN, 0.0, -2.0, 1e20] {
            let mut bp = minimal_blueprint();
            bp.backend.timeout_s = timeout_s;
            let err = validate(&bp).unwrap_err().to_string();
            assert!(err.contains("timeout_s"), "{timeout_s}: {err}");
        }
    }

    #[test]
    fn test_infinite_timeout_in_toml_is_rejected() {
        let mut bp = minimal_blueprint();
        bp.backend.timeout_s = 5.0;
        let text = ConfigLoader::to_toml(&bp)
            .unwrap()
            .replace("timeout_s = 5.0", "timeout_s = inf");
        assert!(text.contains("timeout_s = inf"));
        let err = ConfigLoader::load_from_str(&text, ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("timeout_s"), "got: {err}");
    }

    #[test]
    fn test_same_input_and_output() {
        let mut bp = minimal_blueprint();
        bp.replay.output_log = bp.replay.input_log.clone();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("must differ"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sensor_name() {
        let mut bp = minimal_blueprint();
        bp.echo_sensors[0].name = "left".into();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate sensor name"), "got: {err}");
    }

    #[test]
    fn test_empty_topic() {
        let mut bp = minimal_blueprint();
        bp.echo_sensors[0].topic = String::new();
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("topic cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_quality_out_of_range() {
        let mut bp = minimal_blueprint();
        bp.cameras[0].scene_quality = 101;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("scene_quality"), "got: {err}");
    }

    #[test]
    fn test_depth_kind_must_be_float() {
        let mut bp = minimal_blueprint();
        bp.cameras[0].depth = Some(DepthConfig {
            topic: "/left/depth".into(),
            kind: ImageKind::Segmentation,
        });
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("not a float image kind"), "got: {err}");
    }

    #[test]
    fn test_stereo_needs_two_cameras() {
        let mut bp = minimal_blueprint();
        bp.stereo.enabled = true;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("at least 2 cameras"), "got: {err}");

        bp.cameras.push(camera("right"));
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_rf_requires_names() {
        let mut bp = minimal_blueprint();
        bp.wifi = Some(RfSensorConfig {
            names: vec![],
            topic: "/wifi".into(),
        });
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("wifi.names"), "got: {err}");
    }
}
