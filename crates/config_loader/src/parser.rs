//! 蓝图文本解析
//!
//! TOML 为主，JSON 用于机器生成的配置。

use std::path::Path;

use contracts::{ContractError, ReplayBlueprint};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// 扩展名 (不区分大小写) -> 格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// 由文件路径推断格式，无法识别时报 ConfigParse
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!(
                "{}: expected a .toml or .json replay config",
                path.display()
            ))
        })
    }
}

pub fn parse_toml(content: &str) -> Result<ReplayBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("invalid TOML replay config: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<ReplayBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("invalid JSON replay config: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<ReplayBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ImageKind;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[replay]
input_log = "route.jsonl"
output_log = "merged.jsonl"
"#;
        let bp = parse_toml(content).unwrap();
        assert_eq!(bp.replay.rate_hz, 10.0);
        assert_eq!(bp.replay.vehicle_name, "airsimvehicle");
        assert_eq!(bp.backend.port, 41451);
        assert!(bp.cameras.is_empty());
    }

    #[test]
    fn test_parse_toml_camera_defaults() {
        let content = r#"
[replay]
input_log = "route.jsonl"
output_log = "merged.jsonl"

[[cameras]]
name = "front"
frame = "front_link"
optical_frame = "front_optical"
scene_topic = "/front/scene"
[cameras.depth]
topic = "/front/depth"
"#;
        let bp = parse_toml(content).unwrap();
        let camera = &bp.cameras[0];
        assert_eq!(camera.scene_quality, 0);
        assert!(!camera.mono);
        assert_eq!(camera.depth.as_ref().unwrap().kind, ImageKind::DepthPlanner);
        assert!(camera.segmentation.is_none());
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "replay": { "input_log": "a.jsonl", "output_log": "b.jsonl", "rate_hz": 5.0 },
            "objects": [{ "name": "box", "topic": "/box", "local": true }],
            "uwb": { "names": ["uwb0"], "topic": "/uwb" }
        }"#;
        let bp = parse_json(content).unwrap();
        assert!(bp.objects[0].local);
        assert_eq!(bp.uwb.unwrap().names, vec!["uwb0"]);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let err = parse_toml(content).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
        assert!(err.to_string().contains("TOML"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
