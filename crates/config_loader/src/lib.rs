//! # Config Loader
//!
//! 回放配置加载：文件 -> `ReplayBlueprint`。
//!
//! - 按扩展名选择 TOML / JSON
//! - 解析后立即校验，返回的蓝图总是合法的
//! - 支持把蓝图重新序列化 (`info --json`、测试)
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("replay.toml")).unwrap();
//! println!("replaying {} at {} Hz", blueprint.replay.input_log.display(), blueprint.replay.rate_hz);
//! ```

mod parser;
mod validator;

pub use contracts::ReplayBlueprint;
pub use parser::ConfigFormat;
pub use validator::validate;

use std::path::Path;

use contracts::ContractError;

/// Replay configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// 读取并校验配置文件，格式由扩展名决定 (.toml / .json)
    pub fn load_from_path(path: &Path) -> Result<ReplayBlueprint, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// 解析并校验配置文本
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<ReplayBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    pub fn to_toml(blueprint: &ReplayBlueprint) -> Result<String, ContractError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("cannot encode blueprint as TOML: {e}")))
    }

    pub fn to_json(blueprint: &ReplayBlueprint) -> Result<String, ContractError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| ContractError::config_parse(format!("cannot encode blueprint as JSON: {e}")))
    }
}
