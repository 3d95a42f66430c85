//! Ingestion 错误类型

use contracts::ContractError;
use sim_client::SimClientError;
use thiserror::Error;

/// Ingestion 错误
///
/// 这里只包含致命错误；可恢复的问题 (空图像、NaN 位姿、点数不足) 由适配器记录日志后跳过。
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 后端调用失败
    #[error(transparent)]
    Backend(#[from] SimClientError),

    /// 后端响应格式错误
    #[error("malformed response from '{sensor_id}': {message}")]
    Protocol {
        /// 传感器 ID
        sensor_id: String,
        /// 错误消息
        message: String,
    },

    /// 启动时无法解析已配置的传感器
    #[error("sensor '{sensor_id}' could not be resolved: {source}")]
    Unresolved {
        /// 传感器 ID
        sensor_id: String,
        #[source]
        source: SimClientError,
    },
}

impl IngestionError {
    /// 创建协议错误
    pub fn protocol(sensor_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            sensor_id: sensor_id.into(),
            message: message.into(),
        }
    }
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::Backend(e) => e.into(),
            IngestionError::Protocol { sensor_id, message } => {
                ContractError::protocol(sensor_id, message)
            }
            IngestionError::Unresolved { sensor_id, .. } => {
                ContractError::BackendNotFound { name: sensor_id }
            }
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
