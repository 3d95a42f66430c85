//! Layered error definitions
//!
//! Categorized by source: config / backend / protocol / log

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Backend Errors =====
    /// Backend connection error
    #[error("backend connection error: {message}")]
    BackendConnection { message: String },

    /// Named entity unknown to the backend
    #[error("backend could not resolve '{name}'")]
    BackendNotFound { name: String },

    /// Backend call did not complete
    #[error("backend call '{call}' failed: {message}")]
    BackendCall { call: String, message: String },

    // ===== Protocol Errors =====
    /// Malformed backend response
    #[error("protocol error for '{sensor_id}': {message}")]
    Protocol { sensor_id: String, message: String },

    // ===== Log Errors =====
    /// Record log write error
    #[error("log '{log_name}' write error: {message}")]
    LogWrite { log_name: String, message: String },

    /// Record log read error
    #[error("log read error at line {line}: {message}")]
    LogRead { line: usize, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create backend call error
    pub fn backend_call(call: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendCall {
            call: call.into(),
            message: message.into(),
        }
    }

    /// Create protocol error
    pub fn protocol(sensor_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            sensor_id: sensor_id.into(),
            message: message.into(),
        }
    }

    /// Create log write error
    pub fn log_write(log_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LogWrite {
            log_name: log_name.into(),
            message: message.into(),
        }
    }
}
