//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration invalid after CLI overrides were applied
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Input trajectory log not found
    #[error("Input log not found: {path}")]
    InputLogNotFound { path: String },

    /// Signal handler could not be installed
    #[error("Failed to install {signal} handler: {message}")]
    Signal {
        signal: &'static str,
        message: String,
    },
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn input_log_not_found(path: &Path) -> Self {
        Self::InputLogNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn signal(signal: &'static str, err: &std::io::Error) -> Self {
        Self::Signal {
            signal,
            message: err.to_string(),
        }
    }
}
