//! Sim Client error types

use contracts::ContractError;
use thiserror::Error;

/// Backend access error
#[derive(Debug, Error)]
pub enum SimClientError {
    /// Backend unreachable
    #[error("failed to connect to simulation backend at {address}: {message}")]
    ConnectionFailed { address: String, message: String },

    /// Connection was not confirmed in time
    #[error("simulation backend at {address} did not answer within {seconds}s")]
    ConnectionTimeout { address: String, seconds: f64 },

    /// Named camera / sensor / object is unknown to the backend
    #[error("backend has no {kind} named '{name}'")]
    NotFound { kind: &'static str, name: String },

    /// Backend call returned an error
    #[error("backend call '{call}' failed: {message}")]
    CallFailed { call: &'static str, message: String },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl SimClientError {
    /// Create not-found error
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create call error
    pub fn call_failed(call: &'static str, message: impl Into<String>) -> Self {
        Self::CallFailed {
            call,
            message: message.into(),
        }
    }

    /// Whether the error means the named entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<SimClientError> for ContractError {
    fn from(err: SimClientError) -> Self {
        match err {
            SimClientError::ConnectionFailed { .. } | SimClientError::ConnectionTimeout { .. } => {
                ContractError::BackendConnection {
                    message: err.to_string(),
                }
            }
            SimClientError::NotFound { name, .. } => ContractError::BackendNotFound { name },
            SimClientError::CallFailed { call, message } => ContractError::backend_call(call, message),
            SimClientError::Contract(inner) => inner,
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, SimClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_contract() {
        let err: ContractError = SimClientError::not_found("camera", "front").into();
        assert!(matches!(err, ContractError::BackendNotFound { ref name } if name == "front"));
    }

    #[test]
    fn test_timeout_maps_to_connection() {
        let err: ContractError = SimClientError::ConnectionTimeout {
            address: "127.0.0.1:41451".into(),
            seconds: 15.0,
        }
        .into();
        assert!(matches!(err, ContractError::BackendConnection { .. }));
        assert!(err.to_string().contains("15"));
    }
}
