//! HAL status codes and errors

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status code returned by every HAL call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    ChipInvalid,
    IfaceInvalid,
    NotSupported,
    /// Transient; the request may succeed if retried
    NotAvailable,
    NotStarted,
    InvalidArgs,
    Busy,
    Unknown,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusCode::ChipInvalid => "ERROR_WIFI_CHIP_INVALID",
            StatusCode::IfaceInvalid => "ERROR_WIFI_IFACE_INVALID",
            StatusCode::NotSupported => "ERROR_NOT_SUPPORTED",
            StatusCode::NotAvailable => "ERROR_NOT_AVAILABLE",
            StatusCode::NotStarted => "ERROR_NOT_STARTED",
            StatusCode::InvalidArgs => "ERROR_INVALID_ARGS",
            StatusCode::Busy => "ERROR_BUSY",
            StatusCode::Unknown => "ERROR_UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Non-success HAL status with its description
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {description}")]
pub struct HalError {
    pub code: StatusCode,
    pub description: String,
}

impl HalError {
    /// Create an error with a description
    pub fn new(code: StatusCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    /// Create an error with an empty description
    pub fn from_code(code: StatusCode) -> Self {
        Self::new(code, "")
    }

    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        self.code == StatusCode::NotAvailable
    }
}

impl From<StatusCode> for HalError {
    fn from(code: StatusCode) -> Self {
        Self::from_code(code)
    }
}

/// Result of a HAL call
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HalError::new(StatusCode::Busy, "chip locked");
        assert_eq!(err.to_string(), "ERROR_BUSY: chip locked");
    }

    #[test]
    fn test_transient() {
        assert!(HalError::from(StatusCode::NotAvailable).is_transient());
        assert!(!HalError::from(StatusCode::Unknown).is_transient());
    }
}
