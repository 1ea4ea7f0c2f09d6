//! Manager error types

use thiserror::Error;
use wifi_hal::{ChipId, HalError};

use crate::lifecycle::{LifecycleState, Trigger};
use crate::registry::IfaceKey;

/// Errors raised inside the manager
///
/// None of these cross the public [`DeviceManager`](crate::DeviceManager)
/// operations; they are logged and folded into `bool` / `Option` results.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("HAL call failed: {0}")]
    Hal(#[from] HalError),

    #[error("HAL service is not bound")]
    NotBound,

    #[error("HAL is not started")]
    NotStarted,

    #[error("HAL service is not declared on this platform")]
    Unsupported,

    #[error("HAL service is declared but unavailable")]
    Unavailable,

    #[error("Failed to link to HAL death")]
    LinkToDeath,

    #[error("Cache mismatch on chip {chip}: {detail}")]
    CacheMismatch { chip: ChipId, detail: String },

    #[error("Unknown interface: {0}")]
    UnknownIface(IfaceKey),

    #[error("Unknown chip: {0}")]
    UnknownChip(ChipId),

    #[error("Invalid transition: {trigger:?} in state {state:?}")]
    InvalidTransition {
        state: LifecycleState,
        trigger: Trigger,
    },

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manager service has shut down")]
    ServiceClosed,
}

impl ManagerError {
    /// Whether the error means the cache can no longer be trusted
    pub fn is_mismatch(&self) -> bool {
        matches!(self, ManagerError::CacheMismatch { .. })
    }
}

/// Result type for manager operations
pub type ManagerResult<T> = Result<T, ManagerError>;
