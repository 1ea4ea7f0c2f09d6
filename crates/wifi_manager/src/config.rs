//! Manager configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! hal_instance = "default"
//! start_retry_times = 3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ManagerResult;

/// Extra start attempts after a transient `NotAvailable`
pub const START_HAL_RETRY_TIMES: u32 = 3;

/// Default HAL service instance
pub const HAL_INSTANCE_NAME: &str = wifi_hal::DEFAULT_INSTANCE;

/// Configuration for a [`DeviceManager`](crate::DeviceManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Service interface looked up in the platform registry
    pub hal_interface: String,
    /// Service instance looked up in the platform registry
    pub hal_instance: String,
    /// Retries after the first start call; total attempts are this plus one
    pub start_retry_times: u32,
    /// Name of the thread running a [`ManagerService`](crate::ManagerService)
    pub thread_name: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            hal_interface: wifi_hal::WIFI_HAL_INTERFACE.to_string(),
            hal_instance: HAL_INSTANCE_NAME.to_string(),
            start_retry_times: START_HAL_RETRY_TIMES,
            thread_name: "wifi-manager".to_string(),
        }
    }
}

impl ManagerConfig {
    /// Parse from a TOML document
    pub fn from_toml_str(text: &str) -> ManagerResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> ManagerResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded manager config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Total hardware start calls allowed per `start()`
    pub fn max_start_attempts(&self) -> u32 {
        self.start_retry_times.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManagerError;

    #[test]
    fn test_defaults() {
        let config = ManagerConfig::default();
        assert_eq!(config.hal_instance, "default");
        assert_eq!(config.start_retry_times, START_HAL_RETRY_TIMES);
        assert_eq!(config.max_start_attempts(), 4);
    }

    #[test]
    fn test_partial_toml() {
        let config = ManagerConfig::from_toml_str(
            r#"
            start_retry_times = 1
            unrelated = "ignored"
            "#,
        )
        .unwrap();
        assert_eq!(config.start_retry_times, 1);
        assert_eq!(config.hal_interface, wifi_hal::WIFI_HAL_INTERFACE);
        assert_eq!(config.thread_name, "wifi-manager");
    }

    #[test]
    fn test_empty_toml() {
        let config = ManagerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ManagerConfig::default());
    }

    #[test]
    fn test_bad_toml() {
        let err = ManagerConfig::from_toml_str("start_retry_times = \"many\"").unwrap_err();
        assert!(matches!(err, ManagerError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ManagerConfig::load("/nonexistent/wifi-manager.toml").unwrap_err();
        assert!(matches!(err, ManagerError::Io(_)));
    }
}
