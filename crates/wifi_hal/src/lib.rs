//! # Wi-Fi HAL facade
//!
//! The narrow, synchronous boundary between the interface manager and the
//! platform's Wi-Fi hardware service:
//!
//! - [`types`]: chips, modes, interface combinations
//! - [`status`]: HAL status codes and [`HalError`]
//! - [`event`]: asynchronous notifications as [`HalEvent`]s on a channel
//! - [`facade`]: the [`ServiceManager`], [`WifiHal`], [`WifiChip`] and
//!   [`WifiIface`] traits
//! - [`typed`]: [`ChipExt`], a single type-tagged entry point over the
//!   per-type chip calls
//!
//! The `mock` feature adds an in-memory implementation for tests.

pub mod event;
pub mod facade;
pub mod status;
pub mod typed;
pub mod types;

#[cfg(feature = "mock")]
pub mod mock;

pub use event::{event_channel, EventSink, HalEvent};
pub use facade::{ServiceManager, WifiChip, WifiHal, WifiIface};
pub use status::{HalError, HalResult, StatusCode};
pub use typed::ChipExt;
pub use types::{
    ChipId, ChipMode, IfaceCombination, IfaceCombinationLimit, IfaceType, IfaceTypeMap, ModeId,
    Transport,
};

/// Fully qualified name of the HAL service interface
pub const WIFI_HAL_INTERFACE: &str = "android.hardware.wifi@1.0::IWifi";

/// Default service instance
pub const DEFAULT_INSTANCE: &str = "default";
