//! Hardware facade traits
//!
//! These are the only calls the manager makes into the platform. Every call
//! is synchronous; asynchronous notifications are delivered through the
//! [`EventSink`](crate::EventSink) handed over at registration time.

use std::sync::Arc;

use crate::event::EventSink;
use crate::status::HalResult;
use crate::types::{ChipId, ChipMode, IfaceType, ModeId, Transport};

/// Platform service registry
pub trait ServiceManager: Send + Sync {
    /// Watch the registry itself; its death is reported as
    /// [`HalEvent::ServiceManagerDied`](crate::HalEvent::ServiceManagerDied)
    fn link_to_death(&self, sink: EventSink, cookie: u64) -> bool;

    /// Ask to be told whenever `interface/instance` is registered
    fn register_for_notifications(&self, interface: &str, instance: &str, sink: EventSink) -> bool;

    /// How the service is exposed, [`Transport::Empty`] if not declared
    fn transport(&self, interface: &str, instance: &str) -> Transport;

    /// Fetch a live handle to the HAL service
    fn get_service(&self, interface: &str, instance: &str) -> Option<Arc<dyn WifiHal>>;
}

/// Top-level HAL service
pub trait WifiHal: Send + Sync {
    /// Report the death of this service as
    /// [`HalEvent::ServiceDied`](crate::HalEvent::ServiceDied) carrying `cookie`
    fn link_to_death(&self, sink: EventSink, cookie: u64) -> bool;

    /// Subscribe to start, stop and failure notifications
    fn register_event_callback(&self, sink: EventSink) -> HalResult<()>;

    fn start(&self) -> HalResult<()>;

    fn stop(&self) -> HalResult<()>;

    fn chip_ids(&self) -> HalResult<Vec<ChipId>>;

    fn chip(&self, id: ChipId) -> HalResult<Arc<dyn WifiChip>>;
}

/// One radio chip
///
/// The per-type families mirror the hardware interface one to one; callers
/// inside this workspace go through [`ChipExt`](crate::ChipExt) instead.
pub trait WifiChip: Send + Sync {
    fn id(&self) -> HalResult<ChipId>;

    fn available_modes(&self) -> HalResult<Vec<ChipMode>>;

    /// Current mode; `NotAvailable` while no mode has been configured
    fn mode(&self) -> HalResult<ModeId>;

    /// Switch mode, implicitly dropping every interface on the chip
    fn configure_chip(&self, mode: ModeId) -> HalResult<()>;

    fn create_sta_iface(&self) -> HalResult<Arc<dyn WifiIface>>;
    fn remove_sta_iface(&self, name: &str) -> HalResult<()>;
    fn sta_iface_names(&self) -> HalResult<Vec<String>>;

    fn create_ap_iface(&self) -> HalResult<Arc<dyn WifiIface>>;
    fn remove_ap_iface(&self, name: &str) -> HalResult<()>;
    fn ap_iface_names(&self) -> HalResult<Vec<String>>;

    fn create_p2p_iface(&self) -> HalResult<Arc<dyn WifiIface>>;
    fn remove_p2p_iface(&self, name: &str) -> HalResult<()>;
    fn p2p_iface_names(&self) -> HalResult<Vec<String>>;

    fn create_nan_iface(&self) -> HalResult<Arc<dyn WifiIface>>;
    fn remove_nan_iface(&self, name: &str) -> HalResult<()>;
    fn nan_iface_names(&self) -> HalResult<Vec<String>>;
}

/// One live interface
pub trait WifiIface: Send + Sync {
    fn name(&self) -> HalResult<String>;

    fn iface_type(&self) -> HalResult<IfaceType>;
}
