//! # Wi-Fi device manager
//!
//! Owns the radio chips exposed by the Wi-Fi HAL and arbitrates which
//! interfaces exist on them:
//!
//! - [`binding`]: HAL service handle and death tracking
//! - [`inventory`]: chips, their modes and what the hardware reports
//! - [`registry`]: the cache of interfaces this manager created
//! - [`arbiter`]: pure planning under the static priority policy
//! - [`lifecycle`]: explicit state machine for start, stop, failure and death
//! - [`dispatch`]: de-duplicated, deferred listener notifications
//! - [`manager`]: [`DeviceManager`], tying the above together
//! - [`service`]: [`ManagerService`], running the manager on its own thread
//!
//! ## Example
//!
//! ```ignore
//! let mut manager = DeviceManager::new(ManagerConfig::default(), service_manager);
//! let looper = Looper::new("callbacks");
//!
//! manager.initialize();
//! manager.start();
//! manager.process_events();
//!
//! let sta = manager.create_iface(IfaceType::Sta, None, &looper.context());
//! looper.dispatch_all();
//! ```

pub mod arbiter;
pub mod binding;
pub mod config;
pub mod dispatch;
pub mod dump;
pub mod error;
pub mod inventory;
pub mod lifecycle;
pub mod looper;
pub mod manager;
pub mod priority;
pub mod registry;
pub mod service;

pub use arbiter::Plan;
pub use config::{ManagerConfig, HAL_INSTANCE_NAME, START_HAL_RETRY_TIMES};
pub use dispatch::{
    InterfaceAvailableListener, InterfaceDestroyedListener, ManagerStatusListener, SubscriptionId,
};
pub use dump::ManagerSnapshot;
pub use error::{ManagerError, ManagerResult};
pub use lifecycle::{LifecycleState, Trigger};
pub use looper::{DispatchContext, Looper};
pub use manager::DeviceManager;
pub use registry::{Iface, IfaceKey};
pub use service::{ManagerHandle, ManagerService};

pub use wifi_hal::{ChipId, IfaceType};
