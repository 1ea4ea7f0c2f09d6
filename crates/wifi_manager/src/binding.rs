//! HAL binding monitor
//!
//! Owns the handle to the HAL service and the death links around it. Each
//! successful bind gets a fresh cookie; a death notification is honored only
//! if it carries the cookie of the live binding, so every death is processed
//! exactly once no matter how many stale notifications are still queued.

use std::sync::Arc;

use wifi_hal::{EventSink, ServiceManager, WifiHal};

use crate::error::{ManagerError, ManagerResult};

/// Cookie used for the service registry's own death link
pub const SERVICE_MANAGER_COOKIE: u64 = 0;

/// Live binding to the HAL service
pub struct HalBinding {
    service_manager: Arc<dyn ServiceManager>,
    interface: String,
    instance: String,
    hal: Option<Arc<dyn WifiHal>>,
    cookie: u64,
    watching: bool,
}

impl HalBinding {
    /// Create an unbound monitor for `interface`/`instance`
    pub fn new(
        service_manager: Arc<dyn ServiceManager>,
        interface: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            service_manager,
            interface: interface.into(),
            instance: instance.into(),
            hal: None,
            cookie: SERVICE_MANAGER_COOKIE,
            watching: false,
        }
    }

    /// Link to the registry's death and subscribe to service registrations
    ///
    /// Idempotent until the registry dies.
    pub fn watch_service_manager(&mut self, sink: &EventSink) -> ManagerResult<()> {
        if self.watching {
            return Ok(());
        }
        if !self
            .service_manager
            .link_to_death(sink.clone(), SERVICE_MANAGER_COOKIE)
        {
            return Err(ManagerError::LinkToDeath);
        }
        if !self
            .service_manager
            .register_for_notifications(&self.interface, &self.instance, sink.clone())
        {
            log::warn!(
                "Failed to register for {}/{} notifications",
                self.interface,
                self.instance
            );
        }
        self.watching = true;
        Ok(())
    }

    /// Whether the platform declares the HAL service at all
    pub fn is_supported(&self) -> bool {
        self.service_manager
            .transport(&self.interface, &self.instance)
            .is_declared()
    }

    /// Fetch the service, link to its death and subscribe to its events
    pub fn bind(&mut self, sink: &EventSink) -> ManagerResult<Arc<dyn WifiHal>> {
        if let Some(hal) = &self.hal {
            return Ok(hal.clone());
        }
        if !self.is_supported() {
            return Err(ManagerError::Unsupported);
        }
        let hal = self
            .service_manager
            .get_service(&self.interface, &self.instance)
            .ok_or(ManagerError::Unavailable)?;

        self.cookie += 1;
        if !hal.link_to_death(sink.clone(), self.cookie) {
            return Err(ManagerError::LinkToDeath);
        }
        hal.register_event_callback(sink.clone())?;

        log::info!("Bound HAL service (cookie {})", self.cookie);
        self.hal = Some(hal.clone());
        Ok(hal)
    }

    /// Forget the handle; pending deaths for it become stale
    pub fn release(&mut self) {
        if self.hal.take().is_some() {
            log::debug!("Released HAL binding (cookie {})", self.cookie);
        }
    }

    /// Consume a death notification; true if it matched the live binding
    pub fn on_death(&mut self, cookie: u64) -> bool {
        if self.hal.is_none() || cookie != self.cookie {
            log::debug!(
                "Ignoring stale HAL death (cookie {}, current {})",
                cookie,
                self.cookie
            );
            return false;
        }
        self.hal = None;
        true
    }

    /// The registry died; its watch has to be re-established
    pub fn on_service_manager_death(&mut self) {
        self.watching = false;
    }

    /// Bound HAL, if any
    pub fn hal(&self) -> Option<&Arc<dyn WifiHal>> {
        self.hal.as_ref()
    }

    /// Check if a live HAL handle is held
    pub fn is_bound(&self) -> bool {
        self.hal.is_some()
    }

    /// Cookie of the current death link
    pub fn cookie(&self) -> u64 {
        self.cookie
    }

    /// Check if the service manager is watched
    pub fn is_watching(&self) -> bool {
        self.watching
    }
}

impl std::fmt::Debug for HalBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HalBinding")
            .field("interface", &self.interface)
            .field("instance", &self.instance)
            .field("bound", &self.hal.is_some())
            .field("cookie", &self.cookie)
            .field("watching", &self.watching)
            .finish()
    }
}
