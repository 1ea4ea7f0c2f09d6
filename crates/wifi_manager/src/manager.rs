//! Device manager
//!
//! [`DeviceManager`] is the single owner of the binding, the chip inventory,
//! the interface registry and the listener registrations. It is driven from
//! one thread: caller requests arrive as `&mut self` calls and hardware
//! callbacks arrive as [`HalEvent`]s on its own queue, drained by
//! [`DeviceManager::process_events`]. Wrap it in a
//! [`ManagerService`](crate::ManagerService) to drive it from other threads.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use wifi_hal::{
    event_channel, ChipId, EventSink, HalEvent, IfaceType, ServiceManager, WifiChip, WifiHal,
};

use crate::arbiter::{self, Plan};
use crate::binding::HalBinding;
use crate::config::ManagerConfig;
use crate::dispatch::{
    InterfaceAvailableListener, InterfaceDestroyedListener, ListenerDispatcher,
    ManagerStatusListener, SubscriptionId,
};
use crate::dump::ManagerSnapshot;
use crate::error::{ManagerError, ManagerResult};
use crate::inventory::ChipInventory;
use crate::lifecycle::{LifecycleState, Trigger};
use crate::looper::DispatchContext;
use crate::registry::{Iface, IfaceRegistry};

/// Chip and interface arbitration core
pub struct DeviceManager {
    config: ManagerConfig,
    binding: HalBinding,
    inventory: ChipInventory,
    registry: IfaceRegistry,
    dispatcher: ListenerDispatcher,
    state: LifecycleState,
    events: EventSink,
    event_rx: Option<Receiver<HalEvent>>,
}

impl DeviceManager {
    /// Manager with its own event queue, drained by [`Self::process_events`]
    pub fn new(config: ManagerConfig, service_manager: Arc<dyn ServiceManager>) -> Self {
        let (events, event_rx) = event_channel();
        Self::build(config, service_manager, events, Some(event_rx))
    }

    /// Manager whose hardware callbacks go to `events`
    ///
    /// The owner of the receiving end feeds them back through
    /// [`Self::handle_event`].
    pub fn with_event_sink(
        config: ManagerConfig,
        service_manager: Arc<dyn ServiceManager>,
        events: EventSink,
    ) -> Self {
        Self::build(config, service_manager, events, None)
    }

    fn build(
        config: ManagerConfig,
        service_manager: Arc<dyn ServiceManager>,
        events: EventSink,
        event_rx: Option<Receiver<HalEvent>>,
    ) -> Self {
        let binding = HalBinding::new(
            service_manager,
            config.hal_interface.clone(),
            config.hal_instance.clone(),
        );
        Self {
            config,
            binding,
            inventory: ChipInventory::new(),
            registry: IfaceRegistry::new(),
            dispatcher: ListenerDispatcher::new(),
            state: LifecycleState::NotStarted,
            events,
            event_rx,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Get the lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Sink every hardware callback is delivered through
    pub fn event_sink(&self) -> EventSink {
        self.events.clone()
    }

    /// Handle every queued hardware event, in arrival order
    ///
    /// Always zero for a manager built with [`Self::with_event_sink`].
    pub fn process_events(&mut self) -> usize {
        let Some(event_rx) = self.event_rx.clone() else {
            return 0;
        };
        let mut handled = 0;
        while let Ok(event) = event_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// React to one hardware callback
    pub fn handle_event(&mut self, event: HalEvent) {
        log::debug!("Handling {} event in state {}", event.name(), self.state);
        match event {
            HalEvent::Started => self.on_started(),
            HalEvent::Stopped => log::debug!("HAL reported stopped"),
            HalEvent::Failure(err) => {
                log::error!("HAL failure: {}", err);
                if self.binding.is_bound() {
                    self.teardown_logged(Trigger::HalFailure);
                }
            }
            HalEvent::ServiceDied { cookie } => {
                if self.binding.on_death(cookie) {
                    log::error!("HAL service died");
                    self.teardown_logged(Trigger::Death);
                }
            }
            HalEvent::ServiceManagerDied { .. } => {
                log::error!("Service manager died");
                self.binding.on_service_manager_death();
            }
            HalEvent::ServiceRegistered {
                interface,
                instance,
                preexisting,
            } => self.on_service_registered(&interface, &instance, preexisting),
        }
    }

    fn on_started(&mut self) {
        match self.state.on(Trigger::StartConfirmed) {
            Some(next) => {
                self.state = next;
                log::info!("HAL start confirmed");
                self.dispatcher.notify_status();
            }
            None => log::debug!("Ignoring started event in state {}", self.state),
        }
    }

    fn on_service_registered(&mut self, interface: &str, instance: &str, preexisting: bool) {
        if interface != self.config.hal_interface || instance != self.config.hal_instance {
            return;
        }
        if self.binding.is_bound() {
            log::debug!("Ignoring registration of {}/{}: already bound", interface, instance);
            return;
        }
        match self.state {
            LifecycleState::NotStarted | LifecycleState::Dead => {
                log::info!(
                    "HAL service registered (preexisting: {}), initializing",
                    preexisting
                );
                self.init_hal();
            }
            state => log::debug!("Ignoring HAL registration in state {}", state),
        }
    }

    /// Bind the HAL and bring it to a known stopped state
    pub fn initialize(&mut self) -> bool {
        if let Err(err) = self.binding.watch_service_manager(&self.events) {
            log::error!("Unable to watch the service manager: {}", err);
        }
        if self.state == LifecycleState::Diverged {
            self.binding.release();
        }
        if self.binding.is_bound() && self.state.is_ready() {
            return true;
        }
        self.init_hal()
    }

    fn init_hal(&mut self) -> bool {
        match self.bind() {
            Ok(()) => true,
            Err(err) => {
                log::error!("HAL initialization failed: {}", err);
                false
            }
        }
    }

    fn bind(&mut self) -> ManagerResult<()> {
        match self.binding.bind(&self.events) {
            Ok(_) => {}
            Err(ManagerError::Unsupported) => {
                self.transition(Trigger::BindUnsupported)?;
                return Err(ManagerError::Unsupported);
            }
            Err(err) => {
                self.binding.release();
                return Err(err);
            }
        }
        self.transition(Trigger::Bound)?;
        self.teardown(Trigger::Stop)
    }

    /// Start the HAL, retrying while it reports `NotAvailable`
    pub fn start(&mut self) -> bool {
        match self.start_hal() {
            Ok(()) => true,
            Err(err) => {
                log::error!("Failed to start HAL: {}", err);
                false
            }
        }
    }

    fn start_hal(&mut self) -> ManagerResult<()> {
        if self.state.is_started() {
            return Ok(());
        }
        let hal = self.bound_hal()?;
        let max_attempts = self.config.max_start_attempts();
        loop {
            let attempt = match self.transition(Trigger::StartAttempt)? {
                LifecycleState::Starting { attempt } => attempt,
                _ => max_attempts,
            };
            match hal.start() {
                Ok(()) => {
                    self.transition(Trigger::StartSucceeded)?;
                    log::info!("HAL started on attempt {}", attempt);
                    return Ok(());
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    log::warn!("HAL start attempt {} not available, retrying", attempt);
                }
                Err(err) => {
                    self.transition(Trigger::StartFailed)?;
                    return Err(err.into());
                }
            }
        }
    }

    /// Stop the HAL, dropping every interface
    pub fn stop(&mut self) {
        self.teardown_logged(Trigger::Stop);
    }

    /// Check if the HAL is bound and usable
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Check if the HAL is started
    pub fn is_started(&self) -> bool {
        self.state.is_started()
    }

    /// Whether the platform declares the HAL service
    pub fn is_supported(&self) -> bool {
        self.binding.is_supported()
    }

    /// Create an interface of `ty`, preempting lower-priority ones if needed
    ///
    /// `None` when the priority policy refuses the request, the hardware
    /// fails, or a cache mismatch forces recovery. `listener`, if given, is
    /// registered for the new interface.
    pub fn create_iface(
        &mut self,
        ty: IfaceType,
        listener: Option<Arc<dyn InterfaceDestroyedListener>>,
        context: &DispatchContext,
    ) -> Option<Iface> {
        let iface = match self.try_create(ty) {
            Ok(Some(iface)) => iface,
            Ok(None) => {
                log::info!("Request for {} interface refused", ty);
                return None;
            }
            Err(err) => {
                self.on_error("create", err);
                return None;
            }
        };
        if let Some(listener) = listener {
            self.dispatcher
                .register_destroyed(iface.key().clone(), listener, context.clone());
        }
        // The interface exists in hardware from here on
        match self.refresh_availability() {
            Err(err) if err.is_mismatch() => {
                self.on_error("create", err);
                None
            }
            Err(err) => {
                log::warn!("Created {} but availability check failed: {}", iface, err);
                Some(iface)
            }
            Ok(()) => Some(iface),
        }
    }

    fn try_create(&mut self, ty: IfaceType) -> ManagerResult<Option<Iface>> {
        if !self.state.is_started() {
            return Err(ManagerError::NotStarted);
        }
        let hal = self.bound_hal()?;
        self.refresh_and_validate(&hal)?;

        let Some(plan) = arbiter::plan(self.inventory.chips(), ty) else {
            return Ok(None);
        };
        log::debug!(
            "Plan for {}: chip {} mode {} (switch: {}), destroying {} interface(s)",
            ty,
            plan.chip_id,
            plan.mode_id,
            plan.mode_switch,
            plan.destroy.len()
        );

        match self.execute(&plan, ty) {
            Ok(iface) => Ok(Some(iface)),
            Err(err) => {
                // Destructions already done may have freed other types
                if !plan.destroy.is_empty() && !err.is_mismatch() {
                    if let Err(dispatch_err) = self.dispatch_available(&hal) {
                        if dispatch_err.is_mismatch() {
                            return Err(dispatch_err);
                        }
                        log::warn!("Availability check failed: {}", dispatch_err);
                    }
                }
                Err(err)
            }
        }
    }

    fn execute(&mut self, plan: &Plan, ty: IfaceType) -> ManagerResult<Iface> {
        for key in &plan.destroy {
            let removed = self.registry.remove(key)?;
            self.inventory.note_removed(key.chip_id, key.ty, &key.name);
            self.dispatcher.notify_destroyed(&removed);
        }
        if plan.mode_switch {
            self.inventory.set_mode(plan.chip_id, plan.mode_id)?;
        }
        let chip = self
            .inventory
            .chip(plan.chip_id)
            .map(|c| c.handle.clone())
            .ok_or(ManagerError::UnknownChip(plan.chip_id))?;
        let iface = self.registry.create(plan.chip_id, &chip, ty)?;
        self.inventory
            .note_created(plan.chip_id, ty, iface.name());
        log::info!("Created {}", iface);
        Ok(iface)
    }

    /// Remove an interface created by this manager
    pub fn remove_iface(&mut self, iface: &Iface) -> bool {
        match self.try_remove(iface) {
            Ok(()) => true,
            Err(err) => {
                self.on_error("remove", err);
                false
            }
        }
    }

    fn try_remove(&mut self, iface: &Iface) -> ManagerResult<()> {
        let hal = self.bound_hal()?;
        self.refresh_and_validate(&hal)?;

        let removed = self.registry.remove(iface.key())?;
        self.inventory
            .note_removed(removed.chip_id(), removed.iface_type(), removed.name());
        log::info!("Removed {}", removed);
        self.dispatcher.notify_destroyed(&removed);

        match self.dispatch_available(&hal) {
            Err(err) if !err.is_mismatch() => {
                log::warn!("Removed {} but availability check failed: {}", removed, err);
                Ok(())
            }
            result => result,
        }
    }

    fn on_error(&mut self, operation: &str, err: ManagerError) {
        if err.is_mismatch() {
            log::error!("Interface {} aborted: {}", operation, err);
            self.recover_from_mismatch();
        } else {
            log::warn!("Interface {} failed: {}", operation, err);
        }
    }

    /// Stop everything and wait for an explicit `initialize()`
    fn recover_from_mismatch(&mut self) {
        self.teardown_logged(Trigger::CacheMismatch);
        self.binding.release();
    }

    fn bound_hal(&self) -> ManagerResult<Arc<dyn WifiHal>> {
        self.binding.hal().cloned().ok_or(ManagerError::NotBound)
    }

    fn refresh_and_validate(&mut self, hal: &Arc<dyn WifiHal>) -> ManagerResult<()> {
        let chips = self.inventory.refresh(hal.as_ref())?;
        self.registry.validate(chips)
    }

    fn refresh_availability(&mut self) -> ManagerResult<()> {
        let hal = self.bound_hal()?;
        self.dispatch_available(&hal)
    }

    /// Tell every availability listener whose type can now be obtained
    fn dispatch_available(&mut self, hal: &Arc<dyn WifiHal>) -> ManagerResult<()> {
        if self.dispatcher.available_count() == 0 {
            return Ok(());
        }
        let chips = self.inventory.refresh(hal.as_ref())?;
        self.registry.validate(chips)?;
        let types = arbiter::obtainable_types(chips);
        self.dispatcher.notify_available(&types);
        Ok(())
    }

    fn transition(&mut self, trigger: Trigger) -> ManagerResult<LifecycleState> {
        let next = self
            .state
            .on(trigger)
            .ok_or(ManagerError::InvalidTransition {
                state: self.state,
                trigger,
            })?;
        log::debug!("Lifecycle {} -> {} on {:?}", self.state, next, trigger);
        self.state = next;
        Ok(next)
    }

    fn teardown(&mut self, trigger: Trigger) -> ManagerResult<()> {
        if self.state.on(trigger).is_none() {
            return Err(ManagerError::InvalidTransition {
                state: self.state,
                trigger,
            });
        }
        if trigger.issues_hal_stop() {
            if let Some(hal) = self.binding.hal() {
                if let Err(err) = hal.stop() {
                    log::warn!("HAL stop failed: {}", err);
                }
            }
        }
        self.transition(trigger)?;

        self.inventory.clear();
        let destroyed = self.registry.drain();
        self.dispatcher.notify_status();
        for iface in &destroyed {
            self.dispatcher.notify_destroyed(iface);
        }
        if !destroyed.is_empty() {
            log::info!("Dropped {} interface(s) on {:?}", destroyed.len(), trigger);
        }
        Ok(())
    }

    fn teardown_logged(&mut self, trigger: Trigger) {
        if let Err(err) = self.teardown(trigger) {
            log::warn!("Ignoring {:?}: {}", trigger, err);
        }
    }

    /// Listen for start and stop transitions
    pub fn register_status_listener(
        &mut self,
        listener: Arc<dyn ManagerStatusListener>,
        context: &DispatchContext,
    ) -> SubscriptionId {
        self.dispatcher.register_status(listener, context.clone())
    }

    /// Listen for the destruction of `iface`; `None` if it is not live
    pub fn register_destroyed_listener(
        &mut self,
        iface: &Iface,
        listener: Arc<dyn InterfaceDestroyedListener>,
        context: &DispatchContext,
    ) -> Option<SubscriptionId> {
        if !self.registry.contains(iface.key()) {
            log::warn!("Not registering destroyed listener for unknown {}", iface);
            return None;
        }
        Some(
            self.dispatcher
                .register_destroyed(iface.key().clone(), listener, context.clone()),
        )
    }

    /// Listen for `ty` becoming obtainable; told right away if it already is
    pub fn register_available_listener(
        &mut self,
        ty: IfaceType,
        listener: Arc<dyn InterfaceAvailableListener>,
        context: &DispatchContext,
    ) -> SubscriptionId {
        let (id, fresh) = self
            .dispatcher
            .register_available(ty, listener, context.clone());
        if fresh && self.state.is_started() {
            match self.obtainable_now(ty) {
                Ok(true) => {
                    self.dispatcher.notify_available_one(id);
                }
                Ok(false) => {}
                Err(err) => log::warn!("Unable to check {} availability: {}", ty, err),
            }
        }
        id
    }

    fn obtainable_now(&mut self, ty: IfaceType) -> ManagerResult<bool> {
        let hal = self.bound_hal()?;
        let chips = self.inventory.refresh(hal.as_ref())?;
        Ok(arbiter::is_obtainable(chips, ty))
    }

    /// Drop a registration of any kind
    pub fn unregister_listener(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher.unregister(id)
    }

    /// Types any mode can host, on one chip or on every chip
    ///
    /// Empty until the HAL is bound.
    pub fn supported_iface_types(&mut self, chip: Option<ChipId>) -> BTreeSet<IfaceType> {
        let Some(hal) = self.binding.hal().cloned() else {
            return BTreeSet::new();
        };
        if let Err(err) = self.inventory.refresh(hal.as_ref()) {
            log::warn!("Using cached chip modes: {}", err);
        }
        self.inventory.supported_types(chip)
    }

    /// Hardware chip hosting `iface`
    pub fn chip_for(&self, iface: &Iface) -> Option<Arc<dyn WifiChip>> {
        self.registry.chip_of(iface.key())
    }

    /// Interfaces currently cached
    pub fn ifaces(&self) -> Vec<Iface> {
        self.registry.ifaces().cloned().collect()
    }

    /// Capture the current state for diagnostics
    pub fn snapshot(&self) -> ManagerSnapshot {
        ManagerSnapshot::capture(
            self.state,
            self.binding.is_bound(),
            &self.inventory,
            &self.registry,
            &self.dispatcher,
        )
    }

    /// Operator-readable state dump
    pub fn dump(&self, out: &mut impl fmt::Write) -> fmt::Result {
        write!(out, "{}", self.snapshot())
    }
}

impl fmt::Debug for DeviceManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceManager")
            .field("state", &self.state)
            .field("binding", &self.binding)
            .field("registry", &self.registry)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::looper::Looper;
    use wifi_hal::mock::{CallLog, HalCall, MockHal, MockServiceManager};

    fn manager(log: &CallLog) -> (Arc<MockHal>, DeviceManager) {
        let hal = MockHal::baseline(log.clone());
        let sm = MockServiceManager::new(hal.clone());
        (hal, DeviceManager::new(ManagerConfig::default(), sm))
    }

    #[test]
    fn test_not_initialized() {
        let log = CallLog::new();
        let (_hal, mut dut) = manager(&log);
        let looper = Looper::new("test");

        assert!(!dut.is_ready());
        assert!(!dut.start());
        assert!(dut.create_iface(IfaceType::Sta, None, &looper.context()).is_none());
        assert!(dut.supported_iface_types(None).is_empty());
        assert!(log.mutations().is_empty());
    }

    #[test]
    fn test_initialize_issues_baseline_stop() {
        let log = CallLog::new();
        let (_hal, mut dut) = manager(&log);

        assert!(dut.initialize());
        assert_eq!(dut.state(), LifecycleState::Ready);
        assert_eq!(log.mutations(), vec![HalCall::Stop]);

        // Already bound: nothing new
        assert!(dut.initialize());
        assert_eq!(log.count(&HalCall::Stop), 1);
    }

    #[test]
    fn test_create_requires_start() {
        let log = CallLog::new();
        let (_hal, mut dut) = manager(&log);
        let looper = Looper::new("test");
        dut.initialize();

        assert!(dut.create_iface(IfaceType::Sta, None, &looper.context()).is_none());
        assert_eq!(log.count(&HalCall::ChipIds), 0);
    }

    #[test]
    fn test_start_waits_for_confirmation() {
        let log = CallLog::new();
        let (hal, mut dut) = manager(&log);
        hal.set_auto_confirm(false);
        dut.initialize();

        assert!(dut.start());
        assert_eq!(dut.state(), LifecycleState::Started { confirmed: false });
        assert!(hal.notify_started());
        assert_eq!(dut.process_events(), 1);
        assert_eq!(dut.state(), LifecycleState::Started { confirmed: true });
    }
}
