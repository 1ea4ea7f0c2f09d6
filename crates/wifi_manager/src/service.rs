//! Threaded manager service
//!
//! Moves a [`DeviceManager`] onto its own thread. Callers talk to it through
//! a cloneable [`ManagerHandle`]; each call is a closure sent over the
//! command queue and answered on a one-shot reply channel. Hardware events
//! share that queue, so commands and events run strictly in arrival order.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use wifi_hal::{ChipId, EventSink, HalEvent, IfaceType, ServiceManager, WifiChip};

use crate::config::ManagerConfig;
use crate::dispatch::{
    InterfaceAvailableListener, InterfaceDestroyedListener, ManagerStatusListener, SubscriptionId,
};
use crate::dump::ManagerSnapshot;
use crate::error::{ManagerError, ManagerResult};
use crate::lifecycle::LifecycleState;
use crate::looper::DispatchContext;
use crate::manager::DeviceManager;
use crate::registry::Iface;

type Job = Box<dyn FnOnce(&mut DeviceManager) + Send + 'static>;

enum Command {
    Run(Job),
    Event(HalEvent),
    Shutdown,
}

/// Owner of the manager thread
pub struct ManagerService {
    commands: Sender<Command>,
    thread: Option<JoinHandle<DeviceManager>>,
}

impl ManagerService {
    /// Build a manager and start its thread
    ///
    /// Hardware callbacks are queued behind whatever commands were sent
    /// before them.
    pub fn spawn(
        config: ManagerConfig,
        service_manager: Arc<dyn ServiceManager>,
    ) -> ManagerResult<Self> {
        let (commands, rx) = unbounded();
        let events = EventSink::forward(commands.clone(), Command::Event);
        let manager = DeviceManager::with_event_sink(config, service_manager, events);
        let name = manager.config().thread_name.clone();
        let thread = std::thread::Builder::new()
            .name(name)
            .spawn(move || run(manager, rx))?;
        log::info!("Manager service started");
        Ok(Self {
            commands,
            thread: Some(thread),
        })
    }

    /// New handle onto the running manager
    pub fn handle(&self) -> ManagerHandle {
        ManagerHandle {
            commands: self.commands.clone(),
        }
    }

    /// Stop the thread and take the manager back
    pub fn shutdown(mut self) -> ManagerResult<DeviceManager> {
        let _ = self.commands.send(Command::Shutdown);
        let thread = self.thread.take().ok_or(ManagerError::ServiceClosed)?;
        thread.join().map_err(|_| ManagerError::ServiceClosed)
    }
}

impl Drop for ManagerService {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.commands.send(Command::Shutdown);
            if thread.join().is_err() {
                log::error!("Manager thread panicked");
            }
        }
    }
}

fn run(mut manager: DeviceManager, commands: Receiver<Command>) -> DeviceManager {
    while let Ok(command) = commands.recv() {
        match command {
            Command::Run(job) => job(&mut manager),
            Command::Event(event) => manager.handle_event(event),
            Command::Shutdown => break,
        }
    }
    log::info!("Manager service stopped");
    manager
}

/// Cloneable request/response access to a running [`ManagerService`]
///
/// Once the service is gone every call yields its negative result.
#[derive(Clone)]
pub struct ManagerHandle {
    commands: Sender<Command>,
}

impl ManagerHandle {
    /// Run `f` on the manager thread and wait for its result
    pub fn call<R, F>(&self, f: F) -> ManagerResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut DeviceManager) -> R + Send + 'static,
    {
        let (reply, response) = bounded(1);
        let job: Job = Box::new(move |manager: &mut DeviceManager| {
            let _ = reply.send(f(manager));
        });
        self.commands
            .send(Command::Run(job))
            .map_err(|_| ManagerError::ServiceClosed)?;
        response.recv().map_err(|_| ManagerError::ServiceClosed)
    }

    /// Commands and events waiting for the manager thread
    pub fn pending(&self) -> usize {
        self.commands.len()
    }

    /// See [`DeviceManager::initialize`]
    pub fn initialize(&self) -> bool {
        self.call(|m| m.initialize()).unwrap_or(false)
    }

    /// See [`DeviceManager::start`]
    pub fn start(&self) -> bool {
        self.call(|m| m.start()).unwrap_or(false)
    }

    /// See [`DeviceManager::stop`]
    pub fn stop(&self) {
        if self.call(|m| m.stop()).is_err() {
            log::warn!("Stop dropped: manager service closed");
        }
    }

    /// False once the service is gone
    pub fn is_ready(&self) -> bool {
        self.call(|m| m.is_ready()).unwrap_or(false)
    }

    /// See [`DeviceManager::is_supported`]
    pub fn is_supported(&self) -> bool {
        self.call(|m| m.is_supported()).unwrap_or(false)
    }

    /// See [`DeviceManager::is_started`]
    pub fn is_started(&self) -> bool {
        self.call(|m| m.is_started()).unwrap_or(false)
    }

    /// Lifecycle state; `None` once the service is gone
    pub fn state(&self) -> Option<LifecycleState> {
        self.call(|m| m.state()).ok()
    }

    /// See [`DeviceManager::create_iface`]
    pub fn create_iface(
        &self,
        ty: IfaceType,
        listener: Option<Arc<dyn InterfaceDestroyedListener>>,
        context: &DispatchContext,
    ) -> Option<Iface> {
        let context = context.clone();
        self.call(move |m| m.create_iface(ty, listener, &context))
            .ok()
            .flatten()
    }

    /// See [`DeviceManager::remove_iface`]
    pub fn remove_iface(&self, iface: &Iface) -> bool {
        let iface = iface.clone();
        self.call(move |m| m.remove_iface(&iface)).unwrap_or(false)
    }

    /// Register a status listener; `None` once the service is gone
    pub fn register_status_listener(
        &self,
        listener: Arc<dyn ManagerStatusListener>,
        context: &DispatchContext,
    ) -> Option<SubscriptionId> {
        let context = context.clone();
        self.call(move |m| m.register_status_listener(listener, &context))
            .ok()
    }

    /// See [`DeviceManager::register_destroyed_listener`]
    pub fn register_destroyed_listener(
        &self,
        iface: &Iface,
        listener: Arc<dyn InterfaceDestroyedListener>,
        context: &DispatchContext,
    ) -> Option<SubscriptionId> {
        let iface = iface.clone();
        let context = context.clone();
        self.call(move |m| m.register_destroyed_listener(&iface, listener, &context))
            .ok()
            .flatten()
    }

    /// Register an availability listener; `None` once the service is gone
    pub fn register_available_listener(
        &self,
        ty: IfaceType,
        listener: Arc<dyn InterfaceAvailableListener>,
        context: &DispatchContext,
    ) -> Option<SubscriptionId> {
        let context = context.clone();
        self.call(move |m| m.register_available_listener(ty, listener, &context))
            .ok()
    }

    /// See [`DeviceManager::unregister_listener`]
    pub fn unregister_listener(&self, id: SubscriptionId) -> bool {
        self.call(move |m| m.unregister_listener(id))
            .unwrap_or(false)
    }

    /// See [`DeviceManager::supported_iface_types`]
    pub fn supported_iface_types(&self, chip: Option<ChipId>) -> BTreeSet<IfaceType> {
        self.call(move |m| m.supported_iface_types(chip))
            .unwrap_or_default()
    }

    /// See [`DeviceManager::chip_for`]
    pub fn chip_for(&self, iface: &Iface) -> Option<Arc<dyn WifiChip>> {
        let iface = iface.clone();
        self.call(move |m| m.chip_for(&iface)).ok().flatten()
    }

    /// Diagnostic snapshot; `None` once the service is gone
    pub fn snapshot(&self) -> Option<ManagerSnapshot> {
        self.call(|m| m.snapshot()).ok()
    }

    /// Text dump; empty once the service is gone
    pub fn dump(&self) -> String {
        self.call(|m| {
            let mut out = String::new();
            if m.dump(&mut out).is_err() {
                log::warn!("Dump truncated");
            }
            out
        })
        .unwrap_or_default()
    }
}

impl std::fmt::Debug for ManagerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerHandle").finish_non_exhaustive()
    }
}
