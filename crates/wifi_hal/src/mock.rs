//! In-memory HAL for tests
//!
//! [`MockServiceManager`], [`MockHal`] and [`MockChip`] behave like a small
//! but honest piece of hardware: chips keep a current mode and per-type
//! interface names, configuring a mode drops every interface, and stopping or
//! killing the HAL resets every chip. Every facade call is appended to a
//! shared [`CallLog`] so tests can assert on exact hardware traffic.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{EventSink, HalEvent};
use crate::facade::{ServiceManager, WifiChip, WifiHal, WifiIface};
use crate::status::{HalError, HalResult, StatusCode};
use crate::types::{
    ChipId, ChipMode, IfaceCombination, IfaceCombinationLimit, IfaceType, IfaceTypeMap, ModeId,
    Transport,
};

/// One recorded facade call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HalCall {
    GetTransport,
    GetService,
    RegisterForNotifications,
    WatchServiceManager,
    LinkToDeath,
    RegisterEventCallback,
    Start,
    Stop,
    ChipIds,
    GetChip(ChipId),
    AvailableModes(ChipId),
    GetMode(ChipId),
    ConfigureChip(ChipId, ModeId),
    CreateIface(ChipId, IfaceType),
    RemoveIface(ChipId, IfaceType, String),
    IfaceNames(ChipId, IfaceType),
}

impl HalCall {
    /// Whether the call changes hardware state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            HalCall::Start
                | HalCall::Stop
                | HalCall::ConfigureChip(..)
                | HalCall::CreateIface(..)
                | HalCall::RemoveIface(..)
        )
    }
}

/// Ordered, shared record of facade calls
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<HalCall>>>,
}

impl CallLog {
    /// Create an empty call log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call
    pub fn record(&self, call: HalCall) {
        self.calls.lock().push(call);
    }

    /// Copy of every call so far
    pub fn snapshot(&self) -> Vec<HalCall> {
        self.calls.lock().clone()
    }

    /// Number of calls equal to `call`
    pub fn count(&self, call: &HalCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    /// Only the state-changing calls, in order
    pub fn mutations(&self) -> Vec<HalCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    /// Number of recorded calls
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Forget every recorded call
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Live interface handed out by [`MockChip`]
#[derive(Debug, Clone)]
pub struct MockIface {
    name: String,
    ty: IfaceType,
}

impl MockIface {
    /// Create a mock interface
    pub fn new(name: impl Into<String>, ty: IfaceType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl WifiIface for MockIface {
    fn name(&self) -> HalResult<String> {
        Ok(self.name.clone())
    }

    fn iface_type(&self) -> HalResult<IfaceType> {
        Ok(self.ty)
    }
}

#[derive(Debug, Default)]
struct ChipState {
    modes: Vec<ChipMode>,
    mode: Option<ModeId>,
    ifaces: IfaceTypeMap<Vec<String>>,
    fail_configure: Option<StatusCode>,
    fail_create: IfaceTypeMap<Option<StatusCode>>,
    fail_remove: Option<StatusCode>,
    fail_modes: Option<StatusCode>,
}

/// Mock radio chip
#[derive(Debug)]
pub struct MockChip {
    id: ChipId,
    log: CallLog,
    state: Mutex<ChipState>,
}

impl MockChip {
    /// Create a chip with `modes`, unconfigured and empty
    pub fn new(id: ChipId, modes: Vec<ChipMode>, log: CallLog) -> Arc<Self> {
        Arc::new(Self {
            id,
            log,
            state: Mutex::new(ChipState {
                modes,
                ..ChipState::default()
            }),
        })
    }

    /// Get the chip ID
    pub fn chip_id(&self) -> ChipId {
        self.id
    }

    /// Configured mode, if any
    pub fn current_mode(&self) -> Option<ModeId> {
        self.state.lock().mode
    }

    /// Force the current mode without logging a call
    pub fn set_mode(&self, mode: Option<ModeId>) {
        self.state.lock().mode = mode;
    }

    /// Names of live interfaces of `ty`
    pub fn iface_names_of(&self, ty: IfaceType) -> Vec<String> {
        self.state.lock().ifaces[ty].clone()
    }

    /// Total live interfaces on this chip
    pub fn iface_count(&self) -> usize {
        self.state.lock().ifaces.iter().map(|(_, names)| names.len()).sum()
    }

    /// Drop an interface behind the manager's back
    pub fn forget_iface(&self, ty: IfaceType, name: &str) -> bool {
        let mut state = self.state.lock();
        let names = &mut state.ifaces[ty];
        match names.iter().position(|n| n == name) {
            Some(pos) => {
                names.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Add an interface behind the manager's back
    pub fn inject_iface(&self, ty: IfaceType, name: impl Into<String>) {
        self.state.lock().ifaces[ty].push(name.into());
    }

    /// Fail every configure call with `code`
    pub fn fail_configure(&self, code: Option<StatusCode>) {
        self.state.lock().fail_configure = code;
    }

    /// Fail creation of `ty` interfaces with `code`
    pub fn fail_create(&self, ty: IfaceType, code: Option<StatusCode>) {
        self.state.lock().fail_create[ty] = code;
    }

    /// Fail every remove call with `code`
    pub fn fail_remove(&self, code: Option<StatusCode>) {
        self.state.lock().fail_remove = code;
    }

    /// Fail the available-modes query with `code`
    pub fn fail_modes(&self, code: Option<StatusCode>) {
        self.state.lock().fail_modes = code;
    }

    /// Back to power-on state: no mode, no interfaces
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.mode = None;
        state.ifaces = IfaceTypeMap::default();
    }

    fn create(&self, ty: IfaceType) -> HalResult<Arc<dyn WifiIface>> {
        self.log.record(HalCall::CreateIface(self.id, ty));
        let mut state = self.state.lock();
        if let Some(code) = state.fail_create[ty] {
            return Err(HalError::new(code, format!("create {} injected failure", ty)));
        }
        if state.mode.is_none() {
            return Err(HalError::new(StatusCode::NotAvailable, "chip mode not configured"));
        }

        let names = &mut state.ifaces[ty];
        let mut index = 0;
        let name = loop {
            let candidate = format!("{}{}", ty.name_prefix(), index);
            if !names.contains(&candidate) {
                break candidate;
            }
            index += 1;
        };
        names.push(name.clone());
        Ok(Arc::new(MockIface::new(name, ty)))
    }

    fn remove(&self, ty: IfaceType, name: &str) -> HalResult<()> {
        self.log
            .record(HalCall::RemoveIface(self.id, ty, name.to_string()));
        let mut state = self.state.lock();
        if let Some(code) = state.fail_remove {
            return Err(HalError::new(code, format!("remove {} injected failure", name)));
        }
        let names = &mut state.ifaces[ty];
        match names.iter().position(|n| n == name) {
            Some(pos) => {
                names.remove(pos);
                Ok(())
            }
            None => Err(HalError::new(
                StatusCode::InvalidArgs,
                format!("no {} iface named {}", ty, name),
            )),
        }
    }

    fn names(&self, ty: IfaceType) -> HalResult<Vec<String>> {
        self.log.record(HalCall::IfaceNames(self.id, ty));
        Ok(self.state.lock().ifaces[ty].clone())
    }
}

impl WifiChip for MockChip {
    fn id(&self) -> HalResult<ChipId> {
        Ok(self.id)
    }

    fn available_modes(&self) -> HalResult<Vec<ChipMode>> {
        self.log.record(HalCall::AvailableModes(self.id));
        let state = self.state.lock();
        match state.fail_modes {
            Some(code) => Err(HalError::from_code(code)),
            None => Ok(state.modes.clone()),
        }
    }

    fn mode(&self) -> HalResult<ModeId> {
        self.log.record(HalCall::GetMode(self.id));
        self.state
            .lock()
            .mode
            .ok_or_else(|| HalError::new(StatusCode::NotAvailable, "mode not configured"))
    }

    fn configure_chip(&self, mode: ModeId) -> HalResult<()> {
        self.log.record(HalCall::ConfigureChip(self.id, mode));
        let mut state = self.state.lock();
        if let Some(code) = state.fail_configure {
            return Err(HalError::new(code, "configure injected failure"));
        }
        if !state.modes.iter().any(|m| m.id == mode) {
            return Err(HalError::new(
                StatusCode::InvalidArgs,
                format!("unknown mode {}", mode),
            ));
        }
        state.mode = Some(mode);
        state.ifaces = IfaceTypeMap::default();
        Ok(())
    }

    fn create_sta_iface(&self) -> HalResult<Arc<dyn WifiIface>> {
        self.create(IfaceType::Sta)
    }

    fn remove_sta_iface(&self, name: &str) -> HalResult<()> {
        self.remove(IfaceType::Sta, name)
    }

    fn sta_iface_names(&self) -> HalResult<Vec<String>> {
        self.names(IfaceType::Sta)
    }

    fn create_ap_iface(&self) -> HalResult<Arc<dyn WifiIface>> {
        self.create(IfaceType::Ap)
    }

    fn remove_ap_iface(&self, name: &str) -> HalResult<()> {
        self.remove(IfaceType::Ap, name)
    }

    fn ap_iface_names(&self) -> HalResult<Vec<String>> {
        self.names(IfaceType::Ap)
    }

    fn create_p2p_iface(&self) -> HalResult<Arc<dyn WifiIface>> {
        self.create(IfaceType::P2p)
    }

    fn remove_p2p_iface(&self, name: &str) -> HalResult<()> {
        self.remove(IfaceType::P2p, name)
    }

    fn p2p_iface_names(&self) -> HalResult<Vec<String>> {
        self.names(IfaceType::P2p)
    }

    fn create_nan_iface(&self) -> HalResult<Arc<dyn WifiIface>> {
        self.create(IfaceType::Nan)
    }

    fn remove_nan_iface(&self, name: &str) -> HalResult<()> {
        self.remove(IfaceType::Nan, name)
    }

    fn nan_iface_names(&self) -> HalResult<Vec<String>> {
        self.names(IfaceType::Nan)
    }
}

#[derive(Debug)]
struct HalState {
    start_script: VecDeque<StatusCode>,
    start_failure: Option<StatusCode>,
    auto_confirm: bool,
    link_ok: bool,
    callback_result: Option<StatusCode>,
    chip_ids_budget: Option<usize>,
    events: Option<EventSink>,
    death: Option<(EventSink, u64)>,
    started: bool,
}

impl Default for HalState {
    fn default() -> Self {
        Self {
            start_script: VecDeque::new(),
            start_failure: None,
            auto_confirm: true,
            link_ok: true,
            callback_result: None,
            chip_ids_budget: None,
            events: None,
            death: None,
            started: false,
        }
    }
}

/// Mock HAL service
#[derive(Debug)]
pub struct MockHal {
    log: CallLog,
    chips: Vec<Arc<MockChip>>,
    state: Mutex<HalState>,
}

impl MockHal {
    /// Chip ID of the baseline chip
    pub const BASELINE_CHIP_ID: ChipId = ChipId(10);
    /// Baseline mode hosting STA and the shared P2P/NAN slot
    pub const STA_CHIP_MODE_ID: ModeId = ModeId(0);
    /// Baseline mode hosting a single AP
    pub const AP_CHIP_MODE_ID: ModeId = ModeId(1);

    /// Create a HAL exposing `chips`
    pub fn new(log: CallLog, chips: Vec<Arc<MockChip>>) -> Arc<Self> {
        Arc::new(Self {
            log,
            chips,
            state: Mutex::new(HalState::default()),
        })
    }

    /// Modes of the baseline chip: `{1 x STA, 1 x {P2P, NAN}}` and `{1 x AP}`
    pub fn baseline_modes() -> Vec<ChipMode> {
        vec![
            ChipMode::new(
                Self::STA_CHIP_MODE_ID,
                vec![IfaceCombination::new(vec![
                    IfaceCombinationLimit::new(vec![IfaceType::Sta], 1),
                    IfaceCombinationLimit::new(vec![IfaceType::P2p, IfaceType::Nan], 1),
                ])],
            ),
            ChipMode::new(
                Self::AP_CHIP_MODE_ID,
                vec![IfaceCombination::new(vec![IfaceCombinationLimit::new(
                    vec![IfaceType::Ap],
                    1,
                )])],
            ),
        ]
    }

    /// Single-chip HAL carrying the baseline modes
    pub fn baseline(log: CallLog) -> Arc<Self> {
        let chip = MockChip::new(Self::BASELINE_CHIP_ID, Self::baseline_modes(), log.clone());
        Self::new(log, vec![chip])
    }

    /// Get the shared call log
    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// Look up a chip by ID
    pub fn mock_chip(&self, id: ChipId) -> Option<Arc<MockChip>> {
        self.chips.iter().find(|c| c.id == id).cloned()
    }

    /// All chips, in enumeration order
    pub fn mock_chips(&self) -> &[Arc<MockChip>] {
        &self.chips
    }

    /// Check if the HAL is started
    pub fn is_started(&self) -> bool {
        self.state.lock().started
    }

    /// Results for the next start calls; once drained, starts succeed
    pub fn script_start(&self, codes: impl IntoIterator<Item = StatusCode>) {
        self.state.lock().start_script.extend(codes);
    }

    /// Fail every start call past the script with `code`
    pub fn fail_all_starts(&self, code: Option<StatusCode>) {
        self.state.lock().start_failure = code;
    }

    /// Emit [`HalEvent::Started`] from inside a successful start
    pub fn set_auto_confirm(&self, enabled: bool) {
        self.state.lock().auto_confirm = enabled;
    }

    /// Result of the next death links
    pub fn set_link_to_death_result(&self, ok: bool) {
        self.state.lock().link_ok = ok;
    }

    /// Reject event callback registration with `code`
    pub fn fail_event_callback(&self, code: Option<StatusCode>) {
        self.state.lock().callback_result = code;
    }

    /// Let `successes` more chip enumerations through, then fail the rest
    ///
    /// `None` lifts the limit.
    pub fn fail_chip_ids_after(&self, successes: Option<usize>) {
        self.state.lock().chip_ids_budget = successes;
    }

    /// Push an event through the registered callback sink
    pub fn emit(&self, event: HalEvent) -> bool {
        let sink = self.state.lock().events.clone();
        match sink {
            Some(sink) => sink.emit(event),
            None => false,
        }
    }

    /// Report a finished start
    pub fn notify_started(&self) -> bool {
        self.emit(HalEvent::Started)
    }

    /// HAL-initiated failure: chips reset, then the failure is reported
    pub fn notify_failure(&self, error: HalError) -> bool {
        self.reset_chips();
        self.state.lock().started = false;
        self.emit(HalEvent::Failure(error))
    }

    /// Kill the service: chips reset and the death recipient fires
    pub fn die(&self) -> bool {
        self.reset_chips();
        let death = {
            let mut state = self.state.lock();
            state.started = false;
            state.events = None;
            state.death.take()
        };
        match death {
            Some((sink, cookie)) => sink.emit(HalEvent::ServiceDied { cookie }),
            None => false,
        }
    }

    fn reset_chips(&self) {
        for chip in &self.chips {
            chip.reset();
        }
    }
}

impl WifiHal for MockHal {
    fn link_to_death(&self, sink: EventSink, cookie: u64) -> bool {
        self.log.record(HalCall::LinkToDeath);
        let mut state = self.state.lock();
        if state.link_ok {
            state.death = Some((sink, cookie));
        }
        state.link_ok
    }

    fn register_event_callback(&self, sink: EventSink) -> HalResult<()> {
        self.log.record(HalCall::RegisterEventCallback);
        let mut state = self.state.lock();
        if let Some(code) = state.callback_result {
            return Err(HalError::new(code, "event callback rejected"));
        }
        state.events = Some(sink);
        Ok(())
    }

    fn start(&self) -> HalResult<()> {
        self.log.record(HalCall::Start);
        let sink = {
            let mut state = self.state.lock();
            if let Some(code) = state.start_script.pop_front() {
                return Err(HalError::new(code, "scripted start failure"));
            }
            if let Some(code) = state.start_failure {
                return Err(HalError::new(code, "start failure"));
            }
            state.started = true;
            if state.auto_confirm {
                state.events.clone()
            } else {
                None
            }
        };
        if let Some(sink) = sink {
            sink.emit(HalEvent::Started);
        }
        Ok(())
    }

    fn stop(&self) -> HalResult<()> {
        self.log.record(HalCall::Stop);
        self.reset_chips();
        self.state.lock().started = false;
        Ok(())
    }

    fn chip_ids(&self) -> HalResult<Vec<ChipId>> {
        self.log.record(HalCall::ChipIds);
        if let Some(budget) = self.state.lock().chip_ids_budget.as_mut() {
            if *budget == 0 {
                return Err(HalError::new(StatusCode::Unknown, "chip enumeration failed"));
            }
            *budget -= 1;
        }
        Ok(self.chips.iter().map(|c| c.id).collect())
    }

    fn chip(&self, id: ChipId) -> HalResult<Arc<dyn WifiChip>> {
        self.log.record(HalCall::GetChip(id));
        match self.mock_chip(id) {
            Some(chip) => Ok(chip),
            None => Err(HalError::new(StatusCode::ChipInvalid, format!("no chip {}", id))),
        }
    }
}

#[derive(Debug)]
struct RegistryState {
    transport: Transport,
    service_up: bool,
    notifications: Option<EventSink>,
    death: Option<(EventSink, u64)>,
}

/// Mock platform service registry exposing one [`MockHal`]
#[derive(Debug)]
pub struct MockServiceManager {
    hal: Arc<MockHal>,
    state: Mutex<RegistryState>,
}

impl MockServiceManager {
    /// Registry that declares and serves `hal`
    pub fn new(hal: Arc<MockHal>) -> Arc<Self> {
        Self::with_transport(hal, Transport::Hwbinder)
    }

    /// Registry where the HAL is not declared
    pub fn unsupported(hal: Arc<MockHal>) -> Arc<Self> {
        Self::with_transport(hal, Transport::Empty)
    }

    /// Registry reporting `transport` for the HAL
    pub fn with_transport(hal: Arc<MockHal>, transport: Transport) -> Arc<Self> {
        Arc::new(Self {
            hal,
            state: Mutex::new(RegistryState {
                transport,
                service_up: transport.is_declared(),
                notifications: None,
                death: None,
            }),
        })
    }

    /// Get the served HAL
    pub fn hal(&self) -> &Arc<MockHal> {
        &self.hal
    }

    /// Serve or hide the HAL
    pub fn set_service_up(&self, up: bool) {
        self.state.lock().service_up = up;
    }

    /// Kill the HAL process and stop serving it
    pub fn kill_service(&self) -> bool {
        self.set_service_up(false);
        self.hal.die()
    }

    /// Serve the HAL again and tell subscribers it registered
    pub fn announce_registration(&self, preexisting: bool) -> bool {
        let sink = {
            let mut state = self.state.lock();
            state.service_up = true;
            state.notifications.clone()
        };
        match sink {
            Some(sink) => sink.emit(HalEvent::ServiceRegistered {
                interface: crate::WIFI_HAL_INTERFACE.to_string(),
                instance: crate::DEFAULT_INSTANCE.to_string(),
                preexisting,
            }),
            None => false,
        }
    }

    /// Kill the registry itself
    pub fn die(&self) -> bool {
        let death = self.state.lock().death.take();
        match death {
            Some((sink, cookie)) => sink.emit(HalEvent::ServiceManagerDied { cookie }),
            None => false,
        }
    }
}

impl ServiceManager for MockServiceManager {
    fn link_to_death(&self, sink: EventSink, cookie: u64) -> bool {
        self.hal.log.record(HalCall::WatchServiceManager);
        self.state.lock().death = Some((sink, cookie));
        true
    }

    fn register_for_notifications(&self, _interface: &str, _instance: &str, sink: EventSink) -> bool {
        self.hal.log.record(HalCall::RegisterForNotifications);
        self.state.lock().notifications = Some(sink);
        true
    }

    fn transport(&self, _interface: &str, _instance: &str) -> Transport {
        self.hal.log.record(HalCall::GetTransport);
        self.state.lock().transport
    }

    fn get_service(&self, _interface: &str, _instance: &str) -> Option<Arc<dyn WifiHal>> {
        self.hal.log.record(HalCall::GetService);
        let state = self.state.lock();
        if state.service_up && state.transport.is_declared() {
            let hal: Arc<dyn WifiHal> = self.hal.clone();
            Some(hal)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::event_channel;
    use crate::typed::ChipExt;

    #[test]
    fn test_baseline_chip_naming() {
        let log = CallLog::new();
        let hal = MockHal::baseline(log.clone());
        let chip = hal.chip(MockHal::BASELINE_CHIP_ID).unwrap();

        assert!(chip.create_iface(IfaceType::Sta).is_err());
        chip.configure_chip(MockHal::STA_CHIP_MODE_ID).unwrap();

        let sta = chip.create_iface(IfaceType::Sta).unwrap();
        assert_eq!(sta.name().unwrap(), "sta0");
        let p2p = chip.create_iface(IfaceType::P2p).unwrap();
        assert_eq!(p2p.name().unwrap(), "p2p0");

        chip.remove_iface(IfaceType::Sta, "sta0").unwrap();
        assert!(chip.remove_iface(IfaceType::Sta, "sta0").is_err());
        assert_eq!(chip.iface_names(IfaceType::P2p).unwrap(), vec!["p2p0".to_string()]);
    }

    #[test]
    fn test_configure_drops_ifaces() {
        let hal = MockHal::baseline(CallLog::new());
        let mock = hal.mock_chip(MockHal::BASELINE_CHIP_ID).unwrap();
        mock.configure_chip(MockHal::STA_CHIP_MODE_ID).unwrap();
        mock.create_iface(IfaceType::Sta).unwrap();

        mock.configure_chip(MockHal::AP_CHIP_MODE_ID).unwrap();
        assert_eq!(mock.iface_count(), 0);
        assert_eq!(mock.mode().unwrap(), MockHal::AP_CHIP_MODE_ID);
        assert!(mock.configure_chip(ModeId(7)).is_err());
    }

    #[test]
    fn test_scripted_start() {
        let log = CallLog::new();
        let hal = MockHal::baseline(log.clone());
        let (sink, rx) = event_channel();
        hal.register_event_callback(sink).unwrap();

        hal.script_start([StatusCode::NotAvailable]);
        assert!(hal.start().is_err());
        assert!(hal.start().is_ok());
        assert_eq!(rx.try_recv().ok(), Some(HalEvent::Started));
        assert_eq!(log.count(&HalCall::Start), 2);
        assert_eq!(log.mutations(), vec![HalCall::Start, HalCall::Start]);
    }

    #[test]
    fn test_chip_ids_failure_budget() {
        let hal = MockHal::baseline(CallLog::new());
        hal.fail_chip_ids_after(Some(1));

        assert_eq!(hal.chip_ids().unwrap(), vec![MockHal::BASELINE_CHIP_ID]);
        assert!(hal.chip_ids().is_err());
        assert!(hal.chip_ids().is_err());

        hal.fail_chip_ids_after(None);
        assert!(hal.chip_ids().is_ok());
    }

    #[test]
    fn test_death_uses_link_cookie() {
        let hal = MockHal::baseline(CallLog::new());
        let (sink, rx) = event_channel();
        assert!(hal.link_to_death(sink, 42));

        assert!(hal.die());
        assert_eq!(rx.try_recv().ok(), Some(HalEvent::ServiceDied { cookie: 42 }));
        // Recipient is consumed by the death
        assert!(!hal.die());
    }

    #[test]
    fn test_unsupported_registry() {
        let hal = MockHal::baseline(CallLog::new());
        let sm = MockServiceManager::unsupported(hal);
        assert_eq!(sm.transport("x", "y"), Transport::Empty);
        assert!(sm.get_service("x", "y").is_none());
    }
}
