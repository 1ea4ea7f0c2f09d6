//! Manager service driven from other threads

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};
use wifi_hal::mock::{CallLog, HalCall, MockHal, MockServiceManager};
use wifi_hal::IfaceType;
use wifi_manager::{
    Iface, InterfaceDestroyedListener, LifecycleState, Looper, ManagerConfig, ManagerHandle,
    ManagerService, ManagerStatusListener,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn status_listener() -> (Arc<dyn ManagerStatusListener>, Receiver<()>) {
    let (tx, rx) = unbounded();
    let listener: Arc<dyn ManagerStatusListener> = Arc::new(move || {
        let _ = tx.send(());
    });
    (listener, rx)
}

fn destroyed_listener() -> (Arc<dyn InterfaceDestroyedListener>, Receiver<String>) {
    let (tx, rx) = unbounded();
    let listener: Arc<dyn InterfaceDestroyedListener> = Arc::new(move |iface: &Iface| {
        let _ = tx.send(iface.name().to_string());
    });
    (listener, rx)
}

fn spawn() -> (CallLog, Arc<MockServiceManager>, ManagerService) {
    init_logger();
    let log = CallLog::new();
    let hal = MockHal::baseline(log.clone());
    let sm = MockServiceManager::new(hal);
    let config = ManagerConfig {
        thread_name: "wifi-manager-test".to_string(),
        ..ManagerConfig::default()
    };
    let service = ManagerService::spawn(config, sm.clone()).unwrap();
    (log, sm, service)
}

#[test]
fn test_lifecycle_through_handle() {
    let (log, _sm, service) = spawn();
    let handle = service.handle();
    let (ctx, _looper) = Looper::spawn("service-callbacks").unwrap();
    let (listener, status) = status_listener();

    assert!(handle.register_status_listener(listener, &ctx).is_some());
    assert!(handle.is_supported());
    assert!(handle.initialize());
    status.recv_timeout(TIMEOUT).unwrap();

    assert!(handle.start());
    // Confirmation arrives through the event queue
    status.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(handle.state(), Some(LifecycleState::Started { confirmed: true }));

    handle.stop();
    status.recv_timeout(TIMEOUT).unwrap();
    assert!(!handle.is_started());
    assert_eq!(log.count(&HalCall::Stop), 2);
}

#[test]
fn test_create_and_remove_through_handle() {
    let (_log, _sm, service) = spawn();
    let handle = service.handle();
    let (ctx, _looper) = Looper::spawn("service-callbacks").unwrap();
    let (listener, destroyed) = destroyed_listener();

    assert!(handle.initialize());
    assert!(handle.start());

    let sta = handle
        .create_iface(IfaceType::Sta, Some(listener), &ctx)
        .unwrap();
    assert_eq!(sta.name(), "sta0");
    assert!(handle.chip_for(&sta).is_some());
    assert_eq!(handle.supported_iface_types(None).len(), 4);
    assert!(handle.dump().contains("STA:sta0@chip10"));

    assert!(handle.remove_iface(&sta));
    assert_eq!(destroyed.recv_timeout(TIMEOUT).unwrap(), "sta0");
    assert!(handle.snapshot().unwrap().ifaces.is_empty());
}

#[test]
fn test_death_handled_before_next_command() {
    let (_log, sm, service) = spawn();
    let handle = service.handle();
    let (ctx, _looper) = Looper::spawn("service-callbacks").unwrap();
    let (listener, destroyed) = destroyed_listener();

    assert!(handle.initialize());
    assert!(handle.start());
    handle
        .create_iface(IfaceType::Ap, Some(listener), &ctx)
        .unwrap();

    assert!(sm.kill_service());
    assert!(!handle.is_ready());
    assert_eq!(handle.state(), Some(LifecycleState::Dead));
    assert_eq!(destroyed.recv_timeout(TIMEOUT).unwrap(), "ap0");

    assert!(sm.announce_registration(false));
    assert!(handle.is_ready());
}

/// Wait until `count` commands or events are queued behind the running one
fn wait_for_pending(handle: &ManagerHandle, count: usize) {
    let deadline = Instant::now() + TIMEOUT;
    while handle.pending() < count {
        assert!(Instant::now() < deadline, "queue never reached {} entries", count);
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_stop_queued_before_death_runs_first() {
    let (log, sm, service) = spawn();
    let handle = service.handle();
    assert!(handle.initialize());
    assert!(handle.start());

    // Park the manager thread so the next entries queue up behind it
    let (entered_tx, entered_rx) = unbounded();
    let (gate_tx, gate_rx) = unbounded::<()>();
    let blocker = {
        let handle = handle.clone();
        thread::spawn(move || {
            handle.call(move |_| {
                let _ = entered_tx.send(());
                let _ = gate_rx.recv();
            })
        })
    };
    entered_rx.recv_timeout(TIMEOUT).unwrap();

    let stopper = {
        let handle = handle.clone();
        thread::spawn(move || handle.stop())
    };
    wait_for_pending(&handle, 1);
    assert!(sm.kill_service());
    wait_for_pending(&handle, 2);

    gate_tx.send(()).unwrap();
    blocker.join().unwrap().unwrap();
    stopper.join().unwrap();

    // Baseline stop plus the queued stop, then the death
    assert_eq!(log.count(&HalCall::Stop), 2);
    assert_eq!(handle.state(), Some(LifecycleState::Dead));
}

#[test]
fn test_closed_service_gives_negative_results() {
    let (_log, _sm, service) = spawn();
    let handle = service.handle();
    let (ctx, _looper) = Looper::spawn("service-callbacks").unwrap();

    let manager = service.shutdown().unwrap();
    assert_eq!(manager.state(), LifecycleState::NotStarted);

    assert!(!handle.initialize());
    assert!(!handle.start());
    assert!(!handle.is_ready());
    assert_eq!(handle.state(), None);
    assert!(handle.create_iface(IfaceType::Sta, None, &ctx).is_none());
    assert!(handle.supported_iface_types(None).is_empty());
    assert!(handle.dump().is_empty());
}

#[test]
fn test_handles_are_shareable() {
    let (_log, _sm, service) = spawn();
    let handle = service.handle();
    assert!(handle.initialize());

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            std::thread::spawn(move || handle.is_ready())
        })
        .collect();
    for worker in workers {
        assert!(worker.join().unwrap());
    }
}
