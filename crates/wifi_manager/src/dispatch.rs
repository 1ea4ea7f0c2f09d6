//! Listener dispatcher
//!
//! Keeps the three kinds of listener registrations and posts notifications
//! to each registration's [`DispatchContext`]. Registering the same listener
//! (same `Arc` allocation) for the same target again is a no-op that hands
//! back the existing [`SubscriptionId`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wifi_hal::IfaceType;

use crate::looper::DispatchContext;
use crate::registry::{Iface, IfaceKey};

/// Told whenever the manager starts or stops
pub trait ManagerStatusListener: Send + Sync {
    fn on_status_changed(&self);
}

impl<F: Fn() + Send + Sync> ManagerStatusListener for F {
    fn on_status_changed(&self) {
        self()
    }
}

/// Told once when a specific interface is destroyed
pub trait InterfaceDestroyedListener: Send + Sync {
    fn on_destroyed(&self, iface: &Iface);
}

impl<F: Fn(&Iface) + Send + Sync> InterfaceDestroyedListener for F {
    fn on_destroyed(&self, iface: &Iface) {
        self(iface)
    }
}

/// Told whenever an interface type can be obtained
pub trait InterfaceAvailableListener: Send + Sync {
    fn on_available_for_request(&self, ty: IfaceType);
}

impl<F: Fn(IfaceType) + Send + Sync> InterfaceAvailableListener for F {
    fn on_available_for_request(&self, ty: IfaceType) {
        self(ty)
    }
}

/// Handle returned from every registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

fn identity<L: ?Sized>(listener: &Arc<L>) -> usize {
    Arc::as_ptr(listener) as *const () as usize
}

struct Registration<L: ?Sized> {
    id: SubscriptionId,
    listener: Arc<L>,
    context: DispatchContext,
}

impl<L: ?Sized> Registration<L> {
    fn is(&self, listener: &Arc<L>) -> bool {
        identity(&self.listener) == identity(listener)
    }
}

/// Registered listeners, in registration order per kind
#[derive(Default)]
pub struct ListenerDispatcher {
    next_id: u64,
    status: Vec<Registration<dyn ManagerStatusListener>>,
    destroyed: Vec<(IfaceKey, Registration<dyn InterfaceDestroyedListener>)>,
    available: Vec<(IfaceType, Registration<dyn InterfaceAvailableListener>)>,
}

impl ListenerDispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    /// Register a status listener
    pub fn register_status(
        &mut self,
        listener: Arc<dyn ManagerStatusListener>,
        context: DispatchContext,
    ) -> SubscriptionId {
        if let Some(existing) = self.status.iter().find(|r| r.is(&listener)) {
            log::warn!("Status listener already registered as {}", existing.id);
            return existing.id;
        }
        let id = self.allocate();
        self.status.push(Registration {
            id,
            listener,
            context,
        });
        id
    }

    /// Register a listener for the destruction of `key`
    pub fn register_destroyed(
        &mut self,
        key: IfaceKey,
        listener: Arc<dyn InterfaceDestroyedListener>,
        context: DispatchContext,
    ) -> SubscriptionId {
        if let Some((_, existing)) = self
            .destroyed
            .iter()
            .find(|(k, r)| *k == key && r.is(&listener))
        {
            log::warn!("Destroyed listener for {} already registered as {}", key, existing.id);
            return existing.id;
        }
        let id = self.allocate();
        self.destroyed.push((
            key,
            Registration {
                id,
                listener,
                context,
            },
        ));
        id
    }

    /// Register for a type; the flag is false for a duplicate
    pub fn register_available(
        &mut self,
        ty: IfaceType,
        listener: Arc<dyn InterfaceAvailableListener>,
        context: DispatchContext,
    ) -> (SubscriptionId, bool) {
        if let Some((_, existing)) = self
            .available
            .iter()
            .find(|(t, r)| *t == ty && r.is(&listener))
        {
            log::warn!("{} availability listener already registered as {}", ty, existing.id);
            return (existing.id, false);
        }
        let id = self.allocate();
        self.available.push((
            ty,
            Registration {
                id,
                listener,
                context,
            },
        ));
        (id, true)
    }

    /// Drop a registration of any kind
    pub fn unregister(&mut self, id: SubscriptionId) -> bool {
        let before = self.len();
        self.status.retain(|r| r.id != id);
        self.destroyed.retain(|(_, r)| r.id != id);
        self.available.retain(|(_, r)| r.id != id);
        self.len() != before
    }

    /// Post a status notification to every status listener
    pub fn notify_status(&self) {
        for reg in &self.status {
            let listener = reg.listener.clone();
            reg.context.post(move || listener.on_status_changed());
        }
    }

    /// Post to, then forget, every registration for `iface`
    pub fn notify_destroyed(&mut self, iface: &Iface) -> usize {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.destroyed)
            .into_iter()
            .partition(|(key, _)| key == iface.key());
        self.destroyed = rest;

        for (_, reg) in &matching {
            let listener = reg.listener.clone();
            let iface = iface.clone();
            reg.context.post(move || listener.on_destroyed(&iface));
        }
        matching.len()
    }

    /// Post to every availability registration whose type is in `types`
    pub fn notify_available(&self, types: &[IfaceType]) -> usize {
        let mut posted = 0;
        for (ty, reg) in &self.available {
            if types.contains(ty) {
                let listener = reg.listener.clone();
                let ty = *ty;
                reg.context.post(move || listener.on_available_for_request(ty));
                posted += 1;
            }
        }
        posted
    }

    /// Post to a single availability registration
    pub fn notify_available_one(&self, id: SubscriptionId) -> bool {
        match self.available.iter().find(|(_, r)| r.id == id) {
            Some((ty, reg)) => {
                let listener = reg.listener.clone();
                let ty = *ty;
                reg.context.post(move || listener.on_available_for_request(ty))
            }
            None => false,
        }
    }

    /// Number of status registrations
    pub fn status_count(&self) -> usize {
        self.status.len()
    }

    /// Number of pending destroyed registrations
    pub fn destroyed_count(&self) -> usize {
        self.destroyed.len()
    }

    /// Number of availability registrations
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Total registrations
    pub fn len(&self) -> usize {
        self.status.len() + self.destroyed.len() + self.available.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ListenerDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerDispatcher")
            .field("status", &self.status.len())
            .field("destroyed", &self.destroyed.len())
            .field("available", &self.available.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::looper::Looper;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wifi_hal::mock::MockIface;
    use wifi_hal::ChipId;

    fn iface(name: &str) -> Iface {
        Iface::new(
            IfaceKey::new(ChipId(1), IfaceType::Sta, name),
            Arc::new(MockIface::new(name, IfaceType::Sta)),
        )
    }

    #[test]
    fn test_status_dedup() {
        let looper = Looper::new("test");
        let mut dispatcher = ListenerDispatcher::new();
        let counter = Arc::new(AtomicU32::new(0));

        let c = counter.clone();
        let listener: Arc<dyn ManagerStatusListener> = Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let first = dispatcher.register_status(listener.clone(), looper.context());
        let second = dispatcher.register_status(listener, looper.context());
        assert_eq!(first, second);
        assert_eq!(dispatcher.status_count(), 1);

        dispatcher.notify_status();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        looper.dispatch_all();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_destroyed_fires_once() {
        let looper = Looper::new("test");
        let mut dispatcher = ListenerDispatcher::new();
        let counter = Arc::new(AtomicU32::new(0));

        let c = counter.clone();
        let listener: Arc<dyn InterfaceDestroyedListener> = Arc::new(move |iface: &Iface| {
            assert_eq!(iface.name(), "sta0");
            c.fetch_add(1, Ordering::SeqCst);
        });
        let sta = iface("sta0");
        dispatcher.register_destroyed(sta.key().clone(), listener.clone(), looper.context());
        dispatcher.register_destroyed(sta.key().clone(), listener.clone(), looper.context());
        dispatcher.register_destroyed(iface("sta1").key().clone(), listener, looper.context());
        assert_eq!(dispatcher.destroyed_count(), 2);

        assert_eq!(dispatcher.notify_destroyed(&sta), 1);
        assert_eq!(dispatcher.notify_destroyed(&sta), 0);
        looper.dispatch_all();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.destroyed_count(), 1);
    }

    #[test]
    fn test_available_filters_by_type() {
        let looper = Looper::new("test");
        let mut dispatcher = ListenerDispatcher::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let s = seen.clone();
        let listener: Arc<dyn InterfaceAvailableListener> =
            Arc::new(move |ty: IfaceType| s.lock().push(ty));
        let (_, fresh) = dispatcher.register_available(IfaceType::Ap, listener.clone(), looper.context());
        assert!(fresh);
        let (_, fresh) = dispatcher.register_available(IfaceType::Ap, listener.clone(), looper.context());
        assert!(!fresh);
        let (nan_id, _) = dispatcher.register_available(IfaceType::Nan, listener, looper.context());

        assert_eq!(dispatcher.notify_available(&[IfaceType::Ap, IfaceType::Sta]), 1);
        assert!(dispatcher.notify_available_one(nan_id));
        looper.dispatch_all();
        assert_eq!(*seen.lock(), vec![IfaceType::Ap, IfaceType::Nan]);
    }

    #[test]
    fn test_unregister() {
        let looper = Looper::new("test");
        let mut dispatcher = ListenerDispatcher::new();
        let listener: Arc<dyn ManagerStatusListener> = Arc::new(|| {});

        let id = dispatcher.register_status(listener, looper.context());
        assert!(dispatcher.unregister(id));
        assert!(!dispatcher.unregister(id));
        assert!(dispatcher.is_empty());
    }
}
