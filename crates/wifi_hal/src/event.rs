//! Asynchronous notifications from the HAL and the service registry
//!
//! Everything the platform reports out of band arrives as a [`HalEvent`]
//! through an [`EventSink`]. The manager owns the receiving end and drains
//! it on its own thread, so callbacks never touch manager state directly.

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::status::HalError;

/// Out-of-band notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HalEvent {
    /// HAL finished starting
    Started,
    /// HAL stopped
    Stopped,
    /// HAL hit an unrecoverable failure and tore itself down
    Failure(HalError),
    /// HAL process died; `cookie` identifies the binding it was linked under
    ServiceDied { cookie: u64 },
    /// Service registry died
    ServiceManagerDied { cookie: u64 },
    /// A service instance became available
    ServiceRegistered {
        interface: String,
        instance: String,
        preexisting: bool,
    },
}

impl HalEvent {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            HalEvent::Started => "started",
            HalEvent::Stopped => "stopped",
            HalEvent::Failure(_) => "failure",
            HalEvent::ServiceDied { .. } => "service_died",
            HalEvent::ServiceManagerDied { .. } => "service_manager_died",
            HalEvent::ServiceRegistered { .. } => "service_registered",
        }
    }
}

type Deliver = dyn Fn(HalEvent) -> bool + Send + Sync;

/// Sending half handed to the HAL and the service registry
#[derive(Clone)]
pub struct EventSink {
    deliver: Arc<Deliver>,
}

impl EventSink {
    /// Wrap an existing sender
    pub fn new(sender: Sender<HalEvent>) -> Self {
        Self::forward(sender, |event| event)
    }

    /// Deliver into a queue of some other message type, wrapping each event
    ///
    /// Lets the receiver interleave events with its own messages in one
    /// ordered queue.
    pub fn forward<T, F>(sender: Sender<T>, wrap: F) -> Self
    where
        T: Send + 'static,
        F: Fn(HalEvent) -> T + Send + Sync + 'static,
    {
        Self {
            deliver: Arc::new(move |event: HalEvent| {
                let name = event.name();
                match sender.send(wrap(event)) {
                    Ok(()) => true,
                    Err(_) => {
                        log::debug!("Dropping {} event: receiver closed", name);
                        false
                    }
                }
            }),
        }
    }

    /// Deliver an event; returns false once the receiver is gone
    pub fn emit(&self, event: HalEvent) -> bool {
        (self.deliver)(event)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink").finish_non_exhaustive()
    }
}

/// Create a connected sink and receiver
pub fn event_channel() -> (EventSink, Receiver<HalEvent>) {
    let (tx, rx) = unbounded();
    (EventSink::new(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_and_receive() {
        let (sink, rx) = event_channel();
        assert!(sink.emit(HalEvent::Started));
        assert!(sink.emit(HalEvent::ServiceDied { cookie: 4 }));

        assert_eq!(rx.try_recv().ok(), Some(HalEvent::Started));
        assert_eq!(rx.try_recv().ok(), Some(HalEvent::ServiceDied { cookie: 4 }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_emit_after_close() {
        let (sink, rx) = event_channel();
        drop(rx);
        assert!(!sink.emit(HalEvent::Stopped));
    }

    #[derive(Debug, PartialEq)]
    enum Message {
        Local(u32),
        Hal(HalEvent),
    }

    #[test]
    fn test_forward_keeps_queue_order() {
        let (tx, rx) = unbounded();
        let sink = EventSink::forward(tx.clone(), Message::Hal);

        tx.send(Message::Local(1)).unwrap();
        assert!(sink.emit(HalEvent::Started));
        tx.send(Message::Local(2)).unwrap();

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                Message::Local(1),
                Message::Hal(HalEvent::Started),
                Message::Local(2),
            ]
        );
    }
}
