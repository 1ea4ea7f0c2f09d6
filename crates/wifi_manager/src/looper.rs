//! Dispatch contexts
//!
//! Listener callbacks never run inline. Every registration names a
//! [`DispatchContext`] and notifications are posted there as tasks; whoever
//! owns the matching [`Looper`] decides when they run.

use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::{ManagerError, ManagerResult};

/// Unit of work posted to a context
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable handle for posting tasks to a [`Looper`]
#[derive(Clone)]
pub struct DispatchContext {
    name: Arc<str>,
    sender: Sender<Task>,
}

impl DispatchContext {
    /// Get the context name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue a task; false if the looper is gone
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
        if self.sender.send(Box::new(task)).is_err() {
            log::warn!("Dispatch context '{}' is closed, dropping task", self.name);
            return false;
        }
        true
    }
}

impl fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchContext")
            .field("name", &self.name)
            .finish()
    }
}

/// Task queue run by its owner
pub struct Looper {
    context: DispatchContext,
    receiver: Receiver<Task>,
}

impl Looper {
    /// Create a looper with an empty queue
    pub fn new(name: impl Into<String>) -> Self {
        let (sender, receiver) = unbounded();
        let name: String = name.into();
        Self {
            context: DispatchContext {
                name: Arc::from(name),
                sender,
            },
            receiver,
        }
    }

    /// Handle for posting to this looper
    pub fn context(&self) -> DispatchContext {
        self.context.clone()
    }

    /// Number of queued tasks
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Run one queued task, if any
    pub fn dispatch_next(&self) -> bool {
        match self.receiver.try_recv() {
            Ok(task) => {
                task();
                true
            }
            Err(_) => false,
        }
    }

    /// Run queued tasks until the queue is empty, including ones they post
    pub fn dispatch_all(&self) -> usize {
        let mut count = 0;
        while self.dispatch_next() {
            count += 1;
        }
        count
    }

    /// Run the queue on a dedicated thread until every context is dropped
    pub fn spawn(name: impl Into<String>) -> ManagerResult<(DispatchContext, JoinHandle<()>)> {
        let name: String = name.into();
        let looper = Looper::new(name.clone());
        let context = looper.context();
        let receiver = looper.receiver;
        drop(looper.context);

        let handle = std::thread::Builder::new()
            .name(name)
            .spawn(move || {
                for task in receiver.iter() {
                    task();
                }
            })
            .map_err(ManagerError::Io)?;
        Ok((context, handle))
    }
}

impl fmt::Debug for Looper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Looper")
            .field("name", &self.context.name)
            .field("pending", &self.receiver.len())
            .finish()
    }
}
