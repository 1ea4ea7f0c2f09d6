//! Lifecycle state machine
//!
//! The manager's state moves only through [`LifecycleState::on`]. Side
//! effects hang off the trigger, not the state: every trigger for which
//! [`Trigger::tears_down`] holds clears the caches and notifies listeners,
//! and only those for which [`Trigger::issues_hal_stop`] holds touch the
//! hardware.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Manager lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Never bound, or the service was unavailable
    NotStarted,
    /// Service not declared on this platform
    Unsupported,
    /// Bound; HAL stopped
    Ready,
    /// Inside `start()`, on the given attempt
    Starting { attempt: u32 },
    /// HAL start accepted; `confirmed` once the started event arrived
    Started { confirmed: bool },
    /// HAL died, waiting for the service to register again
    Dead,
    /// Cache and hardware diverged, waiting for `initialize()`
    Diverged,
}

impl LifecycleState {
    /// Bound and usable
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            LifecycleState::Ready | LifecycleState::Starting { .. } | LifecycleState::Started { .. }
        )
    }

    /// Check if the HAL start succeeded
    pub fn is_started(&self) -> bool {
        matches!(self, LifecycleState::Started { .. })
    }

    /// Next state for `trigger`, `None` if the trigger is not valid here
    pub fn on(self, trigger: Trigger) -> Option<LifecycleState> {
        use LifecycleState as S;
        use Trigger as T;

        let next = match (self, trigger) {
            (S::NotStarted | S::Unsupported | S::Dead | S::Diverged, T::Bound) => S::Ready,
            (S::NotStarted | S::Unsupported | S::Dead | S::Diverged, T::BindUnsupported) => {
                S::Unsupported
            }

            (S::Ready, T::StartAttempt) => S::Starting { attempt: 1 },
            (S::Starting { attempt }, T::StartAttempt) => S::Starting {
                attempt: attempt + 1,
            },
            (S::Starting { .. }, T::StartFailed) => S::Ready,
            (S::Starting { .. }, T::StartSucceeded) => S::Started { confirmed: false },
            (S::Started { confirmed: false }, T::StartConfirmed) => S::Started { confirmed: true },

            (S::Ready | S::Starting { .. } | S::Started { .. }, T::Stop) => S::Ready,
            (S::Ready | S::Starting { .. } | S::Started { .. }, T::HalFailure) => S::Ready,
            (S::Ready | S::Starting { .. } | S::Started { .. }, T::Death) => S::Dead,
            (S::Ready | S::Starting { .. } | S::Started { .. }, T::CacheMismatch) => S::Diverged,

            _ => return None,
        };
        Some(next)
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        LifecycleState::NotStarted
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::NotStarted => f.write_str("not-started"),
            LifecycleState::Unsupported => f.write_str("unsupported"),
            LifecycleState::Ready => f.write_str("ready"),
            LifecycleState::Starting { attempt } => write!(f, "starting (attempt {})", attempt),
            LifecycleState::Started { confirmed: true } => f.write_str("started"),
            LifecycleState::Started { confirmed: false } => f.write_str("started (unconfirmed)"),
            LifecycleState::Dead => f.write_str("dead"),
            LifecycleState::Diverged => f.write_str("diverged"),
        }
    }
}

/// Input to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    Bound,
    BindUnsupported,
    StartAttempt,
    StartSucceeded,
    StartFailed,
    StartConfirmed,
    Stop,
    HalFailure,
    Death,
    CacheMismatch,
}

impl Trigger {
    /// Caches are cleared and status plus destroyed listeners notified
    pub fn tears_down(&self) -> bool {
        matches!(
            self,
            Trigger::Stop | Trigger::HalFailure | Trigger::Death | Trigger::CacheMismatch
        )
    }

    /// The hardware stop call is issued
    pub fn issues_hal_stop(&self) -> bool {
        matches!(self, Trigger::Stop | Trigger::CacheMismatch)
    }
}
