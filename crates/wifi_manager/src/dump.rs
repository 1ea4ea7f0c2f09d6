//! Diagnostic snapshot of the manager

use std::fmt;

use serde::{Deserialize, Serialize};
use wifi_hal::{ChipId, ChipMode, ModeId};

use crate::dispatch::ListenerDispatcher;
use crate::inventory::ChipInventory;
use crate::lifecycle::LifecycleState;
use crate::registry::{IfaceKey, IfaceRegistry};

/// Last known view of one chip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipSnapshot {
    pub id: ChipId,
    pub current_mode: Option<ModeId>,
    pub modes: Vec<ChipMode>,
}

/// Registration counts per listener kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerCounts {
    pub status: usize,
    pub destroyed: usize,
    pub available: usize,
}

/// Point-in-time copy of the manager's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSnapshot {
    pub state: LifecycleState,
    pub bound: bool,
    pub chips: Vec<ChipSnapshot>,
    pub ifaces: Vec<IfaceKey>,
    pub listeners: ListenerCounts,
}

impl ManagerSnapshot {
    pub(crate) fn capture(
        state: LifecycleState,
        bound: bool,
        inventory: &ChipInventory,
        registry: &IfaceRegistry,
        dispatcher: &ListenerDispatcher,
    ) -> Self {
        Self {
            state,
            bound,
            chips: inventory
                .chips()
                .iter()
                .map(|c| ChipSnapshot {
                    id: c.id,
                    current_mode: c.current_mode,
                    modes: c.modes.clone(),
                })
                .collect(),
            ifaces: registry.ifaces().map(|i| i.key().clone()).collect(),
            listeners: ListenerCounts {
                status: dispatcher.status_count(),
                destroyed: dispatcher.destroyed_count(),
                available: dispatcher.available_count(),
            },
        }
    }
}

impl fmt::Display for ManagerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Wifi device manager:")?;
        writeln!(f, "  state: {}", self.state)?;
        writeln!(f, "  bound: {}", self.bound)?;

        writeln!(f, "  chips:")?;
        for chip in &self.chips {
            match chip.current_mode {
                Some(mode) => writeln!(f, "    chip {} (mode {})", chip.id, mode)?,
                None => writeln!(f, "    chip {} (mode unknown)", chip.id)?,
            }
            for mode in &chip.modes {
                write!(f, "      mode {}:", mode.id)?;
                for combination in &mode.combinations {
                    write!(f, " {}", combination)?;
                }
                writeln!(f)?;
            }
        }

        writeln!(f, "  interfaces:")?;
        for key in &self.ifaces {
            writeln!(f, "    {}", key)?;
        }

        writeln!(
            f,
            "  listeners: status={} destroyed={} available={}",
            self.listeners.status, self.listeners.destroyed, self.listeners.available
        )
    }
}
