//! Chip inventory
//!
//! A fresh picture of every chip the bound HAL exposes: its modes, its
//! current mode and the interface names the hardware reports. A chip that
//! fails to answer is left out of the picture rather than failing the whole
//! refresh.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use wifi_hal::{
    ChipExt, ChipId, ChipMode, HalResult, IfaceType, IfaceTypeMap, ModeId, StatusCode, WifiChip,
    WifiHal,
};

use crate::error::{ManagerError, ManagerResult};

/// Cached view of one chip
#[derive(Clone)]
pub struct ChipInfo {
    pub id: ChipId,
    pub handle: Arc<dyn WifiChip>,
    pub modes: Vec<ChipMode>,
    /// `None` until a mode has been configured
    pub current_mode: Option<ModeId>,
    /// Interface names as reported by the hardware, per type
    pub ifaces: IfaceTypeMap<Vec<String>>,
}

impl ChipInfo {
    /// Look up a mode by ID
    pub fn mode(&self, id: ModeId) -> Option<&ChipMode> {
        self.modes.iter().find(|m| m.id == id)
    }

    /// Interfaces reported on this chip
    pub fn iface_count(&self) -> usize {
        self.ifaces.iter().map(|(_, names)| names.len()).sum()
    }
}

impl fmt::Debug for ChipInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChipInfo")
            .field("id", &self.id)
            .field("modes", &self.modes)
            .field("current_mode", &self.current_mode)
            .field("ifaces", &self.ifaces)
            .finish()
    }
}

/// Read the current mode, mapping "not configured" to `None`
pub fn query_mode(chip: &dyn WifiChip) -> HalResult<Option<ModeId>> {
    match chip.mode() {
        Ok(mode) => Ok(Some(mode)),
        Err(err) if err.code == StatusCode::NotAvailable => Ok(None),
        Err(err) => Err(err),
    }
}

/// Collection of chip views, in HAL enumeration order
#[derive(Debug, Default)]
pub struct ChipInventory {
    chips: Vec<ChipInfo>,
}

impl ChipInventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-query every chip
    pub fn refresh(&mut self, hal: &dyn WifiHal) -> ManagerResult<&[ChipInfo]> {
        let ids = hal.chip_ids()?;
        let mut chips = Vec::with_capacity(ids.len());
        for id in ids {
            match Self::query_chip(hal, id) {
                Ok(info) => chips.push(info),
                Err(err) => log::warn!("Omitting chip {} from inventory: {}", id, err),
            }
        }
        self.chips = chips;
        Ok(&self.chips)
    }

    fn query_chip(hal: &dyn WifiHal, id: ChipId) -> HalResult<ChipInfo> {
        let handle = hal.chip(id)?;
        let modes = handle.available_modes()?;
        let current_mode = query_mode(handle.as_ref())?;
        let mut ifaces = IfaceTypeMap::default();
        for ty in IfaceType::ALL {
            ifaces[ty] = handle.iface_names(ty)?;
        }
        Ok(ChipInfo {
            id,
            handle,
            modes,
            current_mode,
            ifaces,
        })
    }

    /// Chips from the last refresh, in enumeration order
    pub fn chips(&self) -> &[ChipInfo] {
        &self.chips
    }

    /// Look up a chip by ID
    pub fn chip(&self, id: ChipId) -> Option<&ChipInfo> {
        self.chips.iter().find(|c| c.id == id)
    }

    /// Cached mode of a chip; `None` if unknown or the chip is absent
    pub fn current_mode(&self, id: ChipId) -> Option<ModeId> {
        self.chip(id).and_then(|c| c.current_mode)
    }

    /// Configure a chip and update the cached view to match
    pub fn set_mode(&mut self, id: ChipId, mode: ModeId) -> ManagerResult<()> {
        let chip = self
            .chips
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ManagerError::UnknownChip(id))?;
        chip.handle.configure_chip(mode)?;
        log::info!("Configured chip {} to mode {}", id, mode);
        chip.current_mode = Some(mode);
        chip.ifaces = IfaceTypeMap::default();
        Ok(())
    }

    /// Record an interface the hardware just created
    pub fn note_created(&mut self, id: ChipId, ty: IfaceType, name: &str) {
        if let Some(chip) = self.chips.iter_mut().find(|c| c.id == id) {
            chip.ifaces[ty].push(name.to_string());
        }
    }

    /// Record an interface the hardware just removed
    pub fn note_removed(&mut self, id: ChipId, ty: IfaceType, name: &str) {
        if let Some(chip) = self.chips.iter_mut().find(|c| c.id == id) {
            chip.ifaces[ty].retain(|n| n != name);
        }
    }

    /// Forget every chip
    pub fn clear(&mut self) {
        self.chips.clear();
    }

    /// Types some mode can host, on one chip or on all of them
    pub fn supported_types(&self, chip: Option<ChipId>) -> BTreeSet<IfaceType> {
        self.chips
            .iter()
            .filter(|c| chip.map_or(true, |id| c.id == id))
            .flat_map(|c| c.modes.iter())
            .flat_map(|mode| IfaceType::ALL.into_iter().filter(move |ty| mode.supports(*ty)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wifi_hal::mock::{CallLog, HalCall, MockChip, MockHal};
    use wifi_hal::{IfaceCombination, IfaceCombinationLimit};

    #[test]
    fn test_refresh_baseline() {
        let hal = MockHal::baseline(CallLog::new());
        let mut inventory = ChipInventory::new();

        let chips = inventory.refresh(hal.as_ref()).unwrap();
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].id, MockHal::BASELINE_CHIP_ID);
        assert_eq!(chips[0].current_mode, None);
        assert_eq!(chips[0].modes.len(), 2);
        assert_eq!(chips[0].iface_count(), 0);
    }

    #[test]
    fn test_failing_chip_is_omitted() {
        let log = CallLog::new();
        let good = MockChip::new(ChipId(1), MockHal::baseline_modes(), log.clone());
        let bad = MockChip::new(ChipId(2), MockHal::baseline_modes(), log.clone());
        bad.fail_modes(Some(StatusCode::Unknown));
        let hal = MockHal::new(log, vec![bad, good]);

        let mut inventory = ChipInventory::new();
        let chips = inventory.refresh(hal.as_ref()).unwrap();
        assert_eq!(chips.len(), 1);
        assert_eq!(chips[0].id, ChipId(1));
    }

    #[test]
    fn test_set_mode_updates_cache() {
        let log = CallLog::new();
        let hal = MockHal::baseline(log.clone());
        let mut inventory = ChipInventory::new();
        inventory.refresh(hal.as_ref()).unwrap();

        inventory
            .set_mode(MockHal::BASELINE_CHIP_ID, MockHal::AP_CHIP_MODE_ID)
            .unwrap();
        assert_eq!(
            inventory.current_mode(MockHal::BASELINE_CHIP_ID),
            Some(MockHal::AP_CHIP_MODE_ID)
        );
        assert_eq!(
            log.count(&HalCall::ConfigureChip(
                MockHal::BASELINE_CHIP_ID,
                MockHal::AP_CHIP_MODE_ID
            )),
            1
        );

        let err = inventory.set_mode(ChipId(99), ModeId(0)).unwrap_err();
        assert!(matches!(err, ManagerError::UnknownChip(ChipId(99))));
    }

    #[test]
    fn test_supported_types() {
        let log = CallLog::new();
        let sta_only = MockChip::new(
            ChipId(1),
            vec![ChipMode::new(
                ModeId(0),
                vec![IfaceCombination::new(vec![IfaceCombinationLimit::new(
                    vec![IfaceType::Sta],
                    1,
                )])],
            )],
            log.clone(),
        );
        let baseline = MockChip::new(ChipId(2), MockHal::baseline_modes(), log.clone());
        let hal = MockHal::new(log, vec![sta_only, baseline]);

        let mut inventory = ChipInventory::new();
        assert!(inventory.supported_types(None).is_empty());
        inventory.refresh(hal.as_ref()).unwrap();

        let all: Vec<_> = inventory.supported_types(None).into_iter().collect();
        assert_eq!(all, IfaceType::ALL.to_vec());
        let one: Vec<_> = inventory.supported_types(Some(ChipId(1))).into_iter().collect();
        assert_eq!(one, vec![IfaceType::Sta]);
        assert!(inventory.supported_types(Some(ChipId(7))).is_empty());
    }
}
