//! Interface registry
//!
//! The cache of every interface the manager created. It changes only after
//! the hardware acknowledged a create or remove, and [`IfaceRegistry::validate`]
//! checks it against a fresh inventory before anything is planned on top of it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wifi_hal::{ChipExt, ChipId, IfaceType, IfaceTypeMap, WifiChip, WifiIface};

use crate::error::{ManagerError, ManagerResult};
use crate::inventory::ChipInfo;

/// Unique identity of an interface
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IfaceKey {
    pub chip_id: ChipId,
    pub ty: IfaceType,
    pub name: String,
}

impl IfaceKey {
    /// Create a new interface key
    pub fn new(chip_id: ChipId, ty: IfaceType, name: impl Into<String>) -> Self {
        Self {
            chip_id,
            ty,
            name: name.into(),
        }
    }
}

impl fmt::Display for IfaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@chip{}", self.ty, self.name, self.chip_id)
    }
}

/// Interface handed to consumers
#[derive(Clone)]
pub struct Iface {
    key: IfaceKey,
    hal: Arc<dyn WifiIface>,
}

impl Iface {
    /// Pair a key with its hardware handle
    pub fn new(key: IfaceKey, hal: Arc<dyn WifiIface>) -> Self {
        Self { key, hal }
    }

    /// Get the interface key
    pub fn key(&self) -> &IfaceKey {
        &self.key
    }

    /// Name assigned by the hardware
    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// Get the interface type
    pub fn iface_type(&self) -> IfaceType {
        self.key.ty
    }

    /// ID of the owning chip
    pub fn chip_id(&self) -> ChipId {
        self.key.chip_id
    }

    /// Underlying hardware handle
    pub fn hal(&self) -> &Arc<dyn WifiIface> {
        &self.hal
    }
}

impl PartialEq for Iface {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Iface {}

impl fmt::Debug for Iface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iface").field(&self.key).finish()
    }
}

impl fmt::Display for Iface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.key, f)
    }
}

struct Entry {
    iface: Iface,
    chip: Arc<dyn WifiChip>,
}

/// Cache of live interfaces, keyed by chip, type and name
#[derive(Default)]
pub struct IfaceRegistry {
    entries: BTreeMap<IfaceKey, Entry>,
}

impl IfaceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached names on one chip, per type
    pub fn snapshot(&self, chip_id: ChipId) -> IfaceTypeMap<Vec<String>> {
        let mut map: IfaceTypeMap<Vec<String>> = IfaceTypeMap::default();
        for key in self.entries.keys().filter(|k| k.chip_id == chip_id) {
            map[key.ty].push(key.name.clone());
        }
        map
    }

    /// Create an interface on `chip`; cached only once the hardware succeeded
    pub fn create(
        &mut self,
        chip_id: ChipId,
        chip: &Arc<dyn WifiChip>,
        ty: IfaceType,
    ) -> ManagerResult<Iface> {
        let hal = chip.create_iface(ty)?;
        let name = hal.name()?;
        let iface = Iface::new(IfaceKey::new(chip_id, ty, name), hal);
        log::debug!("Created {}", iface);
        self.entries.insert(
            iface.key.clone(),
            Entry {
                iface: iface.clone(),
                chip: chip.clone(),
            },
        );
        Ok(iface)
    }

    /// Remove an interface from the hardware, then from the cache
    pub fn remove(&mut self, key: &IfaceKey) -> ManagerResult<Iface> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| ManagerError::UnknownIface(key.clone()))?;
        entry.chip.remove_iface(key.ty, &key.name)?;
        log::debug!("Removed {}", key);
        self.entries
            .remove(key)
            .map(|e| e.iface)
            .ok_or_else(|| ManagerError::UnknownIface(key.clone()))
    }

    /// Compare the cache with a fresh inventory, in both directions
    ///
    /// Interfaces on chips missing from `chips` are not judged; that chip
    /// could not be queried this round.
    pub fn validate(&self, chips: &[ChipInfo]) -> ManagerResult<()> {
        for key in self.entries.keys() {
            let Some(chip) = chips.iter().find(|c| c.id == key.chip_id) else {
                log::debug!("Skipping validation of {}: chip not reported", key);
                continue;
            };
            if !chip.ifaces[key.ty].contains(&key.name) {
                return Err(ManagerError::CacheMismatch {
                    chip: chip.id,
                    detail: format!("cached {} {} missing from hardware", key.ty, key.name),
                });
            }
        }

        for chip in chips {
            for (ty, names) in chip.ifaces.iter() {
                for name in names {
                    let key = IfaceKey::new(chip.id, ty, name.as_str());
                    if !self.entries.contains_key(&key) {
                        return Err(ManagerError::CacheMismatch {
                            chip: chip.id,
                            detail: format!("hardware {} {} not in cache", ty, name),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Look up a cached interface
    pub fn get(&self, key: &IfaceKey) -> Option<&Iface> {
        self.entries.get(key).map(|e| &e.iface)
    }

    /// Check if an interface is cached
    pub fn contains(&self, key: &IfaceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Hardware chip hosting an interface
    pub fn chip_of(&self, key: &IfaceKey) -> Option<Arc<dyn WifiChip>> {
        self.entries.get(key).map(|e| e.chip.clone())
    }

    /// Every cached interface, in key order
    pub fn ifaces(&self) -> impl Iterator<Item = &Iface> {
        self.entries.values().map(|e| &e.iface)
    }

    /// Empty the cache, returning what it held
    pub fn drain(&mut self) -> Vec<Iface> {
        std::mem::take(&mut self.entries)
            .into_values()
            .map(|e| e.iface)
            .collect()
    }

    /// Number of cached interfaces
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no interface is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for IfaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}
