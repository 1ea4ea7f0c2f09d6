//! Value types shared across the HAL boundary
//!
//! Chips, modes and interface combinations are plain data: the HAL reports
//! them, the manager caches and plans against them.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Chip identifier as reported by the HAL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChipId(pub u32);

impl ChipId {
    /// Get the raw ID
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chip mode identifier, unique within one chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModeId(pub u32);

impl ModeId {
    /// Get the raw ID
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logical interface type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IfaceType {
    /// Station (client)
    Sta = 0,
    /// Soft access point
    Ap = 1,
    /// Wi-Fi Direct peer-to-peer
    P2p = 2,
    /// Neighbor awareness networking
    Nan = 3,
}

impl IfaceType {
    /// Every interface type, in slot order
    pub const ALL: [IfaceType; 4] = [IfaceType::Sta, IfaceType::Ap, IfaceType::P2p, IfaceType::Nan];

    /// Slot index of this type
    #[inline]
    /// Position in [`IfaceType::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short upper-case name
    pub const fn as_str(self) -> &'static str {
        match self {
            IfaceType::Sta => "STA",
            IfaceType::Ap => "AP",
            IfaceType::P2p => "P2P",
            IfaceType::Nan => "NAN",
        }
    }

    /// Lower-case prefix used by HAL-assigned interface names
    pub const fn name_prefix(self) -> &'static str {
        match self {
            IfaceType::Sta => "sta",
            IfaceType::Ap => "ap",
            IfaceType::P2p => "p2p",
            IfaceType::Nan => "nan",
        }
    }
}

impl fmt::Display for IfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed map with one slot per interface type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfaceTypeMap<T> {
    slots: [T; 4],
}

impl<T> IfaceTypeMap<T> {
    /// Build a map by evaluating `f` for every type
    pub fn from_fn(mut f: impl FnMut(IfaceType) -> T) -> Self {
        Self {
            slots: IfaceType::ALL.map(&mut f),
        }
    }

    /// Iterate `(type, value)` pairs in slot order
    pub fn iter(&self) -> impl Iterator<Item = (IfaceType, &T)> {
        IfaceType::ALL.into_iter().zip(self.slots.iter())
    }

    /// Iterate `(type, value)` pairs mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (IfaceType, &mut T)> {
        IfaceType::ALL.into_iter().zip(self.slots.iter_mut())
    }
}

impl<T> Index<IfaceType> for IfaceTypeMap<T> {
    type Output = T;

    fn index(&self, ty: IfaceType) -> &T {
        &self.slots[ty.index()]
    }
}

impl<T> IndexMut<IfaceType> for IfaceTypeMap<T> {
    fn index_mut(&mut self, ty: IfaceType) -> &mut T {
        &mut self.slots[ty.index()]
    }
}

/// One shared slot: up to `max_ifaces` interfaces, each of any listed type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfaceCombinationLimit {
    /// Types that may occupy this slot
    pub types: Vec<IfaceType>,
    /// Maximum interfaces in this slot
    pub max_ifaces: u32,
}

impl IfaceCombinationLimit {
    /// Create a limit
    pub fn new(types: impl Into<Vec<IfaceType>>, max_ifaces: u32) -> Self {
        Self {
            types: types.into(),
            max_ifaces,
        }
    }
}

impl fmt::Display for IfaceCombinationLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {{", self.max_ifaces)?;
        for (i, ty) in self.types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", ty)?;
        }
        f.write_str("}")
    }
}

/// A set of limits that can be satisfied simultaneously
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IfaceCombination {
    pub limits: Vec<IfaceCombinationLimit>,
}

impl IfaceCombination {
    /// Create a combination from its limits
    pub fn new(limits: impl Into<Vec<IfaceCombinationLimit>>) -> Self {
        Self {
            limits: limits.into(),
        }
    }

    /// Check whether any limit admits the given type
    pub fn allows(&self, ty: IfaceType) -> bool {
        self.limits.iter().any(|l| l.max_ifaces > 0 && l.types.contains(&ty))
    }
}

impl fmt::Display for IfaceCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, limit) in self.limits.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", limit)?;
        }
        f.write_str("]")
    }
}

/// A chip configuration and the combinations it supports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipMode {
    pub id: ModeId,
    pub combinations: Vec<IfaceCombination>,
}

impl ChipMode {
    /// Create a mode
    pub fn new(id: ModeId, combinations: impl Into<Vec<IfaceCombination>>) -> Self {
        Self {
            id,
            combinations: combinations.into(),
        }
    }

    /// Check whether any combination of this mode admits the given type
    pub fn supports(&self, ty: IfaceType) -> bool {
        self.combinations.iter().any(|c| c.allows(ty))
    }
}

/// How the platform registry exposes the HAL service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transport {
    /// Service is not declared on this platform
    Empty,
    /// Out-of-process service
    Hwbinder,
    /// In-process service
    Passthrough,
}

impl Transport {
    /// Whether the service is declared at all
    pub fn is_declared(&self) -> bool {
        !matches!(self, Transport::Empty)
    }
}
