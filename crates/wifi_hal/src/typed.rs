//! Type-tagged access to the per-type chip call families

use std::sync::Arc;

use crate::facade::{WifiChip, WifiIface};
use crate::status::HalResult;
use crate::types::IfaceType;

/// Generic create/remove/list keyed on [`IfaceType`]
pub trait ChipExt {
    fn create_iface(&self, ty: IfaceType) -> HalResult<Arc<dyn WifiIface>>;

    fn remove_iface(&self, ty: IfaceType, name: &str) -> HalResult<()>;

    fn iface_names(&self, ty: IfaceType) -> HalResult<Vec<String>>;
}

impl<C: WifiChip + ?Sized> ChipExt for C {
    fn create_iface(&self, ty: IfaceType) -> HalResult<Arc<dyn WifiIface>> {
        match ty {
            IfaceType::Sta => self.create_sta_iface(),
            IfaceType::Ap => self.create_ap_iface(),
            IfaceType::P2p => self.create_p2p_iface(),
            IfaceType::Nan => self.create_nan_iface(),
        }
    }

    fn remove_iface(&self, ty: IfaceType, name: &str) -> HalResult<()> {
        match ty {
            IfaceType::Sta => self.remove_sta_iface(name),
            IfaceType::Ap => self.remove_ap_iface(name),
            IfaceType::P2p => self.remove_p2p_iface(name),
            IfaceType::Nan => self.remove_nan_iface(name),
        }
    }

    fn iface_names(&self, ty: IfaceType) -> HalResult<Vec<String>> {
        match ty {
            IfaceType::Sta => self.sta_iface_names(),
            IfaceType::Ap => self.ap_iface_names(),
            IfaceType::P2p => self.p2p_iface_names(),
            IfaceType::Nan => self.nan_iface_names(),
        }
    }
}
