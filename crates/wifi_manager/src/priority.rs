//! Static interface priority policy

use wifi_hal::IfaceType;

/// Interface types from highest to lowest priority
pub const PRIORITY_ORDER: [IfaceType; 4] = [
    IfaceType::Sta,
    IfaceType::Ap,
    IfaceType::P2p,
    IfaceType::Nan,
];

/// Position in [`PRIORITY_ORDER`]; 0 is highest
pub fn rank(ty: IfaceType) -> usize {
    match ty {
        IfaceType::Sta => 0,
        IfaceType::Ap => 1,
        IfaceType::P2p => 2,
        IfaceType::Nan => 3,
    }
}

/// Whether a request for `requested` may destroy an existing `existing`
///
/// An occupant always keeps its slot against a request of its own type.
pub fn may_preempt(existing: IfaceType, requested: IfaceType) -> bool {
    if existing == requested {
        return false;
    }
    match requested {
        IfaceType::Sta | IfaceType::Ap => true,
        IfaceType::P2p => existing == IfaceType::Nan,
        IfaceType::Nan => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_matches_order() {
        for (i, ty) in PRIORITY_ORDER.iter().enumerate() {
            assert_eq!(rank(*ty), i);
        }
    }

    #[test]
    fn test_preemption_table() {
        use IfaceType::*;

        for ty in IfaceType::ALL {
            assert!(!may_preempt(ty, ty));
            assert!(!may_preempt(ty, Nan));
        }

        assert!(may_preempt(Sta, Ap));
        assert!(may_preempt(P2p, Ap));
        assert!(may_preempt(Ap, Sta));
        assert!(may_preempt(Nan, Sta));
        assert!(may_preempt(Nan, P2p));
        assert!(!may_preempt(Sta, P2p));
        assert!(!may_preempt(Ap, P2p));
        assert!(!may_preempt(P2p, Nan));
    }
}
