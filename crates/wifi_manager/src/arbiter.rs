//! Priority arbiter
//!
//! Pure planning over a fresh inventory. For every chip, mode and expanded
//! combination the arbiter works out what it would take to host one more
//! interface of the requested type, and keeps the cheapest feasible plan:
//!
//! 1. no mode switch beats a mode switch
//! 2. then fewer destroyed interfaces, compared type by type from the
//!    highest priority down
//! 3. then the first candidate in chip, mode and combination order
//!
//! A candidate is infeasible when it would destroy an interface the request
//! is not allowed to preempt (see [`may_preempt`]).

use wifi_hal::{ChipId, IfaceCombination, IfaceType, IfaceTypeMap, ModeId};

use crate::inventory::ChipInfo;
use crate::priority::{may_preempt, rank, PRIORITY_ORDER};
use crate::registry::IfaceKey;

/// What has to happen to host the requested interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub chip_id: ChipId,
    pub mode_id: ModeId,
    /// The chip must be configured to `mode_id` first
    pub mode_switch: bool,
    /// Interfaces to remove, in removal order
    pub destroy: Vec<IfaceKey>,
}

impl Plan {
    /// Comparison key; lower is better
    fn cost(&self) -> (bool, [usize; 4]) {
        let mut counts = [0usize; 4];
        for key in &self.destroy {
            counts[rank(key.ty)] += 1;
        }
        (self.mode_switch, counts)
    }
}

/// Every concrete per-type count vector a combination allows
///
/// Each unit of a shared limit is handed to one of its types, so
/// `1 x {P2P, NAN}` yields one vector with a P2P and one with a NAN.
pub fn expand_combination(combination: &IfaceCombination) -> Vec<IfaceTypeMap<u32>> {
    let mut expanded = vec![IfaceTypeMap::<u32>::default()];
    for limit in &combination.limits {
        for _ in 0..limit.max_ifaces {
            let mut next = Vec::with_capacity(expanded.len() * limit.types.len());
            for counts in &expanded {
                for ty in &limit.types {
                    let mut grown = counts.clone();
                    grown[*ty] += 1;
                    if !next.contains(&grown) {
                        next.push(grown);
                    }
                }
            }
            if !next.is_empty() {
                expanded = next;
            }
        }
    }
    expanded
}

/// Plan for one chip, mode and concrete count vector
fn evaluate(
    chip: &ChipInfo,
    mode_id: ModeId,
    counts: &IfaceTypeMap<u32>,
    requested: IfaceType,
) -> Option<Plan> {
    if counts[requested] == 0 {
        return None;
    }

    let mode_switch = chip.current_mode != Some(mode_id);
    let mut destroy = Vec::new();

    for (ty, names) in chip.ifaces.iter() {
        let kept = if mode_switch {
            0
        } else {
            let allowed = counts[ty] - u32::from(ty == requested);
            allowed as usize
        };
        if names.len() <= kept {
            continue;
        }
        if !may_preempt(ty, requested) {
            return None;
        }
        let excess = names.len() - kept;
        destroy.extend(
            names
                .iter()
                .take(excess)
                .map(|name| IfaceKey::new(chip.id, ty, name.as_str())),
        );
    }

    Some(Plan {
        chip_id: chip.id,
        mode_id,
        mode_switch,
        destroy,
    })
}

/// Cheapest way to host one more `requested` interface, `None` if refused
pub fn plan(chips: &[ChipInfo], requested: IfaceType) -> Option<Plan> {
    let mut best: Option<Plan> = None;
    for chip in chips {
        for mode in &chip.modes {
            for combination in &mode.combinations {
                for counts in expand_combination(combination) {
                    let Some(candidate) = evaluate(chip, mode.id, &counts, requested) else {
                        continue;
                    };
                    let better = match &best {
                        Some(current) => candidate.cost() < current.cost(),
                        None => true,
                    };
                    if better {
                        best = Some(candidate);
                    }
                }
            }
        }
    }
    best
}

/// Whether a request for `ty` would currently be granted
pub fn is_obtainable(chips: &[ChipInfo], ty: IfaceType) -> bool {
    plan(chips, ty).is_some()
}

/// Types that would currently be granted, in priority order
pub fn obtainable_types(chips: &[ChipInfo]) -> Vec<IfaceType> {
    PRIORITY_ORDER
        .into_iter()
        .filter(|ty| is_obtainable(chips, *ty))
        .collect()
}
