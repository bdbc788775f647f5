//! Damage resolution pipeline
//!
//! `resolve_damage` is pure: it reads both ledgers and reports which
//! consumed-on-hit statuses it used, without removing them. The caller
//! commits the consumption only once the hit actually lands, so a pending
//! hit that gets countered never burns the defender's marks.
//!
//! Composition order is fixed and independent of status ids:
//! 1. base plus every damage boost on the attacker
//! 2. times every dealt-scope multiplier on the attacker, in ledger order
//! 3. times every lasting taken-scope multiplier on the defender, in ledger order
//! 4. times every consumed-on-hit multiplier on the defender, in ledger order
//! 5. floor, minimum 0

use crate::core::{StatusId, StatusLedger, StatusRegistry};
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DamageResolution {
    pub amount: i32,
    /// Defender statuses to remove when this hit lands
    pub consumed: SmallVec<[StatusId; 2]>,
}

impl DamageResolution {
    /// A hit with no status involvement
    pub fn flat(amount: i32) -> Self {
        DamageResolution {
            amount: amount.max(0),
            consumed: SmallVec::new(),
        }
    }

    /// Remove the consumed statuses from the defender
    ///
    /// Returns the ids that were actually present.
    pub fn commit(&self, defender: &mut StatusLedger) -> SmallVec<[StatusId; 2]> {
        self.consumed
            .iter()
            .filter(|id| defender.remove(id).is_some())
            .cloned()
            .collect()
    }
}

pub fn resolve_damage(
    base: i32,
    attacker: &StatusLedger,
    defender: &StatusLedger,
    registry: &StatusRegistry,
) -> DamageResolution {
    debug_assert!(base >= 0, "negative base damage {base}");

    let boost: i32 = attacker
        .with_definitions(registry)
        .filter(|(_, def)| def.is_strength_like())
        .map(|(inst, def)| def.damage_boost.eval(inst.stacks))
        .sum();
    let mut amount = (base + boost) as f64;

    for (_, def) in attacker.with_definitions(registry) {
        if let Some(factor) = def.dealt_multiplier() {
            amount *= factor;
        }
    }

    let mut consumed = SmallVec::new();
    for (_, def) in defender.with_definitions(registry) {
        if let Some((factor, false)) = def.taken_multiplier() {
            amount *= factor;
        }
    }
    for (inst, def) in defender.with_definitions(registry) {
        if let Some((factor, true)) = def.taken_multiplier() {
            amount *= factor;
            consumed.push(inst.status.clone());
        }
    }

    DamageResolution {
        amount: (amount.floor() as i32).max(0),
        consumed,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShieldBlock {
    pub final_damage: i32,
    pub blocked: i32,
    /// Shield kinds that were used up
    pub depleted: SmallVec<[StatusId; 1]>,
}

/// Absorb `incoming` with the ledger's shield statuses, in ledger order
///
/// Shield stacks are capacity points: a partially used shield keeps
/// `capacity - blocked` stacks and an exhausted one is removed. No shield
/// passes damage through.
pub fn apply_shield_block(
    ledger: &mut StatusLedger,
    incoming: i32,
    registry: &StatusRegistry,
) -> ShieldBlock {
    let mut remaining = incoming.max(0);
    let mut result = ShieldBlock::default();

    let shields: SmallVec<[(StatusId, u32); 2]> = ledger
        .with_definitions(registry)
        .filter(|(_, def)| def.is_shield())
        .map(|(inst, _)| (inst.status.clone(), inst.stacks))
        .collect();

    for (id, stacks) in shields {
        if remaining == 0 {
            break;
        }
        let Some(def) = registry.lookup(&id) else {
            continue;
        };
        let capacity = def.block_amount.eval(stacks).max(0);
        let blocked = capacity.min(remaining);
        remaining -= blocked;
        result.blocked += blocked;

        let left = (capacity - blocked).max(0) as u32;
        ledger.set_stacks(&id, left);
        if left == 0 {
            result.depleted.push(id);
        }
    }

    result.final_damage = remaining;
    result
}
