//! Status ledger: the ordered collection of a combatant's active statuses
//!
//! Insertion order is display order and the tie-break order for every
//! computation that walks the ledger (multipliers, shields). A status kind
//! appears at most once per ledger.

use crate::core::{StatusDefinition, StatusId, StatusRegistry};
use crate::{BattleError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A live status on a combatant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInstance {
    pub status: StatusId,
    /// Always in `1..=max_stacks`
    pub stacks: u32,
    /// Turns left; `None` is permanent until removed
    pub duration: Option<u32>,
}

/// What `apply` did to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Added { stacks: u32 },
    Stacked { from: u32, to: u32 },
    Refreshed { duration: Option<u32> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLedger {
    instances: SmallVec<[StatusInstance; 4]>,
}

impl StatusLedger {
    pub fn new() -> Self {
        StatusLedger {
            instances: SmallVec::new(),
        }
    }

    /// Apply `stacks` of a status
    ///
    /// Stackable kinds add stacks up to the cap and keep the longer duration;
    /// refresh-only kinds overwrite the duration and stay at one stack.
    pub fn apply(
        &mut self,
        def: &StatusDefinition,
        stacks: u32,
        duration: Option<u32>,
    ) -> ApplyOutcome {
        let stacks = stacks.max(1);
        let outcome = if let Some(existing) = self.find_mut(&def.id) {
            if def.is_stackable() {
                let from = existing.stacks;
                existing.stacks = (existing.stacks + stacks).min(def.max_stacks);
                existing.duration = match (existing.duration, duration) {
                    (Some(a), Some(b)) => Some(a.max(b)),
                    _ => None,
                };
                ApplyOutcome::Stacked {
                    from,
                    to: existing.stacks,
                }
            } else {
                existing.stacks = 1;
                existing.duration = duration;
                ApplyOutcome::Refreshed { duration }
            }
        } else {
            let stacks = if def.is_stackable() {
                stacks.min(def.max_stacks)
            } else {
                1
            };
            self.instances.push(StatusInstance {
                status: def.id.clone(),
                stacks,
                duration,
            });
            ApplyOutcome::Added { stacks }
        };

        debug_assert!(self.stacks(&def.id) <= def.max_stacks);
        debug_assert_eq!(
            self.instances.iter().filter(|i| i.status == def.id).count(),
            1
        );
        outcome
    }

    /// Set a status to exactly `stacks` (capped), adding it if absent
    ///
    /// Used for one-shot buffs whose magnitude replaces an earlier grant
    /// instead of adding to it.
    pub fn supersede(&mut self, def: &StatusDefinition, stacks: u32, duration: Option<u32>) {
        let stacks = stacks.clamp(1, def.max_stacks);
        if let Some(existing) = self.find_mut(&def.id) {
            existing.stacks = stacks;
            existing.duration = duration;
        } else {
            self.instances.push(StatusInstance {
                status: def.id.clone(),
                stacks,
                duration,
            });
        }
    }

    /// End-of-turn bookkeeping
    ///
    /// Escalating kinds gain a stack, timed kinds lose a turn. Returns the ids
    /// of instances that expired.
    pub fn tick(&mut self, registry: &StatusRegistry) -> SmallVec<[StatusId; 2]> {
        for inst in self.instances.iter_mut() {
            let def = registry.lookup(&inst.status);
            match def {
                Some(def) if def.flags.escalating => {
                    inst.stacks = (inst.stacks + 1).min(def.max_stacks);
                }
                _ => {
                    if let Some(d) = inst.duration {
                        inst.duration = Some(d.saturating_sub(1));
                    }
                }
            }
        }

        let expired = self
            .instances
            .iter()
            .filter(|i| i.duration == Some(0))
            .map(|i| i.status.clone())
            .collect();
        self.instances.retain(|i| i.duration != Some(0));
        expired
    }

    /// Remove a status kind unconditionally
    pub fn remove(&mut self, id: &StatusId) -> Option<StatusInstance> {
        let pos = self.instances.iter().position(|i| &i.status == id)?;
        Some(self.instances.remove(pos))
    }

    /// Remove every status whose definition matches `pred`
    pub fn remove_where(
        &mut self,
        registry: &StatusRegistry,
        mut pred: impl FnMut(&StatusDefinition) -> bool,
    ) -> SmallVec<[StatusId; 2]> {
        let mut removed = SmallVec::new();
        self.instances.retain(|inst| match registry.lookup(&inst.status) {
            Some(def) if pred(def) => {
                removed.push(inst.status.clone());
                false
            }
            _ => true,
        });
        removed
    }

    /// Set the stack count of an existing status; zero removes it
    pub fn set_stacks(&mut self, id: &StatusId, stacks: u32) {
        if stacks == 0 {
            self.remove(id);
        } else if let Some(inst) = self.find_mut(id) {
            inst.stacks = stacks;
        }
    }

    pub fn get(&self, id: &StatusId) -> Option<&StatusInstance> {
        self.instances.iter().find(|i| &i.status == id)
    }

    fn find_mut(&mut self, id: &StatusId) -> Option<&mut StatusInstance> {
        self.instances.iter_mut().find(|i| &i.status == id)
    }

    pub fn has(&self, id: &StatusId) -> bool {
        self.get(id).is_some()
    }

    /// Stacks of a status, 0 if absent
    pub fn stacks(&self, id: &StatusId) -> u32 {
        self.get(id).map(|i| i.stacks).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusInstance> {
        self.instances.iter()
    }

    /// Instances paired with their definitions, in ledger order
    ///
    /// Instances whose kind is missing from the registry are skipped.
    pub fn with_definitions<'a>(
        &'a self,
        registry: &'a StatusRegistry,
    ) -> impl Iterator<Item = (&'a StatusInstance, &'a StatusDefinition)> + 'a {
        self.instances
            .iter()
            .filter_map(move |inst| registry.lookup(&inst.status).map(|def| (inst, def)))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Damage the owner takes from its statuses at end of turn
    pub fn turn_damage(&self, registry: &StatusRegistry) -> i32 {
        self.with_definitions(registry)
            .map(|(inst, def)| def.damage_per_turn.eval(inst.stacks).max(0))
            .sum()
    }

    /// Healing the owner receives from its statuses at end of turn
    pub fn turn_healing(&self, registry: &StatusRegistry) -> i32 {
        self.with_definitions(registry)
            .map(|(inst, def)| def.heal_per_turn.eval(inst.stacks).max(0))
            .sum()
    }

    /// Sum of energy cost adjustments the owner's cards receive
    pub fn energy_cost_delta(&self, registry: &StatusRegistry) -> i32 {
        self.with_definitions(registry)
            .map(|(inst, def)| def.energy_cost_delta.eval(inst.stacks))
            .sum()
    }

    /// First status that makes the owner skip its turn
    pub fn turn_skipper(&self, registry: &StatusRegistry) -> Option<StatusId> {
        self.with_definitions(registry)
            .find(|(_, def)| def.flags.skips_turn)
            .map(|(inst, _)| inst.status.clone())
    }

    /// Total stacks of reflecting statuses
    pub fn reflect_amount(&self, registry: &StatusRegistry) -> i32 {
        self.with_definitions(registry)
            .filter(|(_, def)| def.flags.reflects)
            .map(|(inst, _)| inst.stacks as i32)
            .sum()
    }

    /// Verify the ledger invariants against the registry
    pub fn check(&self, registry: &StatusRegistry) -> Result<()> {
        for (i, inst) in self.instances.iter().enumerate() {
            let def = registry.get(&inst.status)?;
            if inst.stacks == 0 || inst.stacks > def.max_stacks {
                return Err(BattleError::InvariantViolation(format!(
                    "{} has {} stacks (max {})",
                    inst.status, inst.stacks, def.max_stacks
                )));
            }
            if inst.duration == Some(0) {
                return Err(BattleError::InvariantViolation(format!(
                    "{} kept with zero duration",
                    inst.status
                )));
            }
            if self.instances[..i].iter().any(|o| o.status == inst.status) {
                return Err(BattleError::InvariantViolation(format!(
                    "duplicate instance of {}",
                    inst.status
                )));
            }
        }
        Ok(())
    }
}
