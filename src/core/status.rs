//! Status registry: the static catalog of status kinds and their formulas
//!
//! Every formula is declarative data evaluated as a pure function of the
//! instance's stack count. Nothing in a definition can observe combat state,
//! which keeps the damage pipeline a pure function of the two ledgers.

use crate::core::StatusId;
use crate::{BattleError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Ids of the built-in status kinds
pub mod ids {
    pub const STRENGTH: &str = "strength";
    pub const WEAK: &str = "weak";
    pub const ENRAGED: &str = "enraged";
    pub const VULNERABLE: &str = "vulnerable";
    pub const MARKED: &str = "marked";
    pub const FRAGILE: &str = "fragile";
    pub const SHIELD: &str = "shield";
    pub const POISON: &str = "poison";
    pub const BURN: &str = "burn";
    pub const REGEN: &str = "regen";
    pub const STUN: &str = "stun";
    pub const THORNS: &str = "thorns";
    pub const DRAINED: &str = "drained";
}

/// A pure function of stack count
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Formula {
    /// Always 0 (the status has no such effect)
    #[default]
    Zero,
    /// Same value regardless of stacks
    Constant { value: i32 },
    /// `base + per_stack * stacks`
    Linear { base: i32, per_stack: i32 },
    /// `values[stacks - 1]`, the last entry repeats past the end
    Table { values: Vec<i32> },
}

impl Formula {
    pub fn linear(per_stack: i32) -> Self {
        Formula::Linear { base: 0, per_stack }
    }

    pub fn eval(&self, stacks: u32) -> i32 {
        match self {
            Formula::Zero => 0,
            Formula::Constant { value } => *value,
            Formula::Linear { base, per_stack } => {
                base.saturating_add(per_stack.saturating_mul(stacks as i32))
            }
            Formula::Table { values } => {
                if stacks == 0 || values.is_empty() {
                    return 0;
                }
                let idx = (stacks as usize - 1).min(values.len() - 1);
                values[idx]
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Formula::Zero)
    }
}

/// How repeated application of the same kind combines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackPolicy {
    /// Stacks add up to `max_stacks`
    Stackable,
    /// Re-application refreshes duration, stacks stay at 1
    RefreshOnly,
}

/// Helpful or harmful to the owner (cleanse removes debuffs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Buff,
    Debuff,
}

/// Which damage a multiplier scales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierScope {
    /// Damage dealt by the owner
    Dealt,
    /// Damage taken by the owner
    Taken,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageMultiplier {
    pub factor: f64,
    pub scope: MultiplierScope,
}

/// Behavioral flags of a status kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusFlags {
    /// The owner forfeits its next turn (the instance is consumed by the skip)
    pub skips_turn: bool,
    /// Removed after the first resolved hit that read it
    pub consumed_on_hit: bool,
    /// Each direct hit on the owner deals `stacks` damage back
    pub reflects: bool,
    /// Gains a stack per tick instead of losing duration
    pub escalating: bool,
}

/// Immutable catalog entry for one status kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDefinition {
    pub id: StatusId,
    pub name: String,
    pub polarity: Polarity,
    pub stacking: StackPolicy,
    pub max_stacks: u32,
    /// `None` means permanent until removed
    #[serde(default)]
    pub default_duration: Option<u32>,
    #[serde(default)]
    pub damage_per_turn: Formula,
    #[serde(default)]
    pub heal_per_turn: Formula,
    #[serde(default)]
    pub damage_boost: Formula,
    #[serde(default)]
    pub block_amount: Formula,
    #[serde(default)]
    pub energy_cost_delta: Formula,
    #[serde(default)]
    pub damage_multiplier: Option<DamageMultiplier>,
    #[serde(default)]
    pub flags: StatusFlags,
}

impl StatusDefinition {
    /// A definition with every formula zeroed, to be filled in with struct update syntax
    pub fn new(id: &str, polarity: Polarity, stacking: StackPolicy, max_stacks: u32) -> Self {
        StatusDefinition {
            id: StatusId::new(id),
            name: id.to_string(),
            polarity,
            stacking,
            max_stacks,
            default_duration: None,
            damage_per_turn: Formula::Zero,
            heal_per_turn: Formula::Zero,
            damage_boost: Formula::Zero,
            block_amount: Formula::Zero,
            energy_cost_delta: Formula::Zero,
            damage_multiplier: None,
            flags: StatusFlags::default(),
        }
    }

    /// Adds flat damage to the owner's attacks
    pub fn is_strength_like(&self) -> bool {
        !self.damage_boost.is_zero()
    }

    /// Absorbs incoming damage
    ///
    /// A shield's stacks are its remaining capacity in damage points.
    pub fn is_shield(&self) -> bool {
        !self.block_amount.is_zero()
    }

    pub fn is_stackable(&self) -> bool {
        self.stacking == StackPolicy::Stackable
    }

    /// Multiplier applied to damage the owner deals (never a consumed-on-hit one)
    pub fn dealt_multiplier(&self) -> Option<f64> {
        match self.damage_multiplier {
            Some(m) if m.scope == MultiplierScope::Dealt && !self.flags.consumed_on_hit => {
                Some(m.factor)
            }
            _ => None,
        }
    }

    /// Multiplier applied to damage the owner takes
    ///
    /// Returns `(factor, consumed_on_hit)`.
    pub fn taken_multiplier(&self) -> Option<(f64, bool)> {
        match self.damage_multiplier {
            Some(m) if m.scope == MultiplierScope::Taken => Some((m.factor, self.flags.consumed_on_hit)),
            _ => None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_stacks == 0 {
            return Err(BattleError::InvalidContent(format!(
                "status {} has max_stacks 0",
                self.id
            )));
        }
        if self.default_duration == Some(0) {
            return Err(BattleError::InvalidContent(format!(
                "status {} has a zero default duration",
                self.id
            )));
        }
        if let Some(m) = self.damage_multiplier {
            if !(m.factor.is_finite() && m.factor >= 0.0) {
                return Err(BattleError::InvalidContent(format!(
                    "status {} has multiplier {}",
                    self.id, m.factor
                )));
            }
            if self.flags.consumed_on_hit && m.scope == MultiplierScope::Dealt {
                return Err(BattleError::InvalidContent(format!(
                    "status {} is consumed on hit but scales damage dealt",
                    self.id
                )));
            }
        }
        if self.is_shield() && self.block_amount != Formula::linear(1) {
            return Err(BattleError::InvalidContent(format!(
                "shield status {} must block one point per stack",
                self.id
            )));
        }
        Ok(())
    }
}

/// Catalog of status definitions keyed by id, in registration order
#[derive(Debug, Clone)]
pub struct StatusRegistry {
    defs: Vec<StatusDefinition>,
    index: FxHashMap<StatusId, usize>,
}

impl StatusRegistry {
    pub fn new(defs: Vec<StatusDefinition>) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (i, def) in defs.iter().enumerate() {
            def.validate()?;
            if index.insert(def.id.clone(), i).is_some() {
                return Err(BattleError::InvalidContent(format!(
                    "status {} registered twice",
                    def.id
                )));
            }
        }
        Ok(StatusRegistry { defs, index })
    }

    /// Registry with the built-in status kinds
    pub fn builtin() -> Self {
        let defs = builtin_statuses();
        let index = defs
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();
        StatusRegistry { defs, index }
    }

    pub fn get(&self, id: &StatusId) -> Result<&StatusDefinition> {
        self.lookup(id)
            .ok_or_else(|| BattleError::UnknownStatus(id.clone()))
    }

    pub fn lookup(&self, id: &StatusId) -> Option<&StatusDefinition> {
        self.index.get(id).map(|&i| &self.defs[i])
    }

    pub fn contains(&self, id: &StatusId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusDefinition> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn definitions(&self) -> &[StatusDefinition] {
        &self.defs
    }
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The built-in status catalog
pub fn builtin_statuses() -> Vec<StatusDefinition> {
    use Polarity::*;
    use StackPolicy::*;

    vec![
        StatusDefinition {
            damage_boost: Formula::linear(3),
            ..StatusDefinition::new(ids::STRENGTH, Buff, Stackable, 20)
        },
        StatusDefinition {
            default_duration: Some(2),
            damage_multiplier: Some(DamageMultiplier {
                factor: 0.75,
                scope: MultiplierScope::Dealt,
            }),
            ..StatusDefinition::new(ids::WEAK, Debuff, RefreshOnly, 1)
        },
        StatusDefinition {
            default_duration: Some(2),
            damage_multiplier: Some(DamageMultiplier {
                factor: 1.5,
                scope: MultiplierScope::Dealt,
            }),
            ..StatusDefinition::new(ids::ENRAGED, Buff, RefreshOnly, 1)
        },
        StatusDefinition {
            default_duration: Some(2),
            damage_multiplier: Some(DamageMultiplier {
                factor: 1.5,
                scope: MultiplierScope::Taken,
            }),
            ..StatusDefinition::new(ids::VULNERABLE, Debuff, RefreshOnly, 1)
        },
        StatusDefinition {
            damage_multiplier: Some(DamageMultiplier {
                factor: 2.0,
                scope: MultiplierScope::Taken,
            }),
            flags: StatusFlags {
                consumed_on_hit: true,
                ..StatusFlags::default()
            },
            ..StatusDefinition::new(ids::MARKED, Debuff, RefreshOnly, 1)
        },
        StatusDefinition {
            damage_multiplier: Some(DamageMultiplier {
                factor: 1.25,
                scope: MultiplierScope::Taken,
            }),
            flags: StatusFlags {
                consumed_on_hit: true,
                ..StatusFlags::default()
            },
            ..StatusDefinition::new(ids::FRAGILE, Debuff, RefreshOnly, 1)
        },
        StatusDefinition {
            block_amount: Formula::linear(1),
            ..StatusDefinition::new(ids::SHIELD, Buff, Stackable, 30)
        },
        StatusDefinition {
            default_duration: Some(3),
            damage_per_turn: Formula::linear(2),
            ..StatusDefinition::new(ids::POISON, Debuff, Stackable, 10)
        },
        StatusDefinition {
            damage_per_turn: Formula::linear(1),
            flags: StatusFlags {
                escalating: true,
                ..StatusFlags::default()
            },
            ..StatusDefinition::new(ids::BURN, Debuff, Stackable, 8)
        },
        StatusDefinition {
            default_duration: Some(3),
            heal_per_turn: Formula::linear(2),
            ..StatusDefinition::new(ids::REGEN, Buff, Stackable, 10)
        },
        StatusDefinition {
            flags: StatusFlags {
                skips_turn: true,
                ..StatusFlags::default()
            },
            ..StatusDefinition::new(ids::STUN, Debuff, RefreshOnly, 1)
        },
        StatusDefinition {
            default_duration: Some(3),
            flags: StatusFlags {
                reflects: true,
                ..StatusFlags::default()
            },
            ..StatusDefinition::new(ids::THORNS, Buff, Stackable, 10)
        },
        StatusDefinition {
            default_duration: Some(2),
            energy_cost_delta: Formula::Constant { value: 1 },
            ..StatusDefinition::new(ids::DRAINED, Debuff, RefreshOnly, 1)
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_eval() {
        assert_eq!(Formula::Zero.eval(5), 0);
        assert_eq!(Formula::Constant { value: 4 }.eval(9), 4);
        assert_eq!(Formula::linear(3).eval(2), 6);
        assert_eq!(
            Formula::Linear {
                base: 1,
                per_stack: 2
            }
            .eval(3),
            7
        );

        let table = Formula::Table {
            values: vec![1, 3, 6],
        };
        assert_eq!(table.eval(0), 0);
        assert_eq!(table.eval(2), 3);
        assert_eq!(table.eval(10), 6);
    }

    #[test]
    fn test_shield_must_block_one_point_per_stack() {
        for block_amount in [
            Formula::linear(2),
            Formula::Constant { value: 10 },
            Formula::Linear {
                base: 3,
                per_stack: 1,
            },
            Formula::Table {
                values: vec![1, 3, 6],
            },
        ] {
            let plate = StatusDefinition {
                block_amount,
                ..StatusDefinition::new("plate", Polarity::Buff, StackPolicy::Stackable, 30)
            };
            assert!(matches!(
                StatusRegistry::new(vec![plate]),
                Err(BattleError::InvalidContent(_))
            ));
        }

        let plate = StatusDefinition {
            block_amount: Formula::linear(1),
            ..StatusDefinition::new("plate", Polarity::Buff, StackPolicy::Stackable, 30)
        };
        assert!(StatusRegistry::new(vec![plate]).is_ok());
    }

    #[test]
    fn test_consumed_on_hit_dealt_multiplier_rejected() {
        let frenzy = StatusDefinition {
            damage_multiplier: Some(DamageMultiplier {
                factor: 2.0,
                scope: MultiplierScope::Dealt,
            }),
            flags: StatusFlags {
                consumed_on_hit: true,
                ..StatusFlags::default()
            },
            ..StatusDefinition::new("frenzy", Polarity::Buff, StackPolicy::RefreshOnly, 1)
        };
        assert!(matches!(
            StatusRegistry::new(vec![frenzy]),
            Err(BattleError::InvalidContent(_))
        ));
    }

    #[test]
    fn test_builtin_registry_lookup() {
        let registry = StatusRegistry::builtin();
        let strength = registry.get(&StatusId::new(ids::STRENGTH)).unwrap();
        assert!(strength.is_strength_like());
        assert_eq!(strength.damage_boost.eval(2), 6);

        let vulnerable = registry.get(&StatusId::new(ids::VULNERABLE)).unwrap();
        assert_eq!(vulnerable.taken_multiplier(), Some((1.5, false)));
        assert_eq!(vulnerable.dealt_multiplier(), None);

        let marked = registry.get(&StatusId::new(ids::MARKED)).unwrap();
        assert_eq!(marked.taken_multiplier(), Some((2.0, true)));

        assert!(registry.get(&StatusId::new("nonexistent")).is_err());
    }

    #[test]
    fn test_builtin_definitions_validate() {
        let registry = StatusRegistry::new(builtin_statuses()).unwrap();
        assert_eq!(registry.len(), StatusRegistry::builtin().len());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut defs = builtin_statuses();
        defs.push(defs[0].clone());
        assert!(matches!(
            StatusRegistry::new(defs),
            Err(BattleError::InvalidContent(_))
        ));
    }

    #[test]
    fn test_definition_json_defaults() {
        let json = r#"{
            "id": "chill",
            "name": "Chill",
            "polarity": "debuff",
            "stacking": "refresh_only",
            "max_stacks": 1,
            "default_duration": 2,
            "damage_multiplier": { "factor": 0.5, "scope": "dealt" }
        }"#;
        let def: StatusDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.dealt_multiplier(), Some(0.5));
        assert!(def.damage_per_turn.is_zero());
        assert!(!def.flags.skips_turn);
    }
}
