//! Enemy definitions: ability tables and reward tables

use crate::core::{CardName, EnemyName, StatusId, StatusRegistry, Target};
use crate::{BattleError, Result};
use serde::{Deserialize, Serialize};

/// What an enemy ability does when executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum AbilityEffect {
    /// One hit rolled uniformly from `min..=max`
    Damage { min: i32, max: i32 },
    /// `hits` separate hits, each rolled from `min..=max`
    MultiHit { min: i32, max: i32, hits: u32 },
    ApplyStatus {
        target: Target,
        status: StatusId,
        stacks: u32,
        #[serde(default)]
        duration: Option<u32>,
    },
    SelfHeal { amount: i32 },
    /// Sub-actions executed in order
    Composite { steps: Vec<AbilityEffect> },
}

impl AbilityEffect {
    /// Whether executing this effect may hit the opponent directly
    pub fn deals_damage(&self) -> bool {
        match self {
            AbilityEffect::Damage { .. } | AbilityEffect::MultiHit { .. } => true,
            AbilityEffect::Composite { steps } => steps.iter().any(|s| s.deals_damage()),
            _ => false,
        }
    }

    fn validate(&self, owner: &EnemyName, registry: &StatusRegistry) -> Result<()> {
        match self {
            AbilityEffect::Damage { min, max } | AbilityEffect::MultiHit { min, max, .. } => {
                if *min < 0 || min > max {
                    return Err(BattleError::InvalidContent(format!(
                        "enemy {owner} has damage range {min}..={max}"
                    )));
                }
            }
            AbilityEffect::ApplyStatus { status, .. } => {
                registry.get(status)?;
            }
            AbilityEffect::SelfHeal { amount } if *amount < 0 => {
                return Err(BattleError::InvalidContent(format!(
                    "enemy {owner} heals a negative amount"
                )));
            }
            AbilityEffect::SelfHeal { .. } => {}
            AbilityEffect::Composite { steps } => {
                for step in steps {
                    step.validate(owner, registry)?;
                }
            }
        }
        Ok(())
    }
}

/// One row of an enemy's ability table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyAbility {
    pub name: String,
    pub cost: i32,
    pub weight: u32,
    pub effect: AbilityEffect,
}

impl EnemyAbility {
    pub fn new(name: &str, cost: i32, weight: u32, effect: AbilityEffect) -> Self {
        EnemyAbility {
            name: name.to_string(),
            cost,
            weight,
            effect,
        }
    }
}

/// A card that may drop after a won battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDrop {
    pub card: CardName,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTable {
    pub gold_min: u32,
    pub gold_max: u32,
    pub xp: u32,
    /// Probability in `0.0..=1.0` that any card drops
    #[serde(default)]
    pub drop_chance: f64,
    #[serde(default)]
    pub drops: Vec<CardDrop>,
}

impl Default for RewardTable {
    fn default() -> Self {
        RewardTable {
            gold_min: 10,
            gold_max: 20,
            xp: 10,
            drop_chance: 0.0,
            drops: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub name: EnemyName,
    pub max_health: i32,
    pub max_energy: i32,
    pub abilities: Vec<EnemyAbility>,
    #[serde(default)]
    pub reward: RewardTable,
}

impl EnemyDefinition {
    pub fn validate(&self, registry: &StatusRegistry) -> Result<()> {
        if self.max_health <= 0 || self.max_energy < 0 {
            return Err(BattleError::InvalidContent(format!(
                "enemy {} has health {} and energy {}",
                self.name, self.max_health, self.max_energy
            )));
        }
        for ability in &self.abilities {
            if ability.cost <= 0 {
                return Err(BattleError::InvalidContent(format!(
                    "enemy {} ability {} must cost at least 1",
                    self.name, ability.name
                )));
            }
            ability.effect.validate(&self.name, registry)?;
        }
        let reward = &self.reward;
        if reward.gold_min > reward.gold_max || !(0.0..=1.0).contains(&reward.drop_chance) {
            return Err(BattleError::InvalidContent(format!(
                "enemy {} has a malformed reward table",
                self.name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::ids;

    fn brute() -> EnemyDefinition {
        EnemyDefinition {
            name: EnemyName::new("Brute"),
            max_health: 40,
            max_energy: 3,
            abilities: vec![
                EnemyAbility::new("Smash", 2, 60, AbilityEffect::Damage { min: 6, max: 9 }),
                EnemyAbility::new(
                    "Hex",
                    1,
                    40,
                    AbilityEffect::ApplyStatus {
                        target: Target::Opponent,
                        status: StatusId::new(ids::WEAK),
                        stacks: 1,
                        duration: None,
                    },
                ),
            ],
            reward: RewardTable::default(),
        }
    }

    #[test]
    fn test_validate_enemy() {
        let registry = StatusRegistry::builtin();
        brute().validate(&registry).unwrap();

        let mut broken = brute();
        broken.abilities[0].effect = AbilityEffect::Damage { min: 9, max: 6 };
        assert!(broken.validate(&registry).is_err());

        let mut free = brute();
        free.abilities[1].cost = 0;
        assert!(free.validate(&registry).is_err());
    }

    #[test]
    fn test_deals_damage() {
        let composite = AbilityEffect::Composite {
            steps: vec![
                AbilityEffect::SelfHeal { amount: 3 },
                AbilityEffect::MultiHit {
                    min: 1,
                    max: 2,
                    hits: 3,
                },
            ],
        };
        assert!(composite.deals_damage());
        assert!(!AbilityEffect::SelfHeal { amount: 3 }.deals_damage());
    }
}
