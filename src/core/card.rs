//! Card types and definitions

use crate::core::status::ids;
use crate::core::{CardId, CardName, EntityId, GameEntity, StatusId, StatusRegistry, Target};
use crate::{BattleError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Card categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Damage,
    Heal,
    Utility,
    Cleanse,
    Counter,
}

/// What a counter card does to the pending enemy hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CounterEffect {
    /// Discard the hit
    FullBlock,
    /// Discard the hit and send a share of it back
    BlockAndReflect { reflect_percent: u32 },
    /// Take a reduced hit and send a share of the original back
    PartialReduction {
        reduce_percent: u32,
        reflect_percent: u32,
    },
    /// Roll a die with `sides` faces; block fully on `threshold` or higher
    Probabilistic { sides: u32, threshold: u32 },
    /// Discard the hit and gain shield stacks
    BlockAndShield { shield: u32 },
}

/// One step of a card's effect payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum CardEffect {
    /// Attack the enemy `hits` times for `amount` base damage each
    Damage {
        amount: i32,
        #[serde(default = "one")]
        hits: u32,
    },
    Heal {
        amount: i32,
    },
    /// Apply a status; `duration: None` uses the definition's default
    ApplyStatus {
        target: Target,
        status: StatusId,
        stacks: u32,
        #[serde(default)]
        duration: Option<u32>,
    },
    /// Remove one named kind, or every debuff when `status` is absent
    Cleanse {
        #[serde(default)]
        status: Option<StatusId>,
    },
    Draw {
        count: u32,
    },
    GainEnergy {
        amount: i32,
    },
    /// Only resolves inside an interrupt window
    Counter {
        counter: CounterEffect,
    },
}

fn one() -> u32 {
    1
}

/// Static card definition from the content tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub name: CardName,
    pub kind: CardKind,
    pub cost: i32,
    pub effects: SmallVec<[CardEffect; 2]>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

impl CardDefinition {
    pub fn new(name: &str, kind: CardKind, cost: i32, effects: Vec<CardEffect>) -> Self {
        CardDefinition {
            name: CardName::new(name),
            kind,
            cost,
            effects: effects.into(),
            text: String::new(),
        }
    }

    /// Create a card instance with the given ID
    pub fn instantiate(&self, id: CardId) -> Card {
        Card {
            id,
            definition: self.clone(),
        }
    }

    /// Check references and shape against a status registry
    pub fn validate(&self, registry: &StatusRegistry) -> Result<()> {
        if self.cost < 0 {
            return Err(BattleError::InvalidContent(format!(
                "card {} has negative cost",
                self.name
            )));
        }
        if self.effects.is_empty() {
            return Err(BattleError::InvalidContent(format!(
                "card {} has no effects",
                self.name
            )));
        }

        let counters = self
            .effects
            .iter()
            .filter(|e| matches!(e, CardEffect::Counter { .. }))
            .count();
        match (self.kind, counters) {
            (CardKind::Counter, 1) => {}
            (CardKind::Counter, _) => {
                return Err(BattleError::InvalidContent(format!(
                    "counter card {} needs exactly one counter effect",
                    self.name
                )))
            }
            (_, 0) => {}
            (_, _) => {
                return Err(BattleError::InvalidContent(format!(
                    "card {} carries a counter effect but is not a counter",
                    self.name
                )))
            }
        }

        for effect in &self.effects {
            match effect {
                CardEffect::ApplyStatus { status, .. } => {
                    registry.get(status)?;
                }
                CardEffect::Cleanse {
                    status: Some(status),
                } => {
                    registry.get(status)?;
                }
                CardEffect::Counter {
                    counter: CounterEffect::BlockAndShield { .. },
                } => {
                    let shield = registry.get(&StatusId::new(ids::SHIELD))?;
                    if !shield.is_shield() {
                        return Err(BattleError::InvalidContent(format!(
                            "card {} grants {} but it blocks nothing",
                            self.name, shield.id
                        )));
                    }
                }
                CardEffect::Counter {
                    counter: CounterEffect::Probabilistic { sides, threshold },
                } if *sides == 0 || *threshold == 0 => {
                    return Err(BattleError::InvalidContent(format!(
                        "card {} has an empty die",
                        self.name
                    )));
                }
                CardEffect::Damage { amount, .. } | CardEffect::Heal { amount } if *amount < 0 => {
                    return Err(BattleError::InvalidContent(format!(
                        "card {} has a negative amount",
                        self.name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// A physical card during a battle
///
/// Many cards can share one definition; each copy has its own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub definition: CardDefinition,
}

impl Card {
    pub fn kind(&self) -> CardKind {
        self.definition.kind
    }

    pub fn cost(&self) -> i32 {
        self.definition.cost
    }

    pub fn is_counter(&self) -> bool {
        self.definition.kind == CardKind::Counter
    }

    /// The counter payload, if this is a counter card
    pub fn counter_effect(&self) -> Option<&CounterEffect> {
        self.definition.effects.iter().find_map(|e| match e {
            CardEffect::Counter { counter } => Some(counter),
            _ => None,
        })
    }
}

impl GameEntity for Card {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        self.definition.name.as_str()
    }
}
