//! Core battle types and static definitions

pub mod card;
pub mod combatant;
pub mod enemy;
pub mod entity;
pub mod ledger;
pub mod status;
pub mod types;

pub use card::{Card, CardDefinition, CardEffect, CardKind, CounterEffect};
pub use combatant::Combatant;
pub use enemy::{AbilityEffect, CardDrop, EnemyAbility, EnemyDefinition, RewardTable};
pub use entity::{CardId, EntityId, EntityStore, GameEntity};
pub use ledger::{ApplyOutcome, StatusInstance, StatusLedger};
pub use status::{
    DamageMultiplier, Formula, MultiplierScope, Polarity, StackPolicy, StatusDefinition,
    StatusFlags, StatusRegistry,
};
pub use types::{CardName, EnemyName, Side, StatusId, Target};
