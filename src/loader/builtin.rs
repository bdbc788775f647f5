//! Built-in cards, enemies and starter deck

use crate::core::status::{builtin_statuses, ids};
use crate::core::{
    AbilityEffect, CardDefinition, CardDrop, CardEffect, CardKind, CardName, CounterEffect,
    EnemyAbility, EnemyDefinition, EnemyName, RewardTable, StatusId, Target,
};
use crate::loader::{ContentTables, DeckEntry, DeckList};

fn card(name: &str, kind: CardKind, cost: i32, effect: CardEffect, text: &str) -> CardDefinition {
    CardDefinition {
        text: text.to_string(),
        ..CardDefinition::new(name, kind, cost, vec![effect])
    }
}

fn status(target: Target, id: &str, stacks: u32) -> CardEffect {
    CardEffect::ApplyStatus {
        target,
        status: StatusId::new(id),
        stacks,
        duration: None,
    }
}

fn counter(name: &str, cost: i32, effect: CounterEffect, text: &str) -> CardDefinition {
    card(
        name,
        CardKind::Counter,
        cost,
        CardEffect::Counter { counter: effect },
        text,
    )
}

pub fn cards() -> Vec<CardDefinition> {
    use CardKind::*;

    vec![
        card("Strike", Damage, 1, CardEffect::Damage { amount: 6, hits: 1 }, "Deal 6 damage."),
        card(
            "Heavy Blow",
            Damage,
            2,
            CardEffect::Damage { amount: 12, hits: 1 },
            "Deal 12 damage.",
        ),
        card(
            "Twin Slash",
            Damage,
            1,
            CardEffect::Damage { amount: 4, hits: 2 },
            "Deal 4 damage twice.",
        ),
        card("Bandage", Heal, 1, CardEffect::Heal { amount: 6 }, "Heal 6."),
        card(
            "Guard",
            Utility,
            1,
            status(Target::User, ids::SHIELD, 8),
            "Gain 8 shield.",
        ),
        card(
            "Battle Cry",
            Utility,
            1,
            status(Target::User, ids::STRENGTH, 1),
            "Gain 1 strength.",
        ),
        card(
            "Expose",
            Utility,
            1,
            status(Target::Opponent, ids::VULNERABLE, 1),
            "Apply vulnerable.",
        ),
        card(
            "Mark Target",
            Utility,
            0,
            status(Target::Opponent, ids::MARKED, 1),
            "The next hit on the enemy deals double damage.",
        ),
        card(
            "Toxin",
            Utility,
            1,
            status(Target::Opponent, ids::POISON, 3),
            "Apply 3 poison.",
        ),
        card(
            "Purify",
            Cleanse,
            1,
            CardEffect::Cleanse { status: None },
            "Remove every debuff.",
        ),
        card("Focus", Utility, 0, CardEffect::Draw { count: 2 }, "Draw 2 cards."),
        card(
            "Second Wind",
            Utility,
            0,
            CardEffect::GainEnergy { amount: 1 },
            "Gain 1 energy.",
        ),
        counter("Parry", 1, CounterEffect::FullBlock, "Block an incoming hit."),
        counter(
            "Riposte",
            1,
            CounterEffect::BlockAndReflect {
                reflect_percent: 50,
            },
            "Block an incoming hit and return half of it.",
        ),
        counter(
            "Deflect",
            0,
            CounterEffect::PartialReduction {
                reduce_percent: 50,
                reflect_percent: 25,
            },
            "Halve an incoming hit and return a quarter of it.",
        ),
        counter(
            "Gamble",
            0,
            CounterEffect::Probabilistic {
                sides: 6,
                threshold: 4,
            },
            "Roll a die: on 4 or more the hit is blocked.",
        ),
        counter(
            "Bulwark",
            1,
            CounterEffect::BlockAndShield { shield: 5 },
            "Block an incoming hit and gain 5 shield.",
        ),
    ]
}

fn apply(target: Target, id: &str, stacks: u32) -> AbilityEffect {
    AbilityEffect::ApplyStatus {
        target,
        status: StatusId::new(id),
        stacks,
        duration: None,
    }
}

fn drops(names: &[(&str, u32)]) -> Vec<CardDrop> {
    names
        .iter()
        .map(|&(card, weight)| CardDrop {
            card: CardName::new(card),
            weight,
        })
        .collect()
}

pub fn enemies() -> Vec<EnemyDefinition> {
    vec![
        EnemyDefinition {
            name: EnemyName::new("Slime"),
            max_health: 30,
            max_energy: 2,
            abilities: vec![
                EnemyAbility::new("Tackle", 1, 70, AbilityEffect::Damage { min: 4, max: 6 }),
                EnemyAbility::new("Goo", 1, 30, apply(Target::Opponent, ids::WEAK, 1)),
            ],
            reward: RewardTable {
                gold_min: 8,
                gold_max: 15,
                xp: 5,
                drop_chance: 0.25,
                drops: drops(&[("Twin Slash", 2), ("Bandage", 1)]),
            },
        },
        EnemyDefinition {
            name: EnemyName::new("Goblin"),
            max_health: 45,
            max_energy: 3,
            abilities: vec![
                EnemyAbility::new("Stab", 1, 50, AbilityEffect::Damage { min: 5, max: 8 }),
                EnemyAbility::new(
                    "Flurry",
                    2,
                    30,
                    AbilityEffect::MultiHit {
                        min: 2,
                        max: 3,
                        hits: 3,
                    },
                ),
                EnemyAbility::new(
                    "Taunt",
                    1,
                    20,
                    AbilityEffect::Composite {
                        steps: vec![
                            apply(Target::User, ids::ENRAGED, 1),
                            apply(Target::Opponent, ids::FRAGILE, 1),
                        ],
                    },
                ),
            ],
            reward: RewardTable {
                gold_min: 15,
                gold_max: 25,
                xp: 12,
                drop_chance: 0.35,
                drops: drops(&[("Riposte", 1), ("Battle Cry", 2)]),
            },
        },
        EnemyDefinition {
            name: EnemyName::new("Troll"),
            max_health: 80,
            max_energy: 3,
            abilities: vec![
                EnemyAbility::new("Smash", 2, 50, AbilityEffect::Damage { min: 9, max: 14 }),
                EnemyAbility::new("Regenerate", 1, 25, apply(Target::User, ids::REGEN, 3)),
                EnemyAbility::new("Thorny Hide", 1, 25, apply(Target::User, ids::THORNS, 3)),
            ],
            reward: RewardTable {
                gold_min: 30,
                gold_max: 45,
                xp: 25,
                drop_chance: 0.5,
                drops: drops(&[("Heavy Blow", 2), ("Bulwark", 1)]),
            },
        },
        EnemyDefinition {
            name: EnemyName::new("Hexer"),
            max_health: 50,
            max_energy: 3,
            abilities: vec![
                EnemyAbility::new("Bolt", 2, 40, AbilityEffect::Damage { min: 6, max: 9 }),
                EnemyAbility::new("Drain", 1, 25, apply(Target::Opponent, ids::DRAINED, 1)),
                EnemyAbility::new("Curse", 1, 25, apply(Target::Opponent, ids::VULNERABLE, 1)),
                EnemyAbility::new("Stun Gaze", 3, 10, apply(Target::Opponent, ids::STUN, 1)),
            ],
            reward: RewardTable {
                gold_min: 20,
                gold_max: 30,
                xp: 18,
                drop_chance: 0.4,
                drops: drops(&[("Purify", 2), ("Gamble", 1)]),
            },
        },
    ]
}

pub fn starter_deck() -> DeckList {
    DeckList::new(vec![
        DeckEntry::new("Strike", 4),
        DeckEntry::new("Heavy Blow", 2),
        DeckEntry::new("Guard", 2),
        DeckEntry::new("Bandage", 1),
        DeckEntry::new("Expose", 1),
        DeckEntry::new("Focus", 1),
        DeckEntry::new("Parry", 1),
        DeckEntry::new("Riposte", 1),
    ])
}

pub fn content() -> ContentTables {
    ContentTables {
        statuses: builtin_statuses(),
        cards: cards(),
        enemies: enemies(),
        starter_deck: Some(starter_deck()),
    }
}
