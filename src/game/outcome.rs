//! Battle results, statistics and rewards

use crate::core::{CardName, RewardTable};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    Victory,
    Defeat,
    /// The enemy ran out of time during its own turn
    TimeoutVictory,
}

impl BattleResult {
    pub fn is_win(self) -> bool {
        !matches!(self, BattleResult::Defeat)
    }
}

impl fmt::Display for BattleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleResult::Victory => write!(f, "victory"),
            BattleResult::Defeat => write!(f, "defeat"),
            BattleResult::TimeoutVictory => write!(f, "timeout-victory"),
        }
    }
}

/// Counters accumulated over a battle (or a whole profile)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub cards_played: u32,
    pub enemies_defeated: u32,
}

impl RunStatistics {
    pub fn merge(&mut self, other: &RunStatistics) {
        self.damage_dealt += other.damage_dealt;
        self.damage_taken += other.damage_taken;
        self.cards_played += other.cards_played;
        self.enemies_defeated += other.enemies_defeated;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub gold: u32,
    pub xp: u32,
    pub card: Option<CardName>,
}

impl Reward {
    /// Roll a reward from an enemy's table
    pub fn roll(table: &RewardTable, rng: &mut impl Rng) -> Reward {
        let gold = rng.gen_range(table.gold_min..=table.gold_max);

        let total: u32 = table.drops.iter().map(|d| d.weight).sum();
        let card = if total > 0 && rng.gen_bool(table.drop_chance) {
            let r = rng.gen_range(0..total);
            let mut cumulative = 0;
            table
                .drops
                .iter()
                .find(|d| {
                    cumulative += d.weight;
                    cumulative > r
                })
                .map(|d| d.card.clone())
        } else {
            None
        };

        Reward {
            gold,
            xp: table.xp,
            card,
        }
    }
}

/// Everything the profile collaborator needs once a battle ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub result: BattleResult,
    pub final_player_health: i32,
    pub turns: u32,
    pub stats: RunStatistics,
    pub reward: Option<Reward>,
}

impl fmt::Display for BattleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        writeln!(f, "Turns: {}", self.turns)?;
        writeln!(f, "Final health: {}", self.final_player_health)?;
        writeln!(
            f,
            "Damage dealt/taken: {}/{}",
            self.stats.damage_dealt, self.stats.damage_taken
        )?;
        write!(f, "Cards played: {}", self.stats.cards_played)?;
        if let Some(reward) = &self.reward {
            write!(f, "\nReward: {} gold, {} xp", reward.gold, reward.xp)?;
            if let Some(card) = &reward.card {
                write!(f, ", card {}", card)?;
            }
        }
        Ok(())
    }
}
