//! Battle tuning knobs
//!
//! All timings are logical time units; the engine never reads a wall clock.

use crate::core::status::ids;
use crate::core::{StatusId, StatusRegistry};
use crate::{BattleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A status granted to the enemy when an escalation stage begins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageBuff {
    pub status: StatusId,
    pub stacks: u32,
    #[serde(default)]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Start-of-turn draws fill the hand up to this many cards
    pub hand_size_cap: usize,
    /// Maximum abilities an enemy executes per turn
    pub enemy_action_cap: u32,
    /// Length of an interrupt window
    pub counter_window: u32,
    /// Starting value of each side's countdown clock
    pub clock_budget: u32,
    /// Player clock value at or below which the mid stage begins
    pub mid_threshold: u32,
    /// Player clock value at or below which the late stage begins
    pub late_threshold: u32,
    pub banner_duration: u32,
    pub turn_start_delay: u32,
    /// Pause between consecutive enemy abilities
    pub enemy_action_delay: u32,
    /// Overtime penalty per round index
    pub overtime_base: i32,
    /// Largest single overtime penalty, `None` for unbounded
    pub overtime_cap: Option<i32>,
    pub mid_buff: StageBuff,
    pub late_buff: StageBuff,
    /// Probability that the player acts first
    pub first_turn_odds: f64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        BattleConfig {
            hand_size_cap: 5,
            enemy_action_cap: 10,
            counter_window: 15,
            clock_budget: 120,
            mid_threshold: 60,
            late_threshold: 30,
            banner_duration: 2,
            turn_start_delay: 1,
            enemy_action_delay: 1,
            overtime_base: 10,
            overtime_cap: None,
            mid_buff: StageBuff {
                status: StatusId::new(ids::STRENGTH),
                stacks: 2,
                duration: None,
            },
            late_buff: StageBuff {
                status: StatusId::new(ids::STRENGTH),
                stacks: 4,
                duration: None,
            },
            first_turn_odds: 0.5,
        }
    }
}

impl BattleConfig {
    pub fn with_hand_size_cap(mut self, cap: usize) -> Self {
        self.hand_size_cap = cap;
        self
    }

    pub fn with_clock_budget(mut self, budget: u32) -> Self {
        self.clock_budget = budget;
        self
    }

    pub fn with_thresholds(mut self, mid: u32, late: u32) -> Self {
        self.mid_threshold = mid;
        self.late_threshold = late;
        self
    }

    pub fn with_counter_window(mut self, window: u32) -> Self {
        self.counter_window = window;
        self
    }

    /// Zero out every presentation delay (banner, start delay, enemy pause)
    pub fn without_delays(mut self) -> Self {
        self.banner_duration = 0;
        self.turn_start_delay = 0;
        self.enemy_action_delay = 0;
        self
    }

    pub fn with_overtime_cap(mut self, cap: Option<i32>) -> Self {
        self.overtime_cap = cap;
        self
    }

    pub fn with_first_turn_odds(mut self, odds: f64) -> Self {
        self.first_turn_odds = odds;
        self
    }

    /// Overtime penalty for the given round (1-based)
    pub fn overtime_penalty(&self, round: u32) -> i32 {
        let raw = self.overtime_base.saturating_mul(round as i32);
        match self.overtime_cap {
            Some(cap) => raw.min(cap),
            None => raw,
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: BattleConfig = serde_json::from_str(&json)?;
        Ok(config)
    }

    pub fn validate(&self, registry: &StatusRegistry) -> Result<()> {
        if self.late_threshold > self.mid_threshold || self.mid_threshold > self.clock_budget {
            return Err(BattleError::InvalidContent(format!(
                "thresholds must satisfy late {} <= mid {} <= budget {}",
                self.late_threshold, self.mid_threshold, self.clock_budget
            )));
        }
        if !(0.0..=1.0).contains(&self.first_turn_odds) {
            return Err(BattleError::InvalidContent(format!(
                "first turn odds {} outside 0..=1",
                self.first_turn_odds
            )));
        }
        if self.hand_size_cap == 0 {
            return Err(BattleError::InvalidContent(
                "hand size cap must be positive".to_string(),
            ));
        }
        registry.get(&self.mid_buff.status)?;
        registry.get(&self.late_buff.status)?;
        Ok(())
    }
}
