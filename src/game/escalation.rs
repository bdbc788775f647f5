//! Time-pressure escalation
//!
//! Each side has a countdown that only runs during its own turn and only
//! outside blocking sub-states. The player's clock drives the escalation
//! stages and overtime; the enemy's clock running out is a timeout win.

use crate::core::Side;
use crate::game::config::StageBuff;
use crate::game::{BattleResult, BattleSession};
use crate::journal::BattleEvent;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStage {
    Early,
    Mid,
    Late,
}

impl fmt::Display for EscalationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscalationStage::Early => write!(f, "early"),
            EscalationStage::Mid => write!(f, "mid"),
            EscalationStage::Late => write!(f, "late"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePressure {
    /// Remaining units, indexed by `Side::idx`
    pub clocks: [u32; 2],
    pub stage: EscalationStage,
    /// Guards so each stage buff fires once per battle
    pub mid_fired: bool,
    pub late_fired: bool,
    pub overtime: bool,
    /// Number of overtime penalties applied so far
    pub overtime_round: u32,
}

impl TimePressure {
    pub fn new(budget: u32) -> Self {
        TimePressure {
            clocks: [budget, budget],
            stage: EscalationStage::Early,
            mid_fired: false,
            late_fired: false,
            overtime: false,
            overtime_round: 0,
        }
    }
}

impl BattleSession {
    /// Run the active side's clock for one unit
    pub(crate) fn tick_clock(&mut self) {
        if self.pending_interrupt.is_some() {
            return;
        }
        let Some(side) = self.phase.active_side() else {
            return;
        };

        let clock = &mut self.pressure.clocks[side.idx()];
        if *clock == 0 {
            return;
        }
        *clock -= 1;
        let remaining = *clock;

        match side {
            Side::Player => {
                self.update_stage(remaining);
                if remaining == 0 && !self.pressure.overtime {
                    self.pressure.overtime = true;
                    self.journal.log(BattleEvent::OvertimeStarted);
                    self.logger.normal("Player clock expired: overtime begins");
                }
            }
            Side::Enemy => {
                if remaining == 0 {
                    self.logger.normal("Enemy clock expired");
                    self.finish(BattleResult::TimeoutVictory);
                }
            }
        }
    }

    fn update_stage(&mut self, remaining: u32) {
        if remaining <= self.config.mid_threshold && !self.pressure.mid_fired {
            self.pressure.mid_fired = true;
            self.enter_stage(EscalationStage::Mid);
        }
        if remaining <= self.config.late_threshold && !self.pressure.late_fired {
            self.pressure.late_fired = true;
            self.enter_stage(EscalationStage::Late);
        }
    }

    fn enter_stage(&mut self, stage: EscalationStage) {
        self.pressure.stage = stage;
        self.journal.log(BattleEvent::StageChanged { stage });
        log_if_verbose!(self.logger, Normal, "Escalation: {} stage", stage);

        let buff = match stage {
            EscalationStage::Early => return,
            EscalationStage::Mid => self.config.mid_buff.clone(),
            EscalationStage::Late => self.config.late_buff.clone(),
        };
        self.grant_stage_buff(&buff);
    }

    /// Set (not add) the buff's stacks on the enemy
    fn grant_stage_buff(&mut self, buff: &StageBuff) {
        let Some(def) = self.registry.lookup(&buff.status) else {
            self.logger
                .normal(&format!("Stage buff {} is not registered", buff.status));
            return;
        };
        let enemy = &mut self.combatants[Side::Enemy.idx()];
        enemy.statuses.supersede(def, buff.stacks, buff.duration);
        let stacks = enemy.statuses.stacks(&def.id);
        self.journal.log(BattleEvent::StatusApplied {
            target: Side::Enemy,
            status: def.id.clone(),
            stacks,
        });
    }

    /// Apply the overtime penalty due at the start of a player turn
    ///
    /// Bypasses shields. Returns true if the battle ended.
    pub(crate) fn apply_overtime_penalty(&mut self) -> bool {
        if !self.pressure.overtime {
            return false;
        }
        self.pressure.overtime_round += 1;
        let round = self.pressure.overtime_round;
        let penalty = self.config.overtime_penalty(round);

        let lost = self.combatants[Side::Player.idx()].take_damage(penalty);
        self.stats.damage_taken += lost as u32;
        self.journal.log(BattleEvent::OvertimePenalty {
            round,
            amount: lost,
        });
        log_if_verbose!(
            self.logger,
            Normal,
            "Overtime round {}: player loses {} health",
            round,
            lost
        );
        self.check_defeat(Side::Player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::ids;
    use crate::core::StatusId;
    use crate::game::test_support::{idle_session, quick_config};
    use crate::game::TurnPhase;

    #[test]
    fn test_player_clock_stages_fire_once() {
        let config = quick_config().with_clock_budget(10).with_thresholds(6, 3);
        let mut s = idle_session(config);
        s.phase = TurnPhase::PlayerTurn;

        for _ in 0..4 {
            s.tick_clock();
        }
        assert_eq!(s.stage(), EscalationStage::Mid);
        let strength = StatusId::new(ids::STRENGTH);
        assert_eq!(s.enemy().statuses.stacks(&strength), 2);

        // Re-entering the threshold range does not re-grant
        s.combatants[1].statuses.remove(&strength);
        s.tick_clock();
        assert!(!s.enemy().statuses.has(&strength));

        for _ in 0..2 {
            s.tick_clock();
        }
        assert_eq!(s.stage(), EscalationStage::Late);
        assert_eq!(s.enemy().statuses.stacks(&strength), 4);
        assert_eq!(
            s.journal
                .count(|e| matches!(e, BattleEvent::StageChanged { .. })),
            2
        );
    }

    #[test]
    fn test_late_supersedes_mid_magnitude() {
        let config = quick_config().with_clock_budget(10).with_thresholds(6, 6);
        let mut s = idle_session(config);
        s.phase = TurnPhase::PlayerTurn;
        for _ in 0..4 {
            s.tick_clock();
        }
        // Both crossed on the same tick: late magnitude wins, not 2 + 4
        assert_eq!(s.stage(), EscalationStage::Late);
        assert_eq!(s.enemy().statuses.stacks(&StatusId::new(ids::STRENGTH)), 4);
    }

    #[test]
    fn test_clock_frozen_outside_turns_and_during_interrupts() {
        let mut s = idle_session(quick_config());
        s.phase = TurnPhase::TurnBanner { next: Side::Player };
        s.tick_clock();
        assert_eq!(s.clock(Side::Player), 120);

        s.phase = TurnPhase::EnemyTurn;
        s.pending_interrupt = Some(crate::game::interrupt::PendingInterrupt::test_value(5));
        s.tick_clock();
        assert_eq!(s.clock(Side::Enemy), 120);

        s.pending_interrupt = None;
        s.tick_clock();
        assert_eq!(s.clock(Side::Enemy), 119);
        assert_eq!(s.clock(Side::Player), 120);
    }

    #[test]
    fn test_enemy_clock_timeout_wins() {
        let mut s = idle_session(quick_config().with_clock_budget(3).with_thresholds(2, 1));
        s.phase = TurnPhase::EnemyTurn;
        for _ in 0..3 {
            s.tick_clock();
        }
        assert_eq!(s.result(), Some(BattleResult::TimeoutVictory));
        assert!(s.scheduler.is_idle());
        assert!(s.reward.is_some());
    }

    #[test]
    fn test_overtime_penalty_scales_by_round() {
        let mut s = idle_session(quick_config().with_clock_budget(2).with_thresholds(1, 0));
        s.phase = TurnPhase::PlayerTurn;
        s.tick_clock();
        s.tick_clock();
        assert!(s.in_overtime());

        let start = s.player().health;
        assert!(!s.apply_overtime_penalty());
        assert!(!s.apply_overtime_penalty());
        assert_eq!(s.player().health, start - 10 - 20);
        assert_eq!(s.overtime_round(), 2);
    }
}
