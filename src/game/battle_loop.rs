//! Battle loop
//!
//! Drives a session with a player controller: starts it, asks the controller
//! for actions and counter answers, and lets logical time run through
//! banners, delays and the enemy's paced turn.

use crate::game::controller::{BattleView, InterruptResponse, PlayerController};
use crate::game::{BattleReport, BattleSession, PlayerAction, TurnPhase, VerbosityLevel};
use crate::{BattleError, Result};

/// Controller decisions allowed in one player turn before it is ended for them
const MAX_ACTIONS_PER_TURN: u32 = 64;

pub struct BattleLoop<'a> {
    pub session: &'a mut BattleSession,
    /// Turns before the player concedes
    max_turns: u32,
    /// Logical time each player decision takes
    think_time: u32,
    /// Print only the last lines of the log once the battle ends
    log_tail: Option<usize>,
}

impl<'a> BattleLoop<'a> {
    pub fn new(session: &'a mut BattleSession) -> Self {
        BattleLoop {
            session,
            max_turns: 200,
            think_time: 2,
            log_tail: None,
        }
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_think_time(mut self, units: u32) -> Self {
        self.think_time = units;
        self
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.session.logger.set_verbosity(verbosity);
        self
    }

    /// Capture the log and print only its last `lines` at the end
    pub fn with_log_tail(mut self, lines: usize) -> Self {
        self.session.logger.enable_capture();
        self.log_tail = Some(lines);
        self
    }

    /// Run the battle to a terminal result
    pub fn run(&mut self, controller: &mut dyn PlayerController) -> Result<BattleReport> {
        if self.session.phase() == TurnPhase::AwaitingFirstTurnDecision {
            self.session.start()?;
        }

        let mut actions_this_turn = 0u32;
        let mut turn_seen = self.session.turn();

        while !self.session.is_over() {
            if self.session.turn() > self.max_turns {
                self.session
                    .logger
                    .normal(&format!("Turn limit {} reached", self.max_turns));
                self.session.concede()?;
                break;
            }
            if self.session.turn() != turn_seen {
                turn_seen = self.session.turn();
                actions_this_turn = 0;
            }

            if self.session.pending_interrupt().is_some() {
                self.answer_interrupt(controller)?;
                continue;
            }

            match self.session.phase() {
                TurnPhase::PlayerTurn => {
                    actions_this_turn += 1;
                    self.player_decision(controller, actions_this_turn)?;
                }
                _ => {
                    if !self.session.advance_to_next_task() {
                        self.session.advance(1);
                    }
                }
            }
        }

        let result = self
            .session
            .result()
            .ok_or_else(|| BattleError::InvariantViolation("loop left a live battle".into()))?;
        controller.on_battle_end(&BattleView::new(self.session), result);
        match self.log_tail {
            Some(lines) => self.session.logger.flush_tail(lines),
            None => self.session.logger.flush_buffer(),
        }
        self.session
            .report()
            .ok_or_else(|| BattleError::InvariantViolation("finished battle has no report".into()))
    }

    fn player_decision(
        &mut self,
        controller: &mut dyn PlayerController,
        actions_this_turn: u32,
    ) -> Result<()> {
        let available = self.session.available_actions();
        let action = if actions_this_turn > MAX_ACTIONS_PER_TURN {
            PlayerAction::EndTurn
        } else {
            let view = BattleView::new(self.session);
            controller
                .choose_action(&view, &available)
                .unwrap_or(PlayerAction::EndTurn)
        };
        self.session
            .logger
            .decision(&format!("{action:?}"));

        self.session.advance(self.think_time);
        if self.session.is_over() || self.session.phase() != TurnPhase::PlayerTurn {
            return Ok(());
        }

        match self.session.apply_action(action) {
            Ok(()) => Ok(()),
            Err(err) if err.is_rejection() => {
                self.session
                    .logger
                    .normal(&format!("{} rejected: {}", controller.name(), err));
                self.session.end_turn()
            }
            Err(err) => Err(err),
        }
    }

    fn answer_interrupt(&mut self, controller: &mut dyn PlayerController) -> Result<()> {
        let counters = self.session.counter_cards();
        let response = {
            let view = BattleView::new(self.session);
            controller.respond_to_interrupt(&view, &counters)
        };
        self.session
            .logger
            .decision(&format!("{response:?}"));

        match response {
            InterruptResponse::Play(card_id) => {
                match self.session.respond_to_interrupt(Some(card_id)) {
                    Ok(()) => Ok(()),
                    Err(err) if err.is_rejection() => {
                        self.session
                            .logger
                            .normal(&format!("{} rejected: {}", controller.name(), err));
                        self.session.respond_to_interrupt(None)
                    }
                    Err(err) => Err(err),
                }
            }
            InterruptResponse::Skip => self.session.respond_to_interrupt(None),
            InterruptResponse::Wait => {
                self.session.advance(self.think_time.max(1));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Side;
    use crate::game::controllers::{RandomController, ScriptedController};
    use crate::game::test_support::{idle_session, quick_config};
    use crate::game::BattleResult;

    #[test]
    fn test_random_battle_terminates() {
        for seed in 0..10 {
            let mut session = idle_session(quick_config());
            let mut controller = RandomController::with_seed(seed);
            let report = BattleLoop::new(&mut session)
                .with_verbosity(VerbosityLevel::Silent)
                .run(&mut controller)
                .unwrap();
            assert!(report.turns >= 1);
            session.check_invariants().unwrap();
        }
    }

    #[test]
    fn test_turn_limit_concedes() {
        let mut session = idle_session(quick_config());
        session.combatants[Side::Enemy.idx()].max_energy = 0;
        let mut controller = ScriptedController::new(vec![]);
        let report = BattleLoop::new(&mut session)
            .with_max_turns(3)
            .with_verbosity(VerbosityLevel::Silent)
            .run(&mut controller)
            .unwrap();
        assert_eq!(report.result, BattleResult::Defeat);
        assert!(report.reward.is_none());
    }

    #[test]
    fn test_waiting_lets_windows_time_out() {
        let mut session = idle_session(quick_config().with_counter_window(4));
        let mut controller =
            ScriptedController::new(vec![]).with_responses(vec![InterruptResponse::Wait; 100]);
        BattleLoop::new(&mut session)
            .with_max_turns(4)
            .with_verbosity(VerbosityLevel::Silent)
            .run(&mut controller)
            .unwrap();
        assert_eq!(
            session.journal.count(|e| matches!(
                e,
                crate::journal::BattleEvent::InterruptResolved {
                    resolution: crate::journal::InterruptResolution::Countered(_)
                }
            )),
            0
        );
    }
}
