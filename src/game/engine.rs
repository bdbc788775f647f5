//! Turn state machine
//!
//! ```text
//! AwaitingFirstTurnDecision
//!     -> TurnBanner{next} -> TurnStartDelay{next} -> PlayerTurn | EnemyTurn
//!     -> TurnBanner{other} -> ...
//!     -> Finished(result)
//! ```
//!
//! Banner and start delay are scheduled continuations; the engine moves
//! through them only as logical time advances.

use crate::core::Side;
use crate::error::InvalidAction;
use crate::game::scheduler::Continuation;
use crate::game::state::TurnFlags;
use crate::game::enemy_ai::EnemyTurnState;
use crate::game::{BattleResult, BattleSession, TurnPhase};
use crate::journal::{BattleEvent, DamageSource};
use crate::zones::DrawOutcome;
use crate::Result;
use rand::Rng;

impl BattleSession {
    /// Flip for the first turn and begin the opening transition
    pub fn start(&mut self) -> Result<Side> {
        match self.phase {
            TurnPhase::AwaitingFirstTurnDecision => {}
            TurnPhase::Finished(_) => return Err(InvalidAction::BattleOver.into()),
            _ => return Err(InvalidAction::AlreadyStarted.into()),
        }

        let first = if self.rng.gen::<f64>() < self.config.first_turn_odds {
            Side::Player
        } else {
            Side::Enemy
        };
        self.journal.log(BattleEvent::BattleStarted { first });
        self.logger.minimal(&format!(
            "Battle: {} vs {} ({} acts first)",
            self.combatants[Side::Player.idx()].name,
            self.combatants[Side::Enemy.idx()].name,
            first
        ));

        self.begin_transition(first);
        self.run_due();
        Ok(first)
    }

    /// Advance logical time by `units`, running clocks and due continuations
    pub fn advance(&mut self, units: u32) {
        self.run_due();
        for _ in 0..units {
            if self.is_over() {
                break;
            }
            self.tick_clock();
            if self.is_over() {
                break;
            }
            self.scheduler.tick();
            self.run_due();
        }
    }

    /// Advance exactly to the next scheduled continuation
    ///
    /// Returns false when nothing is scheduled.
    pub fn advance_to_next_task(&mut self) -> bool {
        match self.scheduler.time_until_next() {
            Some(delay) => {
                self.advance(delay.min(u32::MAX as u64) as u32);
                true
            }
            None => false,
        }
    }

    /// Run every continuation that is due now
    pub(crate) fn run_due(&mut self) {
        while let Some(task) = self.scheduler.pop_due() {
            if task.session != self.id || self.is_over() {
                continue;
            }
            self.run_continuation(task.continuation);
        }
    }

    fn run_continuation(&mut self, continuation: Continuation) {
        match continuation {
            Continuation::BannerElapsed { next } => {
                self.phase = TurnPhase::TurnStartDelay { next };
                self.scheduler.schedule(
                    self.config.turn_start_delay,
                    Continuation::StartDelayElapsed { next },
                );
            }
            Continuation::StartDelayElapsed { next } => self.begin_turn(next),
            Continuation::EnemyAction => self.enemy_act(),
            Continuation::InterruptTimeout => self.expire_interrupt(),
        }
    }

    pub(crate) fn begin_transition(&mut self, next: Side) {
        self.phase = TurnPhase::TurnBanner { next };
        log_if_verbose!(self.logger, Verbose, "--- {} turn ---", next);
        self.scheduler
            .schedule(self.config.banner_duration, Continuation::BannerElapsed { next });
    }

    fn begin_turn(&mut self, side: Side) {
        self.phase = TurnPhase::turn_of(side);
        self.journal.mark_turn();
        self.journal.log(BattleEvent::TurnStarted {
            side,
            turn: self.turn,
        });
        self.combatants[side.idx()].refill_energy();
        log_if_verbose!(
            self.logger,
            Normal,
            "Turn {}: {} ({} health, {} energy)",
            self.turn,
            self.combatants[side.idx()].name,
            self.combatants[side.idx()].health,
            self.combatants[side.idx()].energy
        );

        match side {
            Side::Player => {
                self.flags = TurnFlags::default();
                if self.apply_overtime_penalty() {
                    return;
                }
                let cap = self.hand_cap;
                let outcome = self.piles.draw_up_to(cap, &mut self.rng);
                self.record_draw(&outcome);
                if let Some(status) = self.combatants[side.idx()]
                    .statuses
                    .turn_skipper(&self.registry)
                {
                    self.skip_turn(side, status);
                }
            }
            Side::Enemy => {
                self.enemy_turn = EnemyTurnState::default();
                if let Some(status) = self.combatants[side.idx()]
                    .statuses
                    .turn_skipper(&self.registry)
                {
                    self.skip_turn(side, status);
                    return;
                }
                self.scheduler
                    .schedule(self.config.enemy_action_delay, Continuation::EnemyAction);
            }
        }
    }

    /// Forfeit the turn; the skip consumes the status
    fn skip_turn(&mut self, side: Side, status: crate::core::StatusId) {
        self.combatants[side.idx()].statuses.remove(&status);
        self.journal.log(BattleEvent::TurnSkipped {
            side,
            status: status.clone(),
        });
        log_if_verbose!(self.logger, Normal, "{} skips the turn ({})", side, status);
        match side {
            Side::Player => self.finish_player_turn(),
            Side::Enemy => self.finish_enemy_turn(),
        }
    }

    pub(crate) fn record_draw(&mut self, outcome: &DrawOutcome) {
        if outcome.reshuffled {
            self.journal.log(BattleEvent::Reshuffled);
            log_if_verbose!(self.logger, Verbose, "Discard pile reshuffled into deck");
        }
        for &card_id in &outcome.drawn {
            self.journal.log(BattleEvent::CardDrawn { card_id });
        }
    }

    /// End the player's turn
    pub fn end_turn(&mut self) -> Result<()> {
        self.ensure_player_can_act()?;
        log_if_verbose!(self.logger, Normal, "Player ends turn");
        self.finish_player_turn();
        self.run_due();
        Ok(())
    }

    /// Give up the battle; counts as a defeat
    pub fn concede(&mut self) -> Result<()> {
        if self.is_over() {
            return Err(InvalidAction::BattleOver.into());
        }
        if self.phase == TurnPhase::AwaitingFirstTurnDecision {
            return Err(InvalidAction::NotStarted.into());
        }
        self.logger.normal("Player concedes");
        self.finish(BattleResult::Defeat);
        Ok(())
    }

    /// Status ticks for both sides, then hand over to the enemy
    fn finish_player_turn(&mut self) {
        self.journal.log(BattleEvent::TurnEnded {
            side: Side::Player,
            turn: self.turn,
        });
        if self.resolve_turn_statuses() {
            return;
        }
        self.turn += 1;
        self.begin_transition(Side::Enemy);
    }

    /// Damage and healing over time, then tick both ledgers
    ///
    /// Over-time damage bypasses shields. Returns true if the battle ended.
    fn resolve_turn_statuses(&mut self) -> bool {
        for side in [Side::Player, Side::Enemy] {
            let ledger = &self.combatants[side.idx()].statuses;
            let damage = ledger.turn_damage(&self.registry);
            let healing = ledger.turn_healing(&self.registry);

            if damage > 0 {
                let lost = self.combatants[side.idx()].take_damage(damage);
                self.record_damage(side, lost);
                self.journal.log(BattleEvent::DamageApplied {
                    target: side,
                    amount: lost,
                    blocked: 0,
                    source: DamageSource::StatusTick,
                });
                log_if_verbose!(
                    self.logger,
                    Verbose,
                    "{} suffers {} from statuses",
                    self.combatants[side.idx()].name,
                    lost
                );
                if self.check_defeat(side) {
                    return true;
                }
            }
            if healing > 0 {
                self.heal_side(side, healing);
            }
        }

        for side in [Side::Player, Side::Enemy] {
            let expired = self.combatants[side.idx()].statuses.tick(&self.registry);
            for status in expired {
                self.journal.log(BattleEvent::StatusExpired {
                    target: side,
                    status,
                });
            }
        }
        false
    }

    /// Refuse player input unless it is an open player turn
    pub(crate) fn ensure_player_can_act(&self) -> Result<()> {
        match self.phase {
            TurnPhase::PlayerTurn if self.pending_interrupt.is_none() => Ok(()),
            TurnPhase::PlayerTurn | TurnPhase::EnemyTurn if self.pending_interrupt.is_some() => {
                Err(InvalidAction::InterruptPending.into())
            }
            TurnPhase::PlayerTurn | TurnPhase::EnemyTurn => {
                Err(InvalidAction::NotPlayerTurn.into())
            }
            TurnPhase::TurnBanner { .. } | TurnPhase::TurnStartDelay { .. } => {
                Err(InvalidAction::Blocked(self.phase).into())
            }
            TurnPhase::AwaitingFirstTurnDecision => Err(InvalidAction::NotStarted.into()),
            TurnPhase::Finished(_) => Err(InvalidAction::BattleOver.into()),
        }
    }
}
