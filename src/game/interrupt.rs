//! Interrupt (counter) windows
//!
//! When the enemy is about to hit and the player holds a counter card, the
//! hit is resolved against the current ledgers and parked. The window closes
//! when the player plays a counter, skips, or the countdown runs out; until
//! then the enemy sequence and both clocks are held.

use crate::core::status::ids;
use crate::core::{Card, CardId, CounterEffect, Side, StatusId};
use crate::error::{InvalidAction, Shortfall};
use crate::game::damage::DamageResolution;
use crate::game::scheduler::{Continuation, TaskKind};
use crate::game::BattleSession;
use crate::journal::{BattleEvent, DamageSource, InterruptResolution};
use crate::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A parked enemy hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInterrupt {
    /// Damage after multipliers, before shields
    pub amount: i32,
    /// Statuses the hit consumes if it lands
    pub consumed: Vec<StatusId>,
    /// Name of the enemy ability
    pub source: String,
    pub opened_at: u64,
}

impl PendingInterrupt {
    fn resolution(&self) -> DamageResolution {
        DamageResolution {
            amount: self.amount,
            consumed: self.consumed.iter().cloned().collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn test_value(amount: i32) -> Self {
        PendingInterrupt {
            amount,
            consumed: Vec::new(),
            source: "test".to_string(),
            opened_at: 0,
        }
    }
}

fn percent(amount: i32, pct: u32) -> i32 {
    amount.saturating_mul(pct as i32) / 100
}

impl BattleSession {
    /// Whether the next enemy hit should open a window
    pub(crate) fn interrupt_available(&self) -> bool {
        self.pending_interrupt.is_none()
            && !self.enemy_turn.counter_used
            && self.hand().iter().any(|&id| {
                self.cards
                    .get(id)
                    .map(|card| card.is_counter())
                    .unwrap_or(false)
            })
    }

    pub(crate) fn open_interrupt(&mut self, resolution: DamageResolution, source: String) {
        let pending = PendingInterrupt {
            amount: resolution.amount,
            consumed: resolution.consumed.into_vec(),
            source,
            opened_at: self.scheduler.now(),
        };
        self.journal.log(BattleEvent::InterruptOpened {
            pending: pending.amount,
        });
        log_if_verbose!(
            self.logger,
            Normal,
            "{} incoming for {}: counter window open",
            pending.source,
            pending.amount
        );
        self.pending_interrupt = Some(pending);
        self.scheduler
            .schedule(self.config.counter_window, Continuation::InterruptTimeout);
    }

    /// Counter cards currently in hand
    pub fn counter_cards(&self) -> Vec<CardId> {
        self.hand()
            .iter()
            .copied()
            .filter(|&id| self.cards.get(id).map(Card::is_counter).unwrap_or(false))
            .collect()
    }

    /// Units left before the open window times out
    pub fn interrupt_remaining(&self) -> Option<u64> {
        self.pending_interrupt.as_ref()?;
        self.scheduler.remaining(TaskKind::Interrupt)
    }

    /// Answer the open window with a counter card, or `None` to skip
    pub fn respond_to_interrupt(&mut self, response: Option<CardId>) -> Result<()> {
        if self.is_over() {
            return Err(InvalidAction::BattleOver.into());
        }
        if self.pending_interrupt.is_none() {
            return Err(InvalidAction::NoInterruptWindow.into());
        }

        match response {
            None => self.close_interrupt_unmodified(InterruptResolution::Skipped),
            Some(card_id) => {
                if !self.piles.hand.contains(card_id) {
                    return Err(InvalidAction::CardNotInHand(card_id).into());
                }
                let card = self.cards.get(card_id)?.clone();
                let Some(counter) = card.counter_effect().cloned() else {
                    return Err(InvalidAction::NotACounter(card_id).into());
                };
                let cost = self.effective_cost(&card);
                let player = &mut self.combatants[Side::Player.idx()];
                if !player.try_spend_energy(cost) {
                    return Err(Shortfall::Energy {
                        needed: cost,
                        available: player.energy,
                    }
                    .into());
                }

                self.piles.discard_from_hand(card_id);
                self.stats.cards_played += 1;
                self.enemy_turn.counter_used = true;
                self.journal.log(BattleEvent::CardPlayed { card_id, cost });
                self.scheduler.cancel(TaskKind::Interrupt);

                if let Some(pending) = self.pending_interrupt.take() {
                    log_if_verbose!(
                        self.logger,
                        Normal,
                        "Player counters {} with {}",
                        pending.source,
                        card.definition.name
                    );
                    self.apply_counter(&pending, &counter);
                }
                self.journal.log(BattleEvent::InterruptResolved {
                    resolution: InterruptResolution::Countered(card_id),
                });
            }
        }

        self.resume_enemy_sequence();
        self.run_due();
        Ok(())
    }

    /// The window ran out
    pub(crate) fn expire_interrupt(&mut self) {
        if self.pending_interrupt.is_none() {
            return;
        }
        log_if_verbose!(self.logger, Verbose, "Counter window expired");
        self.close_interrupt_unmodified(InterruptResolution::TimedOut);
        self.resume_enemy_sequence();
    }

    /// Land the parked hit exactly as resolved
    fn close_interrupt_unmodified(&mut self, how: InterruptResolution) {
        self.scheduler.cancel(TaskKind::Interrupt);
        let Some(pending) = self.pending_interrupt.take() else {
            return;
        };
        self.journal
            .log(BattleEvent::InterruptResolved { resolution: how });
        self.land_hit(
            Side::Enemy,
            &pending.resolution(),
            DamageSource::Ability(pending.source),
        );
    }

    fn apply_counter(&mut self, pending: &PendingInterrupt, counter: &CounterEffect) {
        match counter {
            CounterEffect::FullBlock => {
                log_if_verbose!(self.logger, Verbose, "Hit fully blocked");
            }
            CounterEffect::BlockAndReflect { reflect_percent } => {
                let reflected = percent(pending.amount, *reflect_percent);
                if reflected > 0 {
                    self.apply_incoming(Side::Enemy, reflected, DamageSource::CounterReflect);
                }
            }
            CounterEffect::PartialReduction {
                reduce_percent,
                reflect_percent,
            } => {
                let mut reduced = pending.resolution();
                reduced.amount = pending.amount - percent(pending.amount, *reduce_percent);
                self.land_hit(
                    Side::Enemy,
                    &reduced,
                    DamageSource::Ability(pending.source.clone()),
                );
                let reflected = percent(pending.amount, *reflect_percent);
                if reflected > 0 && !self.is_over() {
                    self.apply_incoming(Side::Enemy, reflected, DamageSource::CounterReflect);
                }
            }
            CounterEffect::Probabilistic { sides, threshold } => {
                let roll = self.rng.gen_range(1..=(*sides).max(1));
                log_if_verbose!(
                    self.logger,
                    Verbose,
                    "Counter roll {} against {}",
                    roll,
                    threshold
                );
                if roll < *threshold {
                    self.land_hit(
                        Side::Enemy,
                        &pending.resolution(),
                        DamageSource::Ability(pending.source.clone()),
                    );
                }
            }
            CounterEffect::BlockAndShield { shield } => {
                let shield_id = StatusId::new(ids::SHIELD);
                if let Err(err) = self.apply_status_to(Side::Player, &shield_id, *shield, None) {
                    self.logger.normal(&format!("Counter shield fizzles: {}", err));
                }
            }
        }
    }

    fn resume_enemy_sequence(&mut self) {
        if self.is_over() || self.pending_interrupt.is_some() {
            return;
        }
        self.run_enemy_steps();
    }
}
