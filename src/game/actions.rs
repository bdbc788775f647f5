//! Player actions and card resolution

use crate::core::{Card, CardEffect, CardId, Polarity, Side, StatusId};
use crate::error::{InvalidAction, Shortfall};
use crate::game::BattleSession;
use crate::journal::{BattleEvent, DamageSource};
use crate::Result;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Everything a player can do on their own turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "card", rename_all = "snake_case")]
pub enum PlayerAction {
    PlayCard(CardId),
    Discard(CardId),
    /// Once per turn: draw one card
    UseDrawAbility,
    /// Once per turn: discard a card and draw a replacement
    UseDiscardAbility(CardId),
    EndTurn,
}

impl BattleSession {
    /// Dispatch a player action
    pub fn apply_action(&mut self, action: PlayerAction) -> Result<()> {
        match action {
            PlayerAction::PlayCard(card_id) => self.play_card(card_id),
            PlayerAction::Discard(card_id) => self.discard_card(card_id),
            PlayerAction::UseDrawAbility => self.use_draw_ability(),
            PlayerAction::UseDiscardAbility(card_id) => self.use_discard_ability(card_id),
            PlayerAction::EndTurn => self.end_turn(),
        }
    }

    /// Energy a card costs right now, after status adjustments
    pub fn effective_cost(&self, card: &Card) -> i32 {
        let delta = self.combatants[Side::Player.idx()]
            .statuses
            .energy_cost_delta(&self.registry);
        (card.cost() + delta).max(0)
    }

    fn card_in_hand(&self, card_id: CardId) -> Result<&Card> {
        if !self.piles.hand.contains(card_id) {
            return Err(InvalidAction::CardNotInHand(card_id).into());
        }
        self.cards.get(card_id)
    }

    /// Play a card from hand: pay, discard, then resolve its effects in order
    pub fn play_card(&mut self, card_id: CardId) -> Result<()> {
        self.ensure_player_can_act()?;
        let card = self.card_in_hand(card_id)?.clone();
        if card.is_counter() {
            return Err(InvalidAction::CounterOutsideWindow.into());
        }

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
        self.journal.log(BattleEvent::CardPlayed { card_id, cost });
        log_if_verbose!(
            self.logger,
            Normal,
            "Player plays {} (cost {}, {} energy left)",
            card.definition.name,
            cost,
            self.combatants[Side::Player.idx()].energy
        );

        for effect in &card.definition.effects {
            self.resolve_card_effect(card_id, effect);
            if self.is_over() {
                break;
            }
        }
        Ok(())
    }

    /// Runs after payment; a failing effect fizzles and the rest still resolve
    fn resolve_card_effect(&mut self, card_id: CardId, effect: &CardEffect) {
        match effect {
            CardEffect::Damage { amount, hits } => {
                for _ in 0..*hits {
                    self.strike(Side::Player, *amount, DamageSource::Card(card_id));
                    if self.is_over() {
                        break;
                    }
                }
            }
            CardEffect::Heal { amount } => {
                self.heal_side(Side::Player, *amount);
            }
            CardEffect::ApplyStatus {
                target,
                status,
                stacks,
                duration,
            } => {
                let side = target.resolve(Side::Player);
                if let Err(err) = self.apply_status_to(side, status, *stacks, *duration) {
                    self.logger.normal(&format!("{} fizzles: {}", card_id, err));
                }
            }
            CardEffect::Cleanse { status } => self.cleanse_player(status.as_ref()),
            CardEffect::Draw { count } => {
                let outcome = self.piles.draw(*count as usize, &mut self.rng);
                self.record_draw(&outcome);
            }
            CardEffect::GainEnergy { amount } => {
                self.combatants[Side::Player.idx()].gain_energy(*amount);
                self.journal.log(BattleEvent::EnergyGained {
                    side: Side::Player,
                    amount: *amount,
                });
            }
            // Rejected before payment; counters resolve through the interrupt path
            CardEffect::Counter { .. } => {}
        }
    }

    /// Remove one named status, or every debuff
    fn cleanse_player(&mut self, status: Option<&StatusId>) {
        let ledger = &mut self.combatants[Side::Player.idx()].statuses;
        let removed: SmallVec<[StatusId; 2]> = match status {
            Some(id) => ledger.remove(id).map(|inst| inst.status).into_iter().collect(),
            None => ledger.remove_where(&self.registry, |def| def.polarity == Polarity::Debuff),
        };
        for status in removed {
            log_if_verbose!(self.logger, Verbose, "Player cleanses {}", status);
            self.journal.log(BattleEvent::StatusRemoved {
                target: Side::Player,
                status,
            });
        }
    }

    /// Move a card from hand to discard without playing it
    pub fn discard_card(&mut self, card_id: CardId) -> Result<()> {
        self.ensure_player_can_act()?;
        self.card_in_hand(card_id)?;
        self.piles.discard_from_hand(card_id);
        self.journal.log(BattleEvent::CardDiscarded { card_id });
        Ok(())
    }

    /// Draw one card, once per turn, only below the hand cap
    pub fn use_draw_ability(&mut self) -> Result<()> {
        self.ensure_player_can_act()?;
        if self.flags.draw_used {
            return Err(InvalidAction::AbilityAlreadyUsed("draw").into());
        }
        if self.piles.hand.len() >= self.hand_cap {
            return Err(Shortfall::HandFull { cap: self.hand_cap }.into());
        }
        self.flags.draw_used = true;
        let outcome = self.piles.draw(1, &mut self.rng);
        self.record_draw(&outcome);
        Ok(())
    }

    /// Discard a card and draw a replacement, once per turn
    pub fn use_discard_ability(&mut self, card_id: CardId) -> Result<()> {
        self.ensure_player_can_act()?;
        if self.flags.discard_used {
            return Err(InvalidAction::AbilityAlreadyUsed("discard").into());
        }
        self.card_in_hand(card_id)?;
        self.flags.discard_used = true;
        self.piles.discard_from_hand(card_id);
        self.journal.log(BattleEvent::CardDiscarded { card_id });
        let outcome = self.piles.draw(1, &mut self.rng);
        self.record_draw(&outcome);
        Ok(())
    }

    /// Actions that would be accepted right now
    ///
    /// Discards are always legal and left out; `EndTurn` is always last.
    pub fn available_actions(&self) -> SmallVec<[PlayerAction; 8]> {
        let mut actions = SmallVec::new();
        if self.ensure_player_can_act().is_err() {
            return actions;
        }

        let energy = self.combatants[Side::Player.idx()].energy;
        for &card_id in self.hand() {
            let Ok(card) = self.cards.get(card_id) else {
                continue;
            };
            if !card.is_counter() && self.effective_cost(card) <= energy {
                actions.push(PlayerAction::PlayCard(card_id));
            }
        }
        if !self.flags.draw_used && self.piles.hand.len() < self.hand_cap {
            actions.push(PlayerAction::UseDrawAbility);
        }
        actions.push(PlayerAction::EndTurn);
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::ids;
    use crate::core::{CardDefinition, CardKind, CounterEffect, Target};
    use crate::game::test_support::{idle_session, put_in_hand, quick_config};
    use crate::game::TurnPhase;
    use crate::BattleError;

    fn started() -> BattleSession {
        let mut s = idle_session(quick_config().with_first_turn_odds(1.0));
        s.start().unwrap();
        assert_eq!(s.phase(), TurnPhase::PlayerTurn);
        s
    }

    fn strike_card(cost: i32, amount: i32) -> CardDefinition {
        CardDefinition::new(
            "Test Strike",
            CardKind::Damage,
            cost,
            vec![CardEffect::Damage { amount, hits: 1 }],
        )
    }

    #[test]
    fn test_play_damage_card() {
        let mut s = started();
        let card = put_in_hand(&mut s, &strike_card(1, 6));
        let enemy_start = s.enemy().health;
        let energy = s.player().energy;

        s.play_card(card).unwrap();
        assert_eq!(s.enemy().health, enemy_start - 6);
        assert_eq!(s.player().energy, energy - 1);
        assert!(s.piles().discard.contains(card));
        assert_eq!(s.stats().cards_played, 1);
        s.check_invariants().unwrap();
    }

    #[test]
    fn test_failing_effect_fizzles_after_payment() {
        let mut s = started();
        let hex = CardDefinition::new(
            "Broken Hex",
            CardKind::Utility,
            1,
            vec![
                CardEffect::ApplyStatus {
                    target: Target::Opponent,
                    status: StatusId::new("doom"),
                    stacks: 1,
                    duration: None,
                },
                CardEffect::Damage { amount: 4, hits: 1 },
            ],
        );
        let card = put_in_hand(&mut s, &hex);
        let enemy_start = s.enemy().health;
        let energy = s.player().energy;

        s.play_card(card).unwrap();
        assert_eq!(s.player().energy, energy - 1);
        assert!(s.piles().discard.contains(card));
        assert_eq!(s.enemy().health, enemy_start - 4);
        assert!(s.enemy().statuses.is_empty());
        s.check_invariants().unwrap();
    }

    #[test]
    fn test_insufficient_energy_rejected_untouched() {
        let mut s = started();
        let card = put_in_hand(&mut s, &strike_card(9, 6));
        let events = s.journal.len();

        let err = s.play_card(card).unwrap_err();
        assert!(matches!(
            err,
            BattleError::InsufficientResource(Shortfall::Energy { needed: 9, .. })
        ));
        assert!(s.piles().hand.contains(card));
        assert_eq!(s.journal.len(), events);
    }

    #[test]
    fn test_drained_raises_cost() {
        let mut s = started();
        let card = put_in_hand(&mut s, &strike_card(1, 6));
        s.apply_status_to(Side::Player, &StatusId::new(ids::DRAINED), 1, None)
            .unwrap();
        let energy = s.player().energy;
        s.play_card(card).unwrap();
        assert_eq!(s.player().energy, energy - 2);
    }

    #[test]
    fn test_counter_outside_window_rejected() {
        let mut s = started();
        let card = put_in_hand(
            &mut s,
            &CardDefinition::new(
                "Parry",
                CardKind::Counter,
                0,
                vec![CardEffect::Counter {
                    counter: CounterEffect::FullBlock,
                }],
            ),
        );
        assert!(matches!(
            s.play_card(card),
            Err(BattleError::InvalidAction(InvalidAction::CounterOutsideWindow))
        ));
        assert!(!s.available_actions().contains(&PlayerAction::PlayCard(card)));
    }

    #[test]
    fn test_cleanse_removes_debuffs_only() {
        let mut s = started();
        s.apply_status_to(Side::Player, &StatusId::new(ids::WEAK), 1, None)
            .unwrap();
        s.apply_status_to(Side::Player, &StatusId::new(ids::POISON), 2, None)
            .unwrap();
        s.apply_status_to(Side::Player, &StatusId::new(ids::STRENGTH), 1, None)
            .unwrap();
        let card = put_in_hand(
            &mut s,
            &CardDefinition::new(
                "Purify",
                CardKind::Cleanse,
                0,
                vec![CardEffect::Cleanse { status: None }],
            ),
        );

        s.play_card(card).unwrap();
        let ledger = &s.player().statuses;
        assert!(!ledger.has(&StatusId::new(ids::WEAK)));
        assert!(!ledger.has(&StatusId::new(ids::POISON)));
        assert!(ledger.has(&StatusId::new(ids::STRENGTH)));
    }

    #[test]
    fn test_draw_ability_once_per_turn() {
        let mut s = started();
        assert!(matches!(
            s.use_draw_ability(),
            Err(BattleError::InsufficientResource(Shortfall::HandFull { .. }))
        ));

        let first = s.hand()[0];
        s.discard_card(first).unwrap();
        s.use_draw_ability().unwrap();
        assert_eq!(s.hand().len(), s.hand_cap());

        let second = s.hand()[0];
        s.discard_card(second).unwrap();
        assert!(matches!(
            s.use_draw_ability(),
            Err(BattleError::InvalidAction(InvalidAction::AbilityAlreadyUsed("draw")))
        ));
    }

    #[test]
    fn test_discard_ability_replaces_card() {
        let mut s = started();
        let card = s.hand()[0];
        s.use_discard_ability(card).unwrap();
        assert!(s.piles().discard.contains(card));
        assert_eq!(s.hand().len(), s.hand_cap());
        assert!(s.use_discard_ability(s.hand()[0]).is_err());
        s.check_invariants().unwrap();
    }

    #[test]
    fn test_available_actions_end_with_end_turn() {
        let s = started();
        let actions = s.available_actions();
        assert_eq!(actions.last(), Some(&PlayerAction::EndTurn));

        let idle = idle_session(quick_config());
        assert!(idle.available_actions().is_empty());
    }
}
