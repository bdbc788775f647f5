//! Player controller trait and battle view
//!
//! The battle loop calls the controller whenever the player has a decision
//! to make. Controllers only see the battle through a read-only view.

use crate::core::{CardId, Side, StatusInstance};
use crate::game::{BattleResult, BattleSession, EscalationStage, PlayerAction};

/// How a controller answers an open counter window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptResponse {
    /// Play this counter card
    Play(CardId),
    /// Let the hit land now
    Skip,
    /// Keep thinking; the window may time out
    Wait,
}

/// Read-only view of a battle for controllers
pub struct BattleView<'a> {
    session: &'a BattleSession,
}

impl<'a> BattleView<'a> {
    pub fn new(session: &'a BattleSession) -> Self {
        BattleView { session }
    }

    pub fn hand(&self) -> &[CardId] {
        self.session.hand()
    }

    pub fn card_name(&self, card_id: CardId) -> Option<&str> {
        self.session
            .card(card_id)
            .ok()
            .map(|c| c.definition.name.as_str())
    }

    /// Current energy cost of a card in hand
    pub fn card_cost(&self, card_id: CardId) -> Option<i32> {
        self.session
            .card(card_id)
            .ok()
            .map(|c| self.session.effective_cost(c))
    }

    pub fn health(&self, side: Side) -> i32 {
        self.session.combatant(side).health
    }

    pub fn max_health(&self, side: Side) -> i32 {
        self.session.combatant(side).max_health
    }

    pub fn energy(&self) -> i32 {
        self.session.player().energy
    }

    pub fn statuses(&self, side: Side) -> impl Iterator<Item = &StatusInstance> {
        self.session.combatant(side).statuses.iter()
    }

    pub fn turn(&self) -> u32 {
        self.session.turn()
    }

    pub fn stage(&self) -> EscalationStage {
        self.session.stage()
    }

    pub fn clock(&self, side: Side) -> u32 {
        self.session.clock(side)
    }

    /// Damage the parked enemy hit will deal (before shields)
    pub fn pending_damage(&self) -> Option<i32> {
        self.session.pending_interrupt().map(|p| p.amount)
    }

    pub fn counter_cards(&self) -> Vec<CardId> {
        self.session.counter_cards()
    }
}

/// Player controller trait
///
/// Implement this to drive the player side, from scripted tests to AI.
pub trait PlayerController {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Choose one of the available actions
    ///
    /// `available` is never empty during a player turn; it always ends with
    /// `EndTurn`. Returning `None` ends the turn.
    fn choose_action(&mut self, view: &BattleView, available: &[PlayerAction])
        -> Option<PlayerAction>;

    /// Answer an open counter window
    fn respond_to_interrupt(&mut self, view: &BattleView, counters: &[CardId])
        -> InterruptResponse;

    /// Called once when the battle ends
    fn on_battle_end(&mut self, _view: &BattleView, _result: BattleResult) {}
}
