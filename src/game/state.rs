//! Battle session state

use crate::core::{
    Card, CardDefinition, CardId, Combatant, EnemyDefinition, EntityStore, Side, StatusRegistry,
};
use crate::game::enemy_ai::EnemyTurnState;
use crate::game::escalation::{EscalationStage, TimePressure};
use crate::game::interrupt::PendingInterrupt;
use crate::game::scheduler::{Scheduler, SessionId};
use crate::game::{BattleConfig, BattleLogger, BattleReport, BattleResult, Reward, RunStatistics, TurnPhase};
use crate::journal::BattleJournal;
use crate::zones::CardPiles;
use crate::{BattleError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Player starting stats, read from the profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub name: String,
    pub max_health: i32,
    pub health: i32,
    pub max_energy: i32,
    /// Overrides the configured hand size cap
    #[serde(default)]
    pub hand_size_cap: Option<usize>,
}

impl PlayerSetup {
    pub fn new(name: &str, max_health: i32, max_energy: i32) -> Self {
        PlayerSetup {
            name: name.to_string(),
            max_health,
            health: max_health,
            max_energy,
            hand_size_cap: None,
        }
    }

    /// Reject stats no battle can start from
    pub fn validate(&self) -> Result<()> {
        if self.max_health <= 0 || self.max_energy < 0 {
            return Err(BattleError::InvalidContent(format!(
                "player {} has max health {} and max energy {}",
                self.name, self.max_health, self.max_energy
            )));
        }
        if !(1..=self.max_health).contains(&self.health) {
            return Err(BattleError::InvalidContent(format!(
                "player {} starts at {} of {} health",
                self.name, self.health, self.max_health
            )));
        }
        if self.hand_size_cap == Some(0) {
            return Err(BattleError::InvalidContent(format!(
                "player {} has a zero hand size cap",
                self.name
            )));
        }
        Ok(())
    }
}

/// Once-per-turn player abilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnFlags {
    pub draw_used: bool,
    pub discard_used: bool,
}

/// One battle, from the first-turn coin flip to a terminal result
///
/// The session is mutated only through its own operations (start, advance,
/// player actions). Every rejected operation leaves it untouched; once it is
/// terminal every operation is rejected.
#[derive(Debug, Clone)]
pub struct BattleSession {
    pub(crate) id: SessionId,
    pub(crate) config: BattleConfig,
    pub(crate) registry: Arc<StatusRegistry>,

    /// Indexed by `Side::idx`
    pub(crate) combatants: [Combatant; 2],

    /// Every physical card the player owns this battle
    pub(crate) cards: EntityStore<Card>,
    pub(crate) piles: CardPiles,
    pub(crate) hand_cap: usize,

    pub(crate) enemy: EnemyDefinition,

    pub(crate) phase: TurnPhase,
    /// Incremented at the end of each player turn
    pub(crate) turn: u32,
    pub(crate) flags: TurnFlags,
    pub(crate) enemy_turn: EnemyTurnState,
    pub(crate) pending_interrupt: Option<PendingInterrupt>,
    pub(crate) pressure: TimePressure,
    pub(crate) scheduler: Scheduler,

    pub(crate) stats: RunStatistics,
    pub(crate) reward: Option<Reward>,

    /// Source of every random draw the rules make
    pub(crate) rng: ChaCha12Rng,

    pub journal: BattleJournal,
    pub logger: BattleLogger,
}

impl BattleSession {
    /// Build a session; the deck is instantiated and shuffled, nothing is drawn
    pub fn new(
        player: PlayerSetup,
        deck: &[CardDefinition],
        enemy: EnemyDefinition,
        registry: Arc<StatusRegistry>,
        config: BattleConfig,
        seed: u64,
    ) -> Self {
        let id = SessionId::fresh();
        let mut rng = ChaCha12Rng::seed_from_u64(seed);

        let mut cards = EntityStore::new();
        let mut ids = Vec::with_capacity(deck.len());
        for def in deck {
            ids.push(cards.register(|card_id| def.instantiate(card_id)));
        }
        let mut piles = CardPiles::new(ids);
        piles.shuffle_deck(&mut rng);

        let player_side = Combatant::new(
            Side::Player,
            player.name,
            player.max_health,
            player.max_energy,
        )
        .with_health(player.health);
        let enemy_side = Combatant::new(
            Side::Enemy,
            enemy.name.as_str(),
            enemy.max_health,
            enemy.max_energy,
        );

        BattleSession {
            id,
            hand_cap: player.hand_size_cap.unwrap_or(config.hand_size_cap),
            pressure: TimePressure::new(config.clock_budget),
            config,
            registry,
            combatants: [player_side, enemy_side],
            cards,
            piles,
            enemy,
            phase: TurnPhase::AwaitingFirstTurnDecision,
            turn: 1,
            flags: TurnFlags::default(),
            enemy_turn: EnemyTurnState::default(),
            pending_interrupt: None,
            scheduler: Scheduler::new(id),
            stats: RunStatistics::default(),
            reward: None,
            rng,
            journal: BattleJournal::new(),
            logger: BattleLogger::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn registry(&self) -> &StatusRegistry {
        &self.registry
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Logical time elapsed since the session was created
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.idx()]
    }

    pub fn player(&self) -> &Combatant {
        self.combatant(Side::Player)
    }

    pub fn enemy(&self) -> &Combatant {
        self.combatant(Side::Enemy)
    }

    pub fn enemy_definition(&self) -> &EnemyDefinition {
        &self.enemy
    }

    pub fn piles(&self) -> &CardPiles {
        &self.piles
    }

    pub fn hand(&self) -> &[CardId] {
        &self.piles.hand.cards
    }

    pub fn hand_cap(&self) -> usize {
        self.hand_cap
    }

    pub fn card(&self, id: CardId) -> Result<&Card> {
        self.cards.get(id)
    }

    pub fn flags(&self) -> TurnFlags {
        self.flags
    }

    pub fn pending_interrupt(&self) -> Option<&PendingInterrupt> {
        self.pending_interrupt.as_ref()
    }

    /// Units left on a side's countdown clock
    pub fn clock(&self, side: Side) -> u32 {
        self.pressure.clocks[side.idx()]
    }

    pub fn stage(&self) -> EscalationStage {
        self.pressure.stage
    }

    pub fn in_overtime(&self) -> bool {
        self.pressure.overtime
    }

    pub fn overtime_round(&self) -> u32 {
        self.pressure.overtime_round
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.phase.result()
    }

    /// Units until the next scheduled continuation
    pub fn time_until_next_task(&self) -> Option<u64> {
        self.scheduler.time_until_next()
    }

    /// Final report, available once the battle is terminal
    pub fn report(&self) -> Option<BattleReport> {
        let result = self.result()?;
        Some(BattleReport {
            result,
            final_player_health: self.player().health,
            turns: self.turn,
            stats: self.stats,
            reward: self.reward.clone(),
        })
    }

    /// Verify pile, ledger and bound invariants
    pub fn check_invariants(&self) -> Result<()> {
        self.piles.check_total()?;
        for c in &self.combatants {
            c.statuses.check(&self.registry)?;
            if !(0..=c.max_health).contains(&c.health) || !(0..=c.max_energy).contains(&c.energy) {
                return Err(BattleError::InvariantViolation(format!(
                    "{} out of bounds: health {}/{} energy {}/{}",
                    c.name, c.health, c.max_health, c.energy, c.max_energy
                )));
            }
        }
        if self.is_over() && !self.scheduler.is_idle() {
            return Err(BattleError::InvariantViolation(
                "terminal session still has scheduled continuations".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::builtin;

    fn session() -> BattleSession {
        let content = builtin::content();
        let deck = builtin::starter_deck()
            .resolve(&content)
            .unwrap();
        let enemy = content.enemy("Slime").unwrap().clone();
        BattleSession::new(
            PlayerSetup::new("Hero", 80, 3),
            &deck,
            enemy,
            Arc::new(StatusRegistry::builtin()),
            BattleConfig::default(),
            42,
        )
    }

    #[test]
    fn test_new_session_layout() {
        let s = session();
        assert_eq!(s.phase(), TurnPhase::AwaitingFirstTurnDecision);
        assert!(s.hand().is_empty());
        assert_eq!(s.piles().deck.len(), s.piles().total());
        assert_eq!(s.player().health, 80);
        assert_eq!(s.clock(Side::Player), 120);
        assert_eq!(s.clock(Side::Enemy), 120);
        assert!(s.report().is_none());
        s.check_invariants().unwrap();
    }

    #[test]
    fn test_same_seed_same_deck_order() {
        let a = session();
        let b = session();
        assert_eq!(a.piles().deck.cards, b.piles().deck.cards);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_hand_cap_override() {
        let content = builtin::content();
        let mut setup = PlayerSetup::new("Hero", 50, 3);
        setup.hand_size_cap = Some(7);
        let s = BattleSession::new(
            setup,
            &[],
            content.enemy("Slime").unwrap().clone(),
            Arc::new(StatusRegistry::builtin()),
            BattleConfig::default(),
            1,
        );
        assert_eq!(s.hand_cap(), 7);
    }
}
