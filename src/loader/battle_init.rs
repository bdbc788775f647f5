//! Battle initialization from profiles, decks and content tables

use crate::game::{BattleConfig, BattleSession, PlayerSetup};
use crate::loader::{ContentTables, DeckList, PlayerProfile};
use crate::Result;

/// Builds sessions against one set of content tables
pub struct BattleInitializer<'a> {
    content: &'a ContentTables,
    config: BattleConfig,
}

impl<'a> BattleInitializer<'a> {
    pub fn new(content: &'a ContentTables) -> Self {
        BattleInitializer {
            content,
            config: BattleConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    /// A battle with the profile's stats and deck
    pub fn init_battle(
        &self,
        profile: &PlayerProfile,
        enemy: &str,
        seed: u64,
    ) -> Result<BattleSession> {
        self.init_from_deck(profile.setup()?, &profile.deck, enemy, seed)
    }

    /// A battle from explicit starting stats and a deck list
    pub fn init_from_deck(
        &self,
        player: PlayerSetup,
        deck: &DeckList,
        enemy: &str,
        seed: u64,
    ) -> Result<BattleSession> {
        player.validate()?;
        let registry = self.content.registry()?;
        self.config.validate(&registry)?;
        let cards = deck.resolve(self.content)?;
        let enemy = self.content.enemy(enemy)?.clone();

        Ok(BattleSession::new(
            player,
            &cards,
            enemy,
            registry,
            self.config.clone(),
            seed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::TurnPhase;
    use crate::loader::builtin;
    use crate::BattleError;

    #[test]
    fn test_init_from_profile() {
        let content = builtin::content();
        let profile = PlayerProfile::new("Hero", 70, 3, builtin::starter_deck());
        let session = BattleInitializer::new(&content)
            .init_battle(&profile, "Goblin", 3)
            .unwrap();

        assert_eq!(session.phase(), TurnPhase::AwaitingFirstTurnDecision);
        assert_eq!(session.player().max_health, 70);
        assert_eq!(session.enemy().name, "Goblin");
        assert_eq!(session.piles().total(), profile.deck.total_cards());
    }

    #[test]
    fn test_rejects_unplayable_starting_stats() {
        let content = builtin::content();
        let deck = builtin::starter_deck();
        let init = BattleInitializer::new(&content);

        let mut dead = PlayerSetup::new("Hero", 50, 3);
        dead.health = 0;
        for setup in [PlayerSetup::new("Hero", 0, 3), PlayerSetup::new("Hero", 50, -2), dead] {
            assert!(matches!(
                init.init_from_deck(setup, &deck, "Slime", 1),
                Err(BattleError::InvalidContent(_))
            ));
        }

        let mut broken = PlayerProfile::new("Hero", 0, 3, deck);
        broken.health = 0;
        assert!(init.init_battle(&broken, "Slime", 1).is_err());
    }

    #[test]
    fn test_unknown_enemy() {
        let content = builtin::content();
        let profile = PlayerProfile::new("Hero", 70, 3, builtin::starter_deck());
        let result = BattleInitializer::new(&content).init_battle(&profile, "Dragon", 3);
        assert!(matches!(result, Err(BattleError::UnknownEnemy(_))));
    }
}
