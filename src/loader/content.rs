//! Content tables: statuses, cards, enemies and the starter deck
//!
//! Content is static declarative data. It is validated once when loaded;
//! after that the engine trusts every reference in it.

use crate::core::status::builtin_statuses;
use crate::core::{CardDefinition, EnemyDefinition, StatusDefinition, StatusRegistry};
use crate::loader::DeckList;
use crate::{BattleError, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTables {
    /// Omitted in a file means the built-in catalog
    #[serde(default = "builtin_statuses")]
    pub statuses: Vec<StatusDefinition>,
    pub cards: Vec<CardDefinition>,
    pub enemies: Vec<EnemyDefinition>,
    #[serde(default)]
    pub starter_deck: Option<DeckList>,
}

impl ContentTables {
    /// The content shipped with the crate
    pub fn builtin() -> Self {
        crate::loader::builtin::content()
    }

    /// Load and validate content from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let content: ContentTables = serde_json::from_str(text)?;
        content.validate()?;
        Ok(content)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Build the status registry for these tables
    pub fn registry(&self) -> Result<Arc<StatusRegistry>> {
        Ok(Arc::new(StatusRegistry::new(self.statuses.clone())?))
    }

    /// Reject unknown references and malformed definitions
    pub fn validate(&self) -> Result<()> {
        let registry = StatusRegistry::new(self.statuses.clone())?;

        let mut names = FxHashSet::default();
        for card in &self.cards {
            card.validate(&registry)?;
            if !names.insert(card.name.as_str().to_ascii_lowercase()) {
                return Err(BattleError::InvalidContent(format!(
                    "card {} defined twice",
                    card.name
                )));
            }
        }

        let mut enemy_names = FxHashSet::default();
        for enemy in &self.enemies {
            enemy.validate(&registry)?;
            if !enemy_names.insert(enemy.name.as_str().to_ascii_lowercase()) {
                return Err(BattleError::InvalidContent(format!(
                    "enemy {} defined twice",
                    enemy.name
                )));
            }
            for drop in &enemy.reward.drops {
                self.card(drop.card.as_str())?;
            }
        }

        if let Some(deck) = &self.starter_deck {
            deck.resolve(self)?;
        }
        Ok(())
    }

    /// Look up a card definition by name (case-insensitive)
    pub fn card(&self, name: &str) -> Result<&CardDefinition> {
        self.cards
            .iter()
            .find(|c| c.name.matches(name))
            .ok_or_else(|| BattleError::UnknownCard(name.trim().into()))
    }

    /// Look up an enemy definition by name (case-insensitive)
    pub fn enemy(&self, name: &str) -> Result<&EnemyDefinition> {
        self.enemies
            .iter()
            .find(|e| e.name.as_str().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| BattleError::UnknownEnemy(name.trim().into()))
    }

    pub fn enemy_names(&self) -> impl Iterator<Item = &str> {
        self.enemies.iter().map(|e| e.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardEffect, CardKind, StatusId, Target};
    use similar_asserts::assert_eq;

    #[test]
    fn test_builtin_content_validates() {
        let content = ContentTables::builtin();
        content.validate().unwrap();
        assert!(content.enemy("slime").is_ok());
        assert!(content.card("STRIKE").is_ok());
        assert!(matches!(
            content.enemy("Dragon"),
            Err(BattleError::UnknownEnemy(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.json");
        let content = ContentTables::builtin();
        content.save_to_file(&path).unwrap();

        let loaded = ContentTables::load_from_file(&path).unwrap();
        assert_eq!(loaded, content);
    }

    #[test]
    fn test_unknown_status_reference_rejected() {
        let mut content = ContentTables::builtin();
        content.cards.push(CardDefinition::new(
            "Frostbite",
            CardKind::Utility,
            1,
            vec![CardEffect::ApplyStatus {
                target: Target::Opponent,
                status: StatusId::new("frozen"),
                stacks: 1,
                duration: None,
            }],
        ));
        assert!(matches!(
            content.validate(),
            Err(BattleError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_duplicate_card_rejected() {
        let mut content = ContentTables::builtin();
        let copy = content.cards[0].clone();
        content.cards.push(copy);
        assert!(matches!(
            content.validate(),
            Err(BattleError::InvalidContent(_))
        ));
    }

    #[test]
    fn test_missing_statuses_default_to_builtin() {
        let json = r#"{
            "cards": [{"name": "Jab", "kind": "damage", "cost": 0,
                       "effects": [{"effect": "damage", "amount": 2}]}],
            "enemies": []
        }"#;
        let content = ContentTables::from_json(json).unwrap();
        assert_eq!(content.statuses.len(), builtin_statuses().len());
        assert_eq!(
            content.cards[0].effects[0],
            CardEffect::Damage { amount: 2, hits: 1 }
        );
    }
}
