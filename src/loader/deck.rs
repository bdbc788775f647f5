//! Deck lists
//!
//! Text format, one entry per line:
//!
//! ```text
//! # comment
//! [Main]
//! 4 Strike
//! 1 Parry
//! ```
//!
//! A JSON form (`{"entries": [{"card": "Strike", "count": 4}]}`) is also
//! accepted.

use crate::core::{CardDefinition, CardName};
use crate::loader::ContentTables;
use crate::{BattleError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A card name and how many copies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card: CardName,
    pub count: u32,
}

impl DeckEntry {
    pub fn new(card: &str, count: u32) -> Self {
        DeckEntry {
            card: CardName::new(card),
            count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    pub entries: Vec<DeckEntry>,
}

impl DeckList {
    pub fn new(entries: Vec<DeckEntry>) -> Self {
        DeckList { entries }
    }

    /// Load a deck from a file; `.json` files are read as JSON, anything else as text
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::parse_json(&content),
            _ => Self::parse(&content),
        }
    }

    /// Parse the text format
    pub fn parse(content: &str) -> Result<DeckList> {
        let mut entries = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }

            let (count_str, name) = line.split_once(' ').ok_or_else(|| {
                BattleError::InvalidDeckFormat(format!("line {}: expected '<count> <card>'", line_no + 1))
            })?;
            let count: u32 = count_str.parse().map_err(|_| {
                BattleError::InvalidDeckFormat(format!(
                    "line {}: bad count {:?}",
                    line_no + 1,
                    count_str
                ))
            })?;
            let name = name.trim();
            if count == 0 || name.is_empty() {
                return Err(BattleError::InvalidDeckFormat(format!(
                    "line {}: empty entry",
                    line_no + 1
                )));
            }
            entries.push(DeckEntry::new(name, count));
        }

        let deck = DeckList { entries };
        deck.ensure_not_empty()?;
        Ok(deck)
    }

    pub fn parse_json(content: &str) -> Result<DeckList> {
        let deck: DeckList = serde_json::from_str(content)?;
        deck.ensure_not_empty()?;
        Ok(deck)
    }

    fn ensure_not_empty(&self) -> Result<()> {
        if self.total_cards() == 0 {
            return Err(BattleError::InvalidDeckFormat("Empty deck".to_string()));
        }
        Ok(())
    }

    pub fn total_cards(&self) -> usize {
        self.entries.iter().map(|e| e.count as usize).sum()
    }

    /// Expand into one definition per physical copy, in list order
    pub fn resolve(&self, content: &ContentTables) -> Result<Vec<CardDefinition>> {
        let mut cards = Vec::with_capacity(self.total_cards());
        for entry in &self.entries {
            let def = content.card(entry.card.as_str())?;
            for _ in 0..entry.count {
                cards.push(def.clone());
            }
        }
        Ok(cards)
    }

    /// Add one copy of a card, merging with an existing entry
    pub fn add_card(&mut self, card: &CardName) {
        match self.entries.iter_mut().find(|e| e.card.matches(card.as_str())) {
            Some(entry) => entry.count += 1,
            None => self.entries.push(DeckEntry {
                card: card.clone(),
                count: 1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::builtin;

    #[test]
    fn test_parse_simple_deck() {
        let content = r#"
# Opening deck
[Main]
4 Strike
2 Guard
1 Parry
"#;

        let deck = DeckList::parse(content).unwrap();
        assert_eq!(deck.entries.len(), 3);
        assert_eq!(deck.total_cards(), 7);
        assert_eq!(deck.entries[0], DeckEntry::new("Strike", 4));
        assert_eq!(deck.entries[2].card.as_str(), "Parry");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DeckList::parse("four Strike").is_err());
        assert!(DeckList::parse("Strike").is_err());
        assert!(DeckList::parse("# nothing here\n").is_err());
        assert!(DeckList::parse("0 Strike").is_err());
    }

    #[test]
    fn test_parse_json() {
        let deck = DeckList::parse_json(r#"{"entries":[{"card":"Strike","count":3}]}"#).unwrap();
        assert_eq!(deck.total_cards(), 3);
    }

    #[test]
    fn test_resolve_multiplicity_and_unknown() {
        let content = builtin::content();
        let deck = DeckList::parse("3 strike\n1 Parry").unwrap();
        let cards = deck.resolve(&content).unwrap();
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].name.as_str(), "Strike");

        let missing = DeckList::parse("1 Fireball").unwrap();
        assert!(matches!(
            missing.resolve(&content),
            Err(BattleError::UnknownCard(_))
        ));
    }

    #[test]
    fn test_add_card_merges() {
        let mut deck = DeckList::new(vec![DeckEntry::new("Strike", 1)]);
        deck.add_card(&CardName::new("Strike"));
        deck.add_card(&CardName::new("Guard"));
        assert_eq!(deck.entries.len(), 2);
        assert_eq!(deck.entries[0].count, 2);
    }
}
