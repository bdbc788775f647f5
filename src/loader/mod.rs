//! Content, deck and profile loaders
//!
//! Content tables and profiles are JSON; decks are either the line-based
//! text format or JSON.

pub mod battle_init;
pub mod builtin;
pub mod content;
pub mod deck;
pub mod profile;

pub use battle_init::BattleInitializer;
pub use content::ContentTables;
pub use deck::{DeckEntry, DeckList};
pub use profile::{JsonProfileStore, MemoryProfileStore, PlayerProfile, ProfileStore};
