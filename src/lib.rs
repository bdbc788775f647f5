//! Card Battle - a deterministic turn-based card-battle rules engine
//!
//! A battle pits a player deck against an enemy with a weighted ability
//! table. The engine resolves damage through status ledgers, paces enemy
//! turns on a logical clock, opens counter windows for the player and
//! escalates pressure as the player's clock runs down.

pub mod core;
pub mod error;
pub mod game;
pub mod journal;
pub mod loader;
pub mod simulation;
pub mod zones;

pub use error::{BattleError, InvalidAction, Result, Shortfall};
