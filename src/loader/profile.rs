//! Player profiles and where they are kept
//!
//! The engine reads a profile once when a battle is set up and writes the
//! report back once it ends. Storage is a plain key-value store.

use crate::game::{BattleReport, BattleResult, PlayerSetup, RunStatistics};
use crate::loader::DeckList;
use crate::{BattleError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub max_health: i32,
    pub health: i32,
    pub max_energy: i32,
    #[serde(default)]
    pub hand_size_cap: Option<usize>,
    pub deck: DeckList,
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub battles: u32,
    #[serde(default)]
    pub victories: u32,
    /// Lifetime totals
    #[serde(default)]
    pub stats: RunStatistics,
}

impl PlayerProfile {
    pub fn new(name: &str, max_health: i32, max_energy: i32, deck: DeckList) -> Self {
        PlayerProfile {
            name: name.to_string(),
            max_health,
            health: max_health,
            max_energy,
            hand_size_cap: None,
            deck,
            gold: 0,
            xp: 0,
            battles: 0,
            victories: 0,
            stats: RunStatistics::default(),
        }
    }

    /// Starting stats for the next battle
    ///
    /// A stored health of 0 starts at 1; stats out of range are rejected.
    pub fn setup(&self) -> Result<PlayerSetup> {
        let setup = PlayerSetup {
            name: self.name.clone(),
            max_health: self.max_health,
            health: self.health.min(self.max_health).max(1),
            max_energy: self.max_energy,
            hand_size_cap: self.hand_size_cap,
        };
        setup.validate()?;
        Ok(setup)
    }

    /// Fold a finished battle into the profile
    ///
    /// A defeat sends the player back at full health with nothing gained.
    pub fn record(&mut self, report: &BattleReport) {
        self.battles += 1;
        self.stats.merge(&report.stats);

        match report.result {
            BattleResult::Defeat => self.health = self.max_health,
            BattleResult::Victory | BattleResult::TimeoutVictory => {
                self.victories += 1;
                self.health = report.final_player_health.clamp(1, self.max_health);
            }
        }
        if let Some(reward) = &report.reward {
            self.gold += reward.gold;
            self.xp += reward.xp;
            if let Some(card) = &reward.card {
                self.deck.add_card(card);
            }
        }
    }
}

/// Key-value storage for profiles
pub trait ProfileStore {
    fn load(&self, key: &str) -> Result<Option<PlayerProfile>>;
    fn save(&mut self, key: &str, profile: &PlayerProfile) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: FxHashMap<String, PlayerProfile>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn load(&self, key: &str) -> Result<Option<PlayerProfile>> {
        Ok(self.profiles.get(key).cloned())
    }

    fn save(&mut self, key: &str, profile: &PlayerProfile) -> Result<()> {
        self.profiles.insert(key.to_string(), profile.clone());
        Ok(())
    }
}

/// One pretty-printed JSON file per key
#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    dir: PathBuf,
}

impl JsonProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonProfileStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(BattleError::InvalidContent(format!(
                "profile key {key:?} must be alphanumeric"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ProfileStore for JsonProfileStore {
    fn load(&self, key: &str) -> Result<Option<PlayerProfile>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&mut self, key: &str, profile: &PlayerProfile) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, serde_json::to_string_pretty(profile)?)?;
        Ok(())
    }
}
