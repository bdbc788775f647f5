//! Batch simulation: many seeded battles in parallel
//!
//! Every battle is independent and fully determined by its seed, so the
//! summary for a given setup is the same no matter how rayon schedules the
//! work.

use crate::game::controllers::RandomController;
use crate::game::{BattleConfig, BattleLoop, BattleReport, BattleResult, PlayerSetup, VerbosityLevel};
use crate::journal::BattleJournal;
use crate::loader::{BattleInitializer, ContentTables, DeckList};
use crate::Result;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

/// Mixed into the battle seed to seed the controller
const CONTROLLER_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct SimulationSetup {
    pub games: usize,
    /// Battle `i` uses seed `seed + i`
    pub seed: u64,
    pub enemy: String,
    pub player: PlayerSetup,
    pub deck: DeckList,
    pub content: ContentTables,
    pub config: BattleConfig,
    pub max_turns: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub games: usize,
    pub victories: usize,
    pub timeout_victories: usize,
    pub defeats: usize,
    pub average_turns: f64,
    pub average_final_health: f64,
    pub average_damage_dealt: f64,
}

impl SimulationSummary {
    fn from_reports(reports: &[BattleReport]) -> Self {
        let games = reports.len();
        if games == 0 {
            return SimulationSummary::default();
        }
        let count = |result| reports.iter().filter(|r| r.result == result).count();
        let average = |f: fn(&BattleReport) -> f64| reports.iter().map(f).sum::<f64>() / games as f64;

        SimulationSummary {
            games,
            victories: count(BattleResult::Victory),
            timeout_victories: count(BattleResult::TimeoutVictory),
            defeats: count(BattleResult::Defeat),
            average_turns: average(|r| r.turns as f64),
            average_final_health: average(|r| r.final_player_health as f64),
            average_damage_dealt: average(|r| r.stats.damage_dealt as f64),
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        (self.victories + self.timeout_victories) as f64 / self.games as f64
    }
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Games:             {}", self.games)?;
        writeln!(
            f,
            "Victories:         {} ({} on time)",
            self.victories + self.timeout_victories,
            self.timeout_victories
        )?;
        writeln!(f, "Defeats:           {}", self.defeats)?;
        writeln!(f, "Win rate:          {:.1}%", self.win_rate() * 100.0)?;
        writeln!(f, "Avg turns:         {:.2}", self.average_turns)?;
        writeln!(f, "Avg final health:  {:.2}", self.average_final_health)?;
        write!(f, "Avg damage dealt:  {:.2}", self.average_damage_dealt)
    }
}

/// Play one seeded battle with a random controller
pub fn simulate_one(setup: &SimulationSetup, seed: u64) -> Result<BattleReport> {
    let mut session = BattleInitializer::new(&setup.content)
        .with_config(setup.config.clone())
        .init_from_deck(setup.player.clone(), &setup.deck, &setup.enemy, seed)?;
    session.journal = BattleJournal::disabled();

    let mut controller = RandomController::with_seed(seed ^ CONTROLLER_SEED_SALT);
    BattleLoop::new(&mut session)
        .with_max_turns(setup.max_turns)
        .with_verbosity(VerbosityLevel::Silent)
        .run(&mut controller)
}

/// Run every battle of the setup in parallel and summarize
pub fn run_simulation(setup: &SimulationSetup) -> Result<SimulationSummary> {
    let reports = (0..setup.games as u64)
        .into_par_iter()
        .map(|i| simulate_one(setup, setup.seed.wrapping_add(i)))
        .collect::<Result<Vec<_>>>()?;
    Ok(SimulationSummary::from_reports(&reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::builtin;

    fn setup(games: usize) -> SimulationSetup {
        SimulationSetup {
            games,
            seed: 100,
            enemy: "Slime".to_string(),
            player: PlayerSetup::new("Hero", 80, 3),
            deck: builtin::starter_deck(),
            content: builtin::content(),
            config: BattleConfig::default(),
            max_turns: 50,
        }
    }

    #[test]
    fn test_summary_counts_every_game() {
        let summary = run_simulation(&setup(16)).unwrap();
        assert_eq!(summary.games, 16);
        assert_eq!(
            summary.victories + summary.timeout_victories + summary.defeats,
            16
        );
        assert!(summary.average_turns >= 1.0);
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let a = run_simulation(&setup(8)).unwrap();
        let b = run_simulation(&setup(8)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_enemy_fails() {
        let mut bad = setup(2);
        bad.enemy = "Dragon".to_string();
        assert!(run_simulation(&bad).is_err());
    }

    #[test]
    fn test_empty_summary() {
        let summary = SimulationSummary::from_reports(&[]);
        assert_eq!(summary.win_rate(), 0.0);
    }
}
