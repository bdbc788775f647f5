//! Random controller for simulation and baseline play
//!
//! Picks uniformly among the available actions. Counter windows are
//! answered with a random counter most of the time, so simulations exercise
//! skips and timeouts as well.

use crate::core::CardId;
use crate::game::controller::{BattleView, InterruptResponse, PlayerController};
use crate::game::PlayerAction;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub struct RandomController {
    name: String,
    rng: Xoshiro256PlusPlus,
    /// Chance to answer a window with a counter instead of skipping or waiting
    counter_odds: f64,
}

impl RandomController {
    /// Create a controller with a seeded RNG (deterministic)
    pub fn with_seed(seed: u64) -> Self {
        RandomController {
            name: "random".to_string(),
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            counter_odds: 0.75,
        }
    }

    pub fn with_counter_odds(mut self, odds: f64) -> Self {
        self.counter_odds = odds.clamp(0.0, 1.0);
        self
    }
}

impl PlayerController for RandomController {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_action(
        &mut self,
        view: &BattleView,
        available: &[PlayerAction],
    ) -> Option<PlayerAction> {
        if available.is_empty() {
            return None;
        }
        // Prefer playing over ending the turn while anything is affordable
        if available.len() > 1 && view.energy() > 0 && self.rng.gen_bool(0.9) {
            let index = self.rng.gen_range(0..available.len() - 1);
            return Some(available[index]);
        }
        let index = self.rng.gen_range(0..available.len());
        Some(available[index])
    }

    fn respond_to_interrupt(
        &mut self,
        _view: &BattleView,
        counters: &[CardId],
    ) -> InterruptResponse {
        if counters.is_empty() {
            return InterruptResponse::Skip;
        }
        if self.rng.gen_bool(self.counter_odds) {
            let index = self.rng.gen_range(0..counters.len());
            InterruptResponse::Play(counters[index])
        } else if self.rng.gen_bool(0.5) {
            InterruptResponse::Skip
        } else {
            InterruptResponse::Wait
        }
    }
}
