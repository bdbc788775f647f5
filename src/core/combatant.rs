//! Combatant representation

use crate::core::{Side, StatusLedger};
use serde::{Deserialize, Serialize};

/// One side of a battle: health, energy and active statuses
///
/// Health and energy are clamped to their bounds by every mutator; clamping
/// is normal behavior here, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub side: Side,

    pub name: String,

    /// Always in `0..=max_health`
    pub health: i32,

    pub max_health: i32,

    /// Always in `0..=max_energy`
    pub energy: i32,

    pub max_energy: i32,

    /// Active statuses in application order
    pub statuses: StatusLedger,
}

impl Combatant {
    pub fn new(side: Side, name: impl Into<String>, max_health: i32, max_energy: i32) -> Self {
        Combatant {
            side,
            name: name.into(),
            health: max_health,
            max_health,
            energy: max_energy,
            max_energy,
            statuses: StatusLedger::new(),
        }
    }

    /// Start below full health (e.g. carried over from a profile)
    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health.min(self.max_health).max(0);
        self
    }

    /// Lose health, returns the amount actually lost
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health - amount.max(0)).clamp(0, self.max_health);
        before - self.health
    }

    /// Gain health, returns the amount actually gained
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount.max(0)).clamp(0, self.max_health);
        self.health - before
    }

    pub fn refill_energy(&mut self) {
        self.energy = self.max_energy;
    }

    pub fn gain_energy(&mut self, amount: i32) {
        self.energy = (self.energy + amount).clamp(0, self.max_energy);
    }

    /// Spend energy if enough is available
    pub fn try_spend_energy(&mut self, cost: i32) -> bool {
        if cost > self.energy {
            return false;
        }
        self.energy -= cost.max(0);
        true
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combatant_creation() {
        let c = Combatant::new(Side::Player, "Alice", 80, 3);
        assert_eq!(c.health, 80);
        assert_eq!(c.energy, 3);
        assert!(!c.is_defeated());
        assert!(c.statuses.is_empty());
    }

    #[test]
    fn test_health_clamped() {
        let mut c = Combatant::new(Side::Enemy, "Slime", 20, 2);

        assert_eq!(c.take_damage(5), 5);
        assert_eq!(c.health, 15);

        assert_eq!(c.heal(50), 5);
        assert_eq!(c.health, 20);

        assert_eq!(c.take_damage(100), 20);
        assert_eq!(c.health, 0);
        assert!(c.is_defeated());

        assert_eq!(c.take_damage(-5), 0);
    }

    #[test]
    fn test_energy() {
        let mut c = Combatant::new(Side::Player, "Bob", 50, 3);
        assert!(c.try_spend_energy(2));
        assert!(!c.try_spend_energy(2));
        assert_eq!(c.energy, 1);

        c.gain_energy(10);
        assert_eq!(c.energy, 3);

        c.energy = 0;
        c.refill_energy();
        assert_eq!(c.energy, 3);
    }

    #[test]
    fn test_with_health() {
        let c = Combatant::new(Side::Player, "Carol", 50, 3).with_health(70);
        assert_eq!(c.health, 50);
        let c = Combatant::new(Side::Player, "Carol", 50, 3).with_health(12);
        assert_eq!(c.health, 12);
        let c = Combatant::new(Side::Player, "Carol", -5, 3).with_health(12);
        assert_eq!(c.health, 0);
    }
}
