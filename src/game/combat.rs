//! Applying hits, heals and statuses to combatants
//!
//! Every health mutation goes through here and is followed by a terminal
//! check, so a battle ends the instant either side reaches 0.

use crate::core::{Side, StatusId};
use crate::game::damage::{apply_shield_block, resolve_damage, DamageResolution};
use crate::game::{BattleResult, BattleSession, Reward, TurnPhase};
use crate::journal::{BattleEvent, DamageSource};
use crate::Result;

impl BattleSession {
    /// Resolve and land a direct hit from `attacker`
    pub(crate) fn strike(&mut self, attacker: Side, base: i32, source: DamageSource) -> i32 {
        let defender = attacker.opponent();
        let resolution = resolve_damage(
            base,
            &self.combatants[attacker.idx()].statuses,
            &self.combatants[defender.idx()].statuses,
            &self.registry,
        );
        self.land_hit(attacker, &resolution, source)
    }

    /// Land an already resolved hit: commit consumption, block, damage, reflect
    ///
    /// Returns the health the defender lost.
    pub(crate) fn land_hit(
        &mut self,
        attacker: Side,
        resolution: &DamageResolution,
        source: DamageSource,
    ) -> i32 {
        let defender = attacker.opponent();
        for status in resolution.commit(&mut self.combatants[defender.idx()].statuses) {
            self.journal.log(BattleEvent::StatusConsumed {
                target: defender,
                status,
            });
        }

        let lost = self.apply_incoming(defender, resolution.amount, source);
        if self.is_over() || resolution.amount <= 0 {
            return lost;
        }

        let thorns = self.combatants[defender.idx()]
            .statuses
            .reflect_amount(&self.registry);
        if thorns > 0 {
            self.apply_incoming(attacker, thorns, DamageSource::Reflect);
        }
        lost
    }

    /// Damage `target` through its shields, returns the health lost
    pub(crate) fn apply_incoming(&mut self, target: Side, amount: i32, source: DamageSource) -> i32 {
        let block = apply_shield_block(
            &mut self.combatants[target.idx()].statuses,
            amount,
            &self.registry,
        );
        let lost = self.combatants[target.idx()].take_damage(block.final_damage);

        for status in block.depleted {
            self.journal
                .log(BattleEvent::StatusConsumed { target, status });
        }
        self.record_damage(target, lost);
        log_if_verbose!(
            self.logger,
            Verbose,
            "{} takes {} ({} blocked), {} health left",
            self.combatants[target.idx()].name,
            lost,
            block.blocked,
            self.combatants[target.idx()].health
        );
        self.journal.log(BattleEvent::DamageApplied {
            target,
            amount: lost,
            blocked: block.blocked,
            source,
        });

        self.check_defeat(target);
        lost
    }

    pub(crate) fn record_damage(&mut self, target: Side, lost: i32) {
        let lost = lost.max(0) as u32;
        match target {
            Side::Enemy => self.stats.damage_dealt += lost,
            Side::Player => self.stats.damage_taken += lost,
        }
    }

    pub(crate) fn heal_side(&mut self, side: Side, amount: i32) -> i32 {
        let gained = self.combatants[side.idx()].heal(amount);
        if gained > 0 {
            self.journal.log(BattleEvent::Healed {
                target: side,
                amount: gained,
            });
            log_if_verbose!(
                self.logger,
                Verbose,
                "{} heals {}",
                self.combatants[side.idx()].name,
                gained
            );
        }
        gained
    }

    /// Apply a status; `duration: None` falls back to the definition's default
    pub(crate) fn apply_status_to(
        &mut self,
        target: Side,
        status: &StatusId,
        stacks: u32,
        duration: Option<u32>,
    ) -> Result<()> {
        let def = self.registry.get(status)?;
        let duration = duration.or(def.default_duration);
        let outcome = self.combatants[target.idx()]
            .statuses
            .apply(def, stacks, duration);
        let stacks = self.combatants[target.idx()].statuses.stacks(status);
        log_if_verbose!(
            self.logger,
            Verbose,
            "{} gains {} ({:?})",
            self.combatants[target.idx()].name,
            status,
            outcome
        );
        self.journal.log(BattleEvent::StatusApplied {
            target,
            status: status.clone(),
            stacks,
        });
        Ok(())
    }

    /// End the battle if `side` is out of health
    pub(crate) fn check_defeat(&mut self, side: Side) -> bool {
        if self.is_over() {
            return true;
        }
        if !self.combatants[side.idx()].is_defeated() {
            return false;
        }
        let result = match side {
            Side::Player => BattleResult::Defeat,
            Side::Enemy => BattleResult::Victory,
        };
        self.finish(result);
        true
    }

    /// Enter the terminal state and drop everything pending
    pub(crate) fn finish(&mut self, result: BattleResult) {
        if self.is_over() {
            return;
        }
        self.phase = TurnPhase::Finished(result);
        let cancelled = self.scheduler.cancel_all();
        self.pending_interrupt = None;
        self.enemy_turn.steps.clear();

        if result.is_win() {
            self.stats.enemies_defeated += 1;
            self.reward = Some(Reward::roll(&self.enemy.reward, &mut self.rng));
        }
        self.journal.log(BattleEvent::BattleEnded { result });
        log_if_verbose!(
            self.logger,
            Verbose,
            "Cancelled {} scheduled continuations",
            cancelled
        );
        self.logger.minimal(&format!(
            "Battle over: {} after {} turns ({} health left)",
            result,
            self.turn,
            self.combatants[Side::Player.idx()].health
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::ids;
    use crate::game::test_support::{idle_session, quick_config};

    #[test]
    fn test_plain_hit_scenario() {
        let mut s = idle_session(quick_config());
        s.combatants[0].max_health = 100;
        s.combatants[0].health = 100;

        s.strike(Side::Enemy, 12, DamageSource::Ability("Bite".to_string()));
        assert_eq!(s.player().health, 88);
        assert!(!s.is_over());
        assert_eq!(s.stats().damage_taken, 12);
    }

    #[test]
    fn test_marked_consumed_after_landing() {
        let mut s = idle_session(quick_config());
        let marked = StatusId::new(ids::MARKED);
        s.apply_status_to(Side::Enemy, &marked, 1, None).unwrap();
        let start = s.enemy().health;

        s.strike(Side::Player, 5, DamageSource::StatusTick);
        assert_eq!(s.enemy().health, start - 10);
        assert!(!s.enemy().statuses.has(&marked));

        s.strike(Side::Player, 5, DamageSource::StatusTick);
        assert_eq!(s.enemy().health, start - 15);
    }

    #[test]
    fn test_thorns_reflect_through_attacker_shield() {
        let mut s = idle_session(quick_config());
        s.apply_status_to(Side::Enemy, &StatusId::new(ids::THORNS), 3, None)
            .unwrap();
        s.apply_status_to(Side::Player, &StatusId::new(ids::SHIELD), 2, None)
            .unwrap();
        let start = s.player().health;

        s.strike(Side::Player, 4, DamageSource::StatusTick);
        // 3 reflected, 2 absorbed by the player's shield
        assert_eq!(s.player().health, start - 1);
    }

    #[test]
    fn test_lethal_hit_finishes_and_cancels() {
        let mut s = idle_session(quick_config());
        s.phase = TurnPhase::EnemyTurn;
        s.scheduler
            .schedule(5, crate::game::scheduler::Continuation::EnemyAction);

        let health = s.player().health;
        s.strike(Side::Enemy, health + 50, DamageSource::Ability("Crush".to_string()));
        assert_eq!(s.player().health, 0);
        assert_eq!(s.result(), Some(BattleResult::Defeat));
        assert!(s.scheduler.is_idle());
        assert!(s.report().unwrap().reward.is_none());
        s.check_invariants().unwrap();
    }

    #[test]
    fn test_default_duration_used() {
        let mut s = idle_session(quick_config());
        let poison = StatusId::new(ids::POISON);
        s.apply_status_to(Side::Enemy, &poison, 2, None).unwrap();
        assert_eq!(s.enemy().statuses.get(&poison).unwrap().duration, Some(3));
        assert!(s
            .apply_status_to(Side::Enemy, &StatusId::new("nonexistent"), 1, None)
            .is_err());
    }
}
