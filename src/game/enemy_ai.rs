//! Enemy action selection and execution
//!
//! An enemy turn is a paced sequence: pick an affordable ability by weight,
//! pay for it, run its steps, pause, repeat. Abilities are flattened into a
//! queue of steps so a hit can stop the sequence for an interrupt window and
//! pick up exactly where it left off.

use crate::core::{AbilityEffect, EnemyAbility, Side, StatusId, Target};
use crate::game::damage::resolve_damage;
use crate::game::scheduler::{Continuation, TaskKind};
use crate::game::{BattleSession, TurnPhase};
use crate::journal::{BattleEvent, DamageSource};
use rand::Rng;
use std::collections::VecDeque;

/// One executable piece of an enemy ability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnemyStep {
    /// A single hit; the roll happens when the step runs
    Strike { min: i32, max: i32 },
    ApplyStatus {
        target: Target,
        status: StatusId,
        stacks: u32,
        duration: Option<u32>,
    },
    SelfHeal { amount: i32 },
}

impl EnemyStep {
    /// Append the steps of `effect` in execution order
    pub fn flatten(effect: &AbilityEffect, out: &mut VecDeque<EnemyStep>) {
        match effect {
            AbilityEffect::Damage { min, max } => out.push_back(EnemyStep::Strike {
                min: *min,
                max: *max,
            }),
            AbilityEffect::MultiHit { min, max, hits } => {
                for _ in 0..*hits {
                    out.push_back(EnemyStep::Strike {
                        min: *min,
                        max: *max,
                    });
                }
            }
            AbilityEffect::ApplyStatus {
                target,
                status,
                stacks,
                duration,
            } => out.push_back(EnemyStep::ApplyStatus {
                target: *target,
                status: status.clone(),
                stacks: *stacks,
                duration: *duration,
            }),
            AbilityEffect::SelfHeal { amount } => {
                out.push_back(EnemyStep::SelfHeal { amount: *amount })
            }
            AbilityEffect::Composite { steps } => {
                for step in steps {
                    Self::flatten(step, out);
                }
            }
        }
    }
}

/// Per-turn enemy bookkeeping, reset when the enemy turn starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnemyTurnState {
    pub actions_taken: u32,
    /// Steps of the current ability not yet executed
    pub steps: VecDeque<EnemyStep>,
    pub current: Option<String>,
    /// A counter card was played this enemy turn
    pub counter_used: bool,
}

/// Weighted choice among the abilities `affordable` accepts
///
/// Draws `r` in `[0, total)` and walks the filtered list until the running
/// weight passes it, so list order breaks ties. When every affordable weight
/// is zero the first affordable ability is chosen.
pub fn select_weighted<'a>(
    abilities: &'a [EnemyAbility],
    affordable: impl Fn(&EnemyAbility) -> bool,
    rng: &mut impl Rng,
) -> Option<&'a EnemyAbility> {
    let candidates: smallvec::SmallVec<[&EnemyAbility; 8]> =
        abilities.iter().filter(|a| affordable(a)).collect();
    let first = *candidates.first()?;

    let total: u64 = candidates.iter().map(|a| a.weight as u64).sum();
    if total == 0 {
        return Some(first);
    }

    let r = rng.gen::<f64>() * total as f64;
    let mut cumulative = 0u64;
    for ability in &candidates {
        cumulative += ability.weight as u64;
        if ability.weight > 0 && cumulative as f64 > r {
            return Some(*ability);
        }
    }
    candidates.iter().rev().find(|a| a.weight > 0).copied()
}

impl BattleSession {
    /// Pick and start the next enemy ability, or end the enemy turn
    pub(crate) fn enemy_act(&mut self) {
        if self.phase != TurnPhase::EnemyTurn || self.pending_interrupt.is_some() {
            return;
        }
        if !self.enemy_turn.steps.is_empty() {
            self.run_enemy_steps();
            return;
        }

        let budget = self.combatants[Side::Enemy.idx()].energy;
        if budget <= 0 || self.enemy_turn.actions_taken >= self.config.enemy_action_cap {
            self.finish_enemy_turn();
            return;
        }

        // Cost adjustments apply to enemies too, but an ability never becomes free
        let delta = self.combatants[Side::Enemy.idx()]
            .statuses
            .energy_cost_delta(&self.registry);
        let selected = select_weighted(
            &self.enemy.abilities,
            |a| (a.cost + delta).max(1) <= budget,
            &mut self.rng,
        )
        .cloned();
        let Some(ability) = selected else {
            log_if_verbose!(self.logger, Verbose, "Enemy cannot afford any ability");
            self.finish_enemy_turn();
            return;
        };

        let cost = (ability.cost + delta).max(1);
        self.combatants[Side::Enemy.idx()].try_spend_energy(cost);
        self.enemy_turn.actions_taken += 1;
        self.enemy_turn.current = Some(ability.name.clone());
        self.journal.log(BattleEvent::AbilityUsed {
            name: ability.name.clone(),
            cost,
        });
        log_if_verbose!(
            self.logger,
            Normal,
            "{} uses {} ({} energy left)",
            self.enemy.name,
            ability.name,
            self.combatants[Side::Enemy.idx()].energy
        );

        EnemyStep::flatten(&ability.effect, &mut self.enemy_turn.steps);
        self.run_enemy_steps();
    }

    /// Execute queued steps until the queue drains, a window opens or the battle ends
    pub(crate) fn run_enemy_steps(&mut self) {
        let source = self.enemy_turn.current.clone().unwrap_or_default();

        while let Some(step) = self.enemy_turn.steps.pop_front() {
            match step {
                EnemyStep::Strike { min, max } => {
                    let base = self.rng.gen_range(min..=max);
                    let resolution = resolve_damage(
                        base,
                        &self.combatants[Side::Enemy.idx()].statuses,
                        &self.combatants[Side::Player.idx()].statuses,
                        &self.registry,
                    );
                    if self.interrupt_available() {
                        self.open_interrupt(resolution, source);
                        return;
                    }
                    self.land_hit(Side::Enemy, &resolution, DamageSource::Ability(source.clone()));
                }
                EnemyStep::ApplyStatus {
                    target,
                    status,
                    stacks,
                    duration,
                } => {
                    let side = target.resolve(Side::Enemy);
                    if let Err(err) = self.apply_status_to(side, &status, stacks, duration) {
                        self.logger
                            .normal(&format!("{} fizzles: {}", source, err));
                    }
                }
                EnemyStep::SelfHeal { amount } => {
                    self.heal_side(Side::Enemy, amount);
                }
            }
            if self.is_over() {
                return;
            }
        }

        self.scheduler
            .schedule(self.config.enemy_action_delay, Continuation::EnemyAction);
    }

    /// Hand the turn back to the player
    pub(crate) fn finish_enemy_turn(&mut self) {
        self.scheduler.cancel(TaskKind::EnemySequence);
        self.enemy_turn.steps.clear();
        self.enemy_turn.current = None;
        self.enemy_turn.counter_used = false;
        self.journal.log(BattleEvent::TurnEnded {
            side: Side::Enemy,
            turn: self.turn,
        });
        self.begin_transition(Side::Player);
    }
}
