//! Battle journal
//!
//! An append-only record of every atomic change a battle makes. Tests and
//! replays read it to check what happened without scraping log text; turn
//! marks let callers ask for the events of the current turn only.

use crate::core::{CardId, Side, StatusId};
use crate::game::{BattleResult, EscalationStage};
use serde::{Deserialize, Serialize};

/// What caused a health change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Card(CardId),
    Ability(String),
    /// End-of-turn status damage
    StatusTick,
    /// Thorns-style reflection
    Reflect,
    /// Share of a countered hit sent back
    CounterReflect,
    Overtime,
}

/// How an interrupt window closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptResolution {
    Countered(CardId),
    Skipped,
    TimedOut,
}

/// Atomic battle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleEvent {
    BattleStarted { first: Side },
    TurnStarted { side: Side, turn: u32 },
    TurnSkipped { side: Side, status: StatusId },
    TurnEnded { side: Side, turn: u32 },
    CardDrawn { card_id: CardId },
    Reshuffled,
    CardPlayed { card_id: CardId, cost: i32 },
    CardDiscarded { card_id: CardId },
    AbilityUsed { name: String, cost: i32 },
    DamageApplied {
        target: Side,
        amount: i32,
        blocked: i32,
        source: DamageSource,
    },
    Healed { target: Side, amount: i32 },
    EnergyGained { side: Side, amount: i32 },
    StatusApplied { target: Side, status: StatusId, stacks: u32 },
    StatusConsumed { target: Side, status: StatusId },
    StatusExpired { target: Side, status: StatusId },
    StatusRemoved { target: Side, status: StatusId },
    InterruptOpened { pending: i32 },
    InterruptResolved { resolution: InterruptResolution },
    StageChanged { stage: EscalationStage },
    OvertimeStarted,
    OvertimePenalty { round: u32, amount: i32 },
    BattleEnded { result: BattleResult },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleJournal {
    /// Events in order (most recent at end)
    events: Vec<BattleEvent>,

    /// Disabled journals record nothing (benchmarks)
    enabled: bool,

    /// Event index at the start of each turn
    turn_marks: Vec<usize>,
}

impl BattleJournal {
    pub fn new() -> Self {
        BattleJournal {
            events: Vec::new(),
            enabled: true,
            turn_marks: Vec::new(),
        }
    }

    /// A journal that records nothing
    pub fn disabled() -> Self {
        BattleJournal {
            events: Vec::new(),
            enabled: false,
            turn_marks: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn log(&mut self, event: BattleEvent) {
        if self.enabled {
            self.events.push(event);
        }
    }

    /// Mark the beginning of a turn
    pub fn mark_turn(&mut self) {
        if self.enabled {
            self.turn_marks.push(self.events.len());
        }
    }

    /// Events recorded since the most recent turn mark
    pub fn current_turn(&self) -> &[BattleEvent] {
        let start = self.turn_marks.last().copied().unwrap_or(0);
        &self.events[start..]
    }

    pub fn last(&self) -> Option<&BattleEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count(&self, mut pred: impl FnMut(&BattleEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.turn_marks.clear();
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }
}

impl Default for BattleJournal {
    fn default() -> Self {
        Self::new()
    }
}
