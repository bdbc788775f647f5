//! Turn phases

use crate::core::Side;
use crate::game::BattleResult;
use serde::{Deserialize, Serialize};

/// Where the battle is in its turn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Created, waiting for `start` to decide who acts first
    AwaitingFirstTurnDecision,
    /// Turn banner on display before `next` starts its turn
    TurnBanner { next: Side },
    /// Short settle delay after the banner
    TurnStartDelay { next: Side },
    PlayerTurn,
    EnemyTurn,
    /// Terminal; nothing changes after this
    Finished(BattleResult),
}

impl TurnPhase {
    /// Sub-states during which player input is refused and clocks stop
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            TurnPhase::TurnBanner { .. } | TurnPhase::TurnStartDelay { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnPhase::Finished(_))
    }

    /// Side whose turn is running
    pub fn active_side(&self) -> Option<Side> {
        match self {
            TurnPhase::PlayerTurn => Some(Side::Player),
            TurnPhase::EnemyTurn => Some(Side::Enemy),
            _ => None,
        }
    }

    /// Phase in which `side` acts
    pub fn turn_of(side: Side) -> TurnPhase {
        match side {
            Side::Player => TurnPhase::PlayerTurn,
            Side::Enemy => TurnPhase::EnemyTurn,
        }
    }

    pub fn result(&self) -> Option<BattleResult> {
        match self {
            TurnPhase::Finished(result) => Some(*result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_phases() {
        assert!(TurnPhase::TurnBanner { next: Side::Player }.is_blocking());
        assert!(TurnPhase::TurnStartDelay { next: Side::Enemy }.is_blocking());
        assert!(!TurnPhase::PlayerTurn.is_blocking());
        assert!(!TurnPhase::EnemyTurn.is_blocking());
    }

    #[test]
    fn test_active_side() {
        assert_eq!(TurnPhase::turn_of(Side::Enemy), TurnPhase::EnemyTurn);
        assert_eq!(TurnPhase::PlayerTurn.active_side(), Some(Side::Player));
        assert_eq!(
            TurnPhase::TurnBanner { next: Side::Player }.active_side(),
            None
        );
        let done = TurnPhase::Finished(BattleResult::Victory);
        assert!(done.is_terminal());
        assert_eq!(done.result(), Some(BattleResult::Victory));
    }
}
