//! Error types for the battle engine

use crate::core::{CardId, CardName, EnemyName, StatusId};
use crate::game::TurnPhase;
use std::fmt;
use thiserror::Error;

/// Why a player input was rejected
///
/// Rejections are synchronous and leave the session untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidAction {
    /// The battle already reached a terminal result
    BattleOver,
    /// The battle has not been started yet
    NotStarted,
    /// `start` was called twice
    AlreadyStarted,
    /// Player input outside the player's turn
    NotPlayerTurn,
    /// Input during a banner, start delay or other blocking sub-state
    Blocked(TurnPhase),
    /// An interrupt window is open and must be answered first
    InterruptPending,
    /// The card is not in the player's hand
    CardNotInHand(CardId),
    /// Counter cards can only be played inside an interrupt window
    CounterOutsideWindow,
    /// A non-counter card was offered as an interrupt response
    NotACounter(CardId),
    /// There is no interrupt window to respond to
    NoInterruptWindow,
    /// A once-per-turn ability was already used this turn
    AbilityAlreadyUsed(&'static str),
}

impl fmt::Display for InvalidAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidAction::BattleOver => write!(f, "battle is over"),
            InvalidAction::NotStarted => write!(f, "battle has not started"),
            InvalidAction::AlreadyStarted => write!(f, "battle already started"),
            InvalidAction::NotPlayerTurn => write!(f, "not the player's turn"),
            InvalidAction::Blocked(phase) => write!(f, "engine is blocked in {phase:?}"),
            InvalidAction::InterruptPending => write!(f, "an interrupt window is open"),
            InvalidAction::CardNotInHand(id) => write!(f, "card {id} is not in hand"),
            InvalidAction::CounterOutsideWindow => {
                write!(f, "counter cards need an open interrupt window")
            }
            InvalidAction::NotACounter(id) => write!(f, "card {id} is not a counter"),
            InvalidAction::NoInterruptWindow => write!(f, "no interrupt window is open"),
            InvalidAction::AbilityAlreadyUsed(name) => {
                write!(f, "{name} ability already used this turn")
            }
        }
    }
}

/// Which resource was short
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortfall {
    Energy { needed: i32, available: i32 },
    HandFull { cap: usize },
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shortfall::Energy { needed, available } => {
                write!(f, "needs {needed} energy, has {available}")
            }
            Shortfall::HandFull { cap } => write!(f, "hand already holds {cap} cards"),
        }
    }
}

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Invalid action: {0}")]
    InvalidAction(InvalidAction),

    #[error("Insufficient resource: {0}")]
    InsufficientResource(Shortfall),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Unknown status: {0}")]
    UnknownStatus(StatusId),

    #[error("Unknown card: {0}")]
    UnknownCard(CardName),

    #[error("Unknown enemy: {0}")]
    UnknownEnemy(EnemyName),

    #[error("Entity not found: {0}")]
    EntityNotFound(u32),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Invalid deck format: {0}")]
    InvalidDeckFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BattleError {
    /// True for rejections of player input (as opposed to content or IO failures)
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BattleError::InvalidAction(_) | BattleError::InsufficientResource(_)
        )
    }
}

impl From<InvalidAction> for BattleError {
    fn from(reason: InvalidAction) -> Self {
        BattleError::InvalidAction(reason)
    }
}

impl From<Shortfall> for BattleError {
    fn from(shortfall: Shortfall) -> Self {
        BattleError::InsufficientResource(shortfall)
    }
}

pub type Result<T> = std::result::Result<T, BattleError>;
