//! Battle state, turn structure and the rules that drive them

/// Conditional logging that compiles away when `verbose-logging` is disabled
///
/// Formatting goes through the logger's arena, so an enabled level costs no
/// heap allocation per message.
macro_rules! log_if_verbose {
    ($logger:expr, $level:ident, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $logger.log_fmt($crate::game::VerbosityLevel::$level, format_args!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$logger;
        }
    };
}

pub mod actions;
pub mod battle_loop;
pub mod combat;
pub mod config;
pub mod controller;
pub mod damage;
pub mod enemy_ai;
pub mod engine;
pub mod escalation;
pub mod interrupt;
pub mod logger;
pub mod outcome;
pub mod phase;
pub mod random_controller;
pub mod scheduler;
pub mod scripted_controller;
pub mod state;

pub use actions::PlayerAction;
pub use battle_loop::BattleLoop;
pub use config::{BattleConfig, StageBuff};
pub use controller::{BattleView, InterruptResponse, PlayerController};
pub use escalation::EscalationStage;
pub use interrupt::PendingInterrupt;
pub use logger::{BattleLogger, OutputFormat, OutputMode, VerbosityLevel};
pub use outcome::{BattleReport, BattleResult, Reward, RunStatistics};
pub use phase::TurnPhase;
pub use scheduler::SessionId;
pub use state::{BattleSession, PlayerSetup, TurnFlags};

/// Ready-made player controllers
pub mod controllers {
    pub use super::random_controller::RandomController;
    pub use super::scripted_controller::ScriptedController;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::{CardDefinition, CardId};
    use crate::loader::builtin::{content, starter_deck};

    pub fn quick_config() -> BattleConfig {
        BattleConfig::default().without_delays()
    }

    /// Hero vs. Slime, built but not started
    pub fn idle_session(config: BattleConfig) -> BattleSession {
        let content = content();
        let deck = starter_deck().resolve(&content).unwrap();
        let enemy = content.enemy("Slime").unwrap().clone();
        let mut session = BattleSession::new(
            PlayerSetup::new("Hero", 80, 3),
            &deck,
            enemy,
            content.registry().unwrap(),
            config,
            7,
        );
        session.logger.set_verbosity(VerbosityLevel::Silent);
        session
    }

    /// Give the player a fresh copy of `def`, straight into the hand
    pub fn put_in_hand(session: &mut BattleSession, def: &CardDefinition) -> CardId {
        let card_id = session.cards.register(|id| def.instantiate(id));
        session.piles.add_to_hand(card_id);
        card_id
    }
}
