//! Scripted player controller for tests and replays
//!
//! Follows a predetermined list of actions and interrupt answers. Once a
//! script runs dry the controller ends its turns and skips every window.

use crate::core::CardId;
use crate::game::controller::{BattleView, InterruptResponse, PlayerController};
use crate::game::PlayerAction;
use std::collections::VecDeque;

pub struct ScriptedController {
    actions: VecDeque<PlayerAction>,
    responses: VecDeque<InterruptResponse>,
}

impl ScriptedController {
    pub fn new(actions: Vec<PlayerAction>) -> Self {
        ScriptedController {
            actions: actions.into(),
            responses: VecDeque::new(),
        }
    }

    pub fn with_responses(mut self, responses: Vec<InterruptResponse>) -> Self {
        self.responses = responses.into();
        self
    }

    /// Scripted actions not yet consumed
    pub fn remaining(&self) -> usize {
        self.actions.len()
    }
}

impl PlayerController for ScriptedController {
    fn name(&self) -> &str {
        "scripted"
    }

    fn choose_action(
        &mut self,
        _view: &BattleView,
        _available: &[PlayerAction],
    ) -> Option<PlayerAction> {
        self.actions.pop_front()
    }

    fn respond_to_interrupt(
        &mut self,
        _view: &BattleView,
        _counters: &[CardId],
    ) -> InterruptResponse {
        self.responses.pop_front().unwrap_or(InterruptResponse::Skip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;
    use crate::game::test_support::{idle_session, quick_config};

    #[test]
    fn test_scripted_controller() {
        let session = idle_session(quick_config());
        let view = BattleView::new(&session);
        let card = EntityId::new(10);
        let mut controller = ScriptedController::new(vec![
            PlayerAction::PlayCard(card),
            PlayerAction::EndTurn,
        ])
        .with_responses(vec![InterruptResponse::Wait]);

        assert_eq!(
            controller.choose_action(&view, &[]),
            Some(PlayerAction::PlayCard(card))
        );
        assert_eq!(controller.remaining(), 1);
        assert_eq!(controller.choose_action(&view, &[]), Some(PlayerAction::EndTurn));
        assert_eq!(controller.choose_action(&view, &[]), None);

        assert_eq!(
            controller.respond_to_interrupt(&view, &[card]),
            InterruptResponse::Wait
        );
        assert_eq!(
            controller.respond_to_interrupt(&view, &[card]),
            InterruptResponse::Skip
        );
    }
}
