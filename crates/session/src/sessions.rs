use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use teahouse_core::ChatId;

use crate::state::{FlowInput, FlowOutcome, FlowPrompt, FlowRejection, SessionState, StepOutcome};

/// Result of routing one input into a user's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Step accepted; ask the user for the next thing.
    Prompt(FlowPrompt),
    /// Flow finished; the session is cleared.
    Complete(FlowOutcome),
    /// Input refused; the step pointer did not move.
    Rejected(FlowRejection),
    /// The user has no active flow.
    NoFlow,
}

/// All users' dialogue sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sessions {
    active: BTreeMap<ChatId, SessionState>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, chat: ChatId) -> bool {
        self.active
            .get(&chat)
            .is_some_and(|state| !state.is_idle())
    }

    pub fn state(&self, chat: ChatId) -> Option<&SessionState> {
        self.active.get(&chat).filter(|state| !state.is_idle())
    }

    /// Begin a flow, displacing whatever was active.
    ///
    /// Returns the displaced flow so the caller can surface the supersession
    /// instead of losing it silently.
    pub fn start(&mut self, chat: ChatId, state: SessionState) -> Option<SessionState> {
        self.active
            .insert(chat, state)
            .filter(|prior| !prior.is_idle())
    }

    /// Cancel unconditionally. Returns the cancelled flow, if any.
    pub fn clear(&mut self, chat: ChatId) -> Option<SessionState> {
        self.active.remove(&chat).filter(|prior| !prior.is_idle())
    }

    /// Route one input into the user's active flow.
    pub fn advance(&mut self, chat: ChatId, input: FlowInput<'_>) -> Advance {
        let Some(state) = self.active.remove(&chat) else {
            return Advance::NoFlow;
        };
        if state.is_idle() {
            return Advance::NoFlow;
        }

        match state.advance(input) {
            StepOutcome::Continue(next, prompt) => {
                self.active.insert(chat, next);
                Advance::Prompt(prompt)
            }
            StepOutcome::Reject(kept, why) => {
                self.active.insert(chat, kept);
                Advance::Rejected(why)
            }
            StepOutcome::Complete(outcome) => Advance::Complete(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CheckoutFlow;
    use teahouse_core::{ProductKey, UnitKind};

    const ALICE: ChatId = ChatId(100);
    const BOB: ChatId = ChatId(200);

    fn amount_entry() -> SessionState {
        SessionState::AmountEntry {
            product: ProductKey::new("Dark Oolong", "Wild Dan Cong"),
            unit: UnitKind::Bulk,
        }
    }

    #[test]
    fn no_flow_for_unknown_user() {
        let mut sessions = Sessions::new();
        assert_eq!(sessions.advance(ALICE, FlowInput::Text("50")), Advance::NoFlow);
    }

    #[test]
    fn completion_clears_the_session() {
        let mut sessions = Sessions::new();
        sessions.start(ALICE, amount_entry());

        match sessions.advance(ALICE, FlowInput::Text("50")) {
            Advance::Complete(FlowOutcome::AddToCart { quantity, .. }) => {
                assert_eq!(quantity, 50)
            }
            other => panic!("{other:?}"),
        }
        assert!(!sessions.is_active(ALICE));
    }

    #[test]
    fn rejection_keeps_the_flow_active() {
        let mut sessions = Sessions::new();
        sessions.start(ALICE, amount_entry());

        assert_eq!(
            sessions.advance(ALICE, FlowInput::Text("not a number")),
            Advance::Rejected(FlowRejection::InvalidQuantity)
        );
        assert!(sessions.is_active(ALICE));

        // The retry still completes.
        match sessions.advance(ALICE, FlowInput::Text("25")) {
            Advance::Complete(_) => {}
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn starting_a_flow_reports_the_displaced_one() {
        let mut sessions = Sessions::new();
        assert_eq!(sessions.start(ALICE, amount_entry()), None);

        let displaced = sessions.start(ALICE, SessionState::Checkout(CheckoutFlow::City));
        assert_eq!(displaced, Some(amount_entry()));
    }

    #[test]
    fn sessions_are_per_user() {
        let mut sessions = Sessions::new();
        sessions.start(ALICE, amount_entry());
        sessions.start(BOB, SessionState::Checkout(CheckoutFlow::City));

        match sessions.advance(BOB, FlowInput::Text("Moscow")) {
            Advance::Prompt(FlowPrompt::ChooseDelivery) => {}
            other => panic!("{other:?}"),
        }
        assert!(sessions.is_active(ALICE));
    }

    #[test]
    fn clear_cancels_unconditionally() {
        let mut sessions = Sessions::new();
        sessions.start(ALICE, SessionState::Checkout(CheckoutFlow::City));
        assert!(sessions.clear(ALICE).is_some());
        assert!(!sessions.is_active(ALICE));
        assert_eq!(sessions.clear(ALICE), None);
    }
}
