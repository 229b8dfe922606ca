use derive_more::Display;
use serde::{Deserialize, Serialize};

use sao_domain_utils::Bid;

use crate::state::NegotiationState;

/// Notification delivered to negotiator by the protocol layer.
#[derive(Clone, Debug, Display, PartialEq, Serialize, Deserialize)]
pub enum TurnEvent {
    /// Other party proposed a bid.
    #[display(fmt = "OpponentOffered {}", _0)]
    OpponentOffered(Bid),
    /// Negotiator must respond with exactly one `Action`.
    #[display(fmt = "YourTurn [{}/{}]", round, total_rounds)]
    YourTurn { round: u32, total_rounds: u32 },
    /// Agreement was reached or deadline passed.
    SessionEnded,
}

/// Response to `TurnEvent::YourTurn`.
#[derive(Clone, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Accept the most recently received opponent bid.
    #[display(fmt = "Accept {}", _0)]
    Accept(Bid),
    /// Propose a complete bid.
    #[display(fmt = "Offer {}", _0)]
    Offer(Bid),
}

impl Action {
    pub fn bid(&self) -> &Bid {
        match self {
            Action::Accept(bid) | Action::Offer(bid) => bid,
        }
    }
}

/// Parameters of a negotiation session known before the first turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Number of rounds after which session ends without agreement.
    pub deadline_rounds: u32,
}

/// `NegotiatorComponent` implements the decision logic of a single party in
/// bilateral alternating offers negotiation.
///
/// All mutable per-session data lives in `NegotiationState`, which is passed
/// into and returned from every call. Implementations keep only immutable
/// configuration, so the same component can drive many independent sessions
/// and every decision can be replayed from a captured state.
pub trait NegotiatorComponent {
    /// Creates initial state for new session. Errors here are configuration errors
    /// and should abort session before any bid is exchanged.
    fn start(&self, settings: &SessionSettings) -> anyhow::Result<NegotiationState>;

    /// Reacts to single event. Returns `Some(action)` only for `TurnEvent::YourTurn`.
    ///
    /// Opponent offers must be fully recorded before the returned state is used
    /// to decide the next turn.
    fn decide(
        &self,
        state: NegotiationState,
        event: &TurnEvent,
    ) -> anyhow::Result<(Option<Action>, NegotiationState)>;
}
