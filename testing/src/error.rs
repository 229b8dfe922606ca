use std::fmt;

use sao_negotiator_component::Bid;

use crate::negotiation_record::NegotiationRecord;

/// Negotiator broke alternating offers protocol rules.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Party '{party}' accepted before receiving any offer.")]
    AcceptedBeforeOffer { party: String },
    #[error("Party '{party}' accepted {accepted}, but last offer was {offered}.")]
    AcceptedUnknownBid {
        party: String,
        accepted: Bid,
        offered: Bid,
    },
    #[error("Party '{party}' didn't respond in round {round}.")]
    NoAction { party: String, round: u32 },
}

#[derive(thiserror::Error)]
#[error("{error}\nNegotiation traceback:\n\n{negotiation_traceback}")]
pub struct FrameworkError {
    pub error: anyhow::Error,
    pub negotiation_traceback: NegotiationRecord,
}

impl FrameworkError {
    pub fn from(error: impl Into<anyhow::Error>, record: &NegotiationRecord) -> FrameworkError {
        FrameworkError {
            error: error.into(),
            negotiation_traceback: record.clone(),
        }
    }
}

impl fmt::Debug for FrameworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
