pub mod bid_space;
pub mod component;
pub mod concession;
pub mod config;
mod context;
pub mod decision;
#[cfg(test)]
mod fixtures;
pub mod opponent;
pub mod selector;
mod state;
pub mod static_lib;

pub use bid_space::{BidSpace, BidSpaceExhausted, ScoredBid};
pub use component::{Action, NegotiatorComponent, SessionSettings, TurnEvent};
pub use concession::{AspirationState, ConcessionConfig, ConcessionPolicy, ConcessionSignal};
pub use config::StrategyConfig;
pub use context::RoundContext;
pub use decision::{AcceptanceBar, TurnDecision};
pub use opponent::{OpponentConfig, OpponentModel};
pub use selector::{BidSelector, SelectorConfig, ShortlistPick};
pub use state::NegotiationState;
pub use static_lib::{factory, register_negotiator, BoxedNegotiator, NegotiatorFactory};

pub use sao_domain_utils::{Bid, Domain, LinearAdditiveUtility, Profile, Value};
