pub mod factory;
mod session;

pub use factory::{create_negotiator, LoadMode, NegotiatorConfig};
pub use session::NegotiationSession;

pub use sao_negotiator_component::{
    Action, BoxedNegotiator, NegotiationState, NegotiatorComponent, SessionSettings,
    StrategyConfig, TurnEvent,
};

pub mod builtin {
    pub use sao_builtin_negotiators::presets::{FREQUENCY, PRESETS, SIMILARITY, TIME_DECAY};
    pub use sao_builtin_negotiators::{register_negotiators, FrequencyNegotiator, LIBRARY};
}

pub mod component {
    pub use sao_domain_utils::{Bid, Domain, LinearAdditiveUtility, Profile, Value};
    pub use sao_negotiator_component::static_lib::{factory, register_negotiator};
    pub use sao_negotiator_component::{
        BidSpace, NegotiatorComponent, NegotiatorFactory, OpponentModel, ScoredBid,
    };
}
