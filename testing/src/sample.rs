use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use sao_domain_utils::Profile;
use sao_negotiator_component::static_lib::{factory, register_negotiator, NegotiatorFactory};
use sao_negotiator_component::{
    Action, BidSpace, NegotiationState, NegotiatorComponent, SessionSettings, TurnEvent,
};

pub const SAMPLE_LIBRARY: &str = "sao-testing";

/// Repeats its single best bid until the deadline.
pub struct Hardliner {
    profile: Arc<Profile>,
    config: HardlinerConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HardlinerConfig {
    /// Accepts opponent bid only if it is worth at least this much.
    pub accept_above: f64,
}

impl Default for HardlinerConfig {
    fn default() -> Self {
        HardlinerConfig { accept_above: 1.0 }
    }
}

impl NegotiatorFactory<Hardliner> for Hardliner {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        profile: Arc<Profile>,
    ) -> anyhow::Result<Hardliner> {
        let config: HardlinerConfig = match config {
            serde_yaml::Value::Null => HardlinerConfig::default(),
            config => serde_yaml::from_value(config)?,
        };
        Ok(Hardliner { profile, config })
    }
}

impl NegotiatorComponent for Hardliner {
    fn start(&self, settings: &SessionSettings) -> anyhow::Result<NegotiationState> {
        let space = BidSpace::build(
            self.profile.domain(),
            self.profile.utility_function(),
            0.0,
        )?;
        let aspiration = sao_negotiator_component::AspirationState::new(1.0, 0.0);
        Ok(NegotiationState::new(settings, space, aspiration, Some(0)))
    }

    fn decide(
        &self,
        mut state: NegotiationState,
        event: &TurnEvent,
    ) -> anyhow::Result<(Option<Action>, NegotiationState)> {
        match event {
            TurnEvent::OpponentOffered(bid) => {
                state.context.last_received = Some(bid.clone());
                Ok((None, state))
            }
            TurnEvent::YourTurn { round, .. } => {
                state.context.round = *round;
                if let Some(last) = &state.context.last_received {
                    if self.profile.utility(last)? >= self.config.accept_above {
                        return Ok((Some(Action::Accept(last.clone())), state));
                    }
                }

                let best = state
                    .bid_space
                    .peak()
                    .map(|peak| peak.bid.clone())
                    .ok_or_else(|| anyhow!("Hardliner: empty domain."))?;
                Ok((Some(Action::Offer(best)), state))
            }
            TurnEvent::SessionEnded => Ok((None, state)),
        }
    }
}

pub fn register_sample_negotiators() -> anyhow::Result<()> {
    register_negotiator(SAMPLE_LIBRARY, "Hardliner", factory::<Hardliner>())
}
