use anyhow::{bail, Context};
use std::sync::Arc;

use sao_domain_utils::Profile;
use sao_negotiator_component::static_lib::NegotiatorFactory;
use sao_negotiator_component::{
    Action, BidSpace, NegotiationState, NegotiatorComponent, SessionSettings, StrategyConfig,
    TurnDecision, TurnEvent,
};

use crate::presets;

/// Negotiator modelling opponent by frequencies of issue values in opponent offers
/// and conceding with aspiration threshold.
pub struct FrequencyNegotiator {
    name: String,
    profile: Arc<Profile>,
    config: StrategyConfig,
    decision: TurnDecision,
}

impl FrequencyNegotiator {
    pub fn with_config(
        name: &str,
        profile: Arc<Profile>,
        config: StrategyConfig,
    ) -> anyhow::Result<FrequencyNegotiator> {
        config.validate()?;
        Ok(FrequencyNegotiator {
            name: name.to_string(),
            decision: TurnDecision::new(&config),
            profile,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    fn build_bid_space(&self, reservation: f64) -> anyhow::Result<BidSpace> {
        let domain = self.profile.domain();
        let utility = self.profile.utility_function();

        Ok(match self.config.max_working_set {
            Some(capacity) => BidSpace::build_bounded(domain, utility, reservation, capacity)?,
            None => BidSpace::build(domain, utility, reservation)?,
        })
    }
}

impl NegotiatorFactory<FrequencyNegotiator> for FrequencyNegotiator {
    fn new(
        name: &str,
        config: serde_yaml::Value,
        profile: Arc<Profile>,
    ) -> anyhow::Result<FrequencyNegotiator> {
        let config = presets::resolve(name, config)?;
        FrequencyNegotiator::with_config(name, profile, config)
    }
}

impl NegotiatorComponent for FrequencyNegotiator {
    fn start(&self, settings: &SessionSettings) -> anyhow::Result<NegotiationState> {
        if settings.deadline_rounds == 0 {
            bail!("Negotiator [{}]: deadline must be at least 1 round.", self.name);
        }

        let reservation = self.config.reservation_for(&self.profile);
        let bid_space = self.build_bid_space(reservation).with_context(|| {
            format!(
                "Negotiator [{}]: failed to enumerate bids of domain '{}'.",
                self.name,
                self.profile.domain().name()
            )
        })?;

        log::info!(
            "Negotiator [{}] starts session as '{}': {} offerable bids, reservation value {:.3}, deadline {} rounds.",
            self.name,
            self.profile.name(),
            bid_space.len(),
            reservation,
            settings.deadline_rounds
        );

        let aspiration = self.decision.policy().opening(reservation);
        Ok(NegotiationState::new(
            settings,
            bid_space,
            aspiration,
            self.config.seed,
        ))
    }

    fn decide(
        &self,
        mut state: NegotiationState,
        event: &TurnEvent,
    ) -> anyhow::Result<(Option<Action>, NegotiationState)> {
        match event {
            TurnEvent::OpponentOffered(bid) => {
                self.decision
                    .record_offer(&self.profile, &mut state, bid)
                    .with_context(|| format!("Negotiator [{}]", self.name))?;
                Ok((None, state))
            }
            TurnEvent::YourTurn {
                round,
                total_rounds,
            } => {
                state.context.advance_to(*round, *total_rounds);
                let action = self.decision.decide(&self.profile, &mut state)?;

                log::debug!(
                    "Negotiator [{}] round {}/{}: {} (aspiration {:.3}).",
                    self.name,
                    round,
                    total_rounds,
                    action,
                    state.aspiration.aspiration()
                );
                Ok((Some(action), state))
            }
            TurnEvent::SessionEnded => {
                log::info!(
                    "Negotiator [{}]: session ended after {} rounds.",
                    self.name,
                    state.context.round
                );
                Ok((None, state))
            }
        }
    }
}
