use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};

use sao_domain_utils::{Bid, Profile};

use crate::bid_space::ScoredBid;
use crate::component::Action;
use crate::concession::ConcessionPolicy;
use crate::config::StrategyConfig;
use crate::selector::BidSelector;
use crate::state::NegotiationState;

/// Utility an opponent bid must exceed to be accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AcceptanceBar {
    /// Current aspiration level.
    Aspiration,
    /// Linear decay from `start` to `end` over the session.
    TimeDecay { start: f64, end: f64 },
}

impl Default for AcceptanceBar {
    fn default() -> Self {
        AcceptanceBar::Aspiration
    }
}

impl AcceptanceBar {
    /// Never lower than reservation value.
    pub fn threshold(&self, state: &NegotiationState) -> f64 {
        let bar = match self {
            AcceptanceBar::Aspiration => state.aspiration.aspiration(),
            AcceptanceBar::TimeDecay { start, end } => {
                start - (start - end) * state.context.progress()
            }
        };
        bar.max(state.aspiration.reservation())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let AcceptanceBar::TimeDecay { start, end } = self {
            if !(0.0..=1.0).contains(start) || !(0.0..=1.0).contains(end) || end > start {
                bail!(
                    "Invalid time decay acceptance bar: start {}, end {}. Expected 0 <= end <= start <= 1.",
                    start,
                    end
                );
            }
        }
        Ok(())
    }
}

/// Decides single turn: accept, fall back to best received bid near
/// deadline or offer next bid from selector.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnDecision {
    acceptance: AcceptanceBar,
    selector: BidSelector,
    policy: ConcessionPolicy,
}

impl TurnDecision {
    pub fn new(config: &StrategyConfig) -> TurnDecision {
        TurnDecision {
            acceptance: config.acceptance.clone(),
            selector: BidSelector::new(config.selector.clone(), config.opponent.clone()),
            policy: ConcessionPolicy::new(config.concession.clone()),
        }
    }

    pub fn policy(&self) -> &ConcessionPolicy {
        &self.policy
    }

    /// Records opponent offer. Malformed bids are rejected.
    pub fn record_offer(
        &self,
        profile: &Profile,
        state: &mut NegotiationState,
        bid: &Bid,
    ) -> anyhow::Result<()> {
        profile
            .domain()
            .validate(bid)
            .with_context(|| format!("Opponent offered malformed bid {}.", bid))?;
        let utility = profile.utility(bid)?;

        state.opponent.observe(bid);
        state
            .aspiration
            .record_received(ScoredBid::new(bid.clone(), utility));
        state.context.last_received = Some(bid.clone());
        Ok(())
    }

    pub fn decide(&self, profile: &Profile, state: &mut NegotiationState) -> anyhow::Result<Action> {
        if let Some(last) = &state.context.last_received {
            let utility = profile.utility(last)?;
            let threshold = self.acceptance.threshold(state);
            if utility > threshold {
                log::debug!(
                    "Round {}: accepting {} with utility {:.3} (threshold {:.3}).",
                    state.context.round,
                    last,
                    utility,
                    threshold
                );
                return Ok(Action::Accept(last.clone()));
            }
        }

        let action = match self
            .policy
            .terminal_fallback(&state.aspiration, &state.context)
        {
            Some(best) => {
                let action = respond_with(&best.bid, state);
                log::debug!(
                    "Round {}: deadline approaching, falling back to best received bid: {}.",
                    state.context.round,
                    action
                );
                action
            }
            None => match self.selector.select_bid(&self.policy, state) {
                Ok(scored) => Action::Offer(scored.bid),
                Err(e) => {
                    log::debug!("Round {}: {}", state.context.round, e);
                    self.exhausted_fallback(profile, state)?
                }
            },
        };

        state.last_offer = Some(action.bid().clone());
        Ok(action)
    }

    /// Never goes below reservation value: best received bid, reservation bid,
    /// peak bid of the domain and finally our own last offer.
    fn exhausted_fallback(
        &self,
        profile: &Profile,
        state: &NegotiationState,
    ) -> anyhow::Result<Action> {
        let reservation = state.aspiration.reservation();
        if let Some(best) = state
            .aspiration
            .best_received()
            .filter(|best| best.utility > reservation)
        {
            return Ok(respond_with(&best.bid, state));
        }

        let candidates = profile
            .reservation_bid()
            .into_iter()
            .chain(state.bid_space.peak().map(|peak| &peak.bid));
        for bid in candidates {
            if profile.utility(bid)? >= reservation {
                return Ok(Action::Offer(bid.clone()));
            }
        }

        state
            .last_offer
            .clone()
            .map(Action::Offer)
            .ok_or_else(|| {
                anyhow!(
                    "Profile '{}' has no bid worth at least reservation value {:.3}.",
                    profile.name(),
                    reservation
                )
            })
    }
}

fn respond_with(bid: &Bid, state: &NegotiationState) -> Action {
    match state.context.last_received.as_ref() == Some(bid) {
        true => Action::Accept(bid.clone()),
        false => Action::Offer(bid.clone()),
    }
}
