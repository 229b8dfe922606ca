use anyhow::bail;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::bid_space::{BidSpaceExhausted, ScoredBid};
use crate::concession::{ConcessionPolicy, ConcessionSignal};
use crate::opponent::OpponentConfig;
use crate::state::NegotiationState;

/// How to choose a bid from the shortlist of opponent-friendly candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortlistPick {
    /// Highest own utility. Deterministic.
    Best,
    /// Uniformly at random.
    Random,
}

impl Default for ShortlistPick {
    fn default() -> Self {
        ShortlistPick::Best
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub top_n: usize,
    /// Shortlist size used against opponent classified as hardliner.
    pub hardliner_top_n: usize,
    pub pick: ShortlistPick,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            top_n: 10,
            hardliner_top_n: 30,
            pick: ShortlistPick::default(),
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.top_n == 0 || self.hardliner_top_n == 0 {
            bail!(
                "Shortlist sizes must be positive (top_n {}, hardliner_top_n {}).",
                self.top_n,
                self.hardliner_top_n
            );
        }
        Ok(())
    }
}

/// Chooses our next offer among bids above aspiration, preferring
/// those the opponent model considers closest to opponent offers.
#[derive(Clone, Debug, PartialEq)]
pub struct BidSelector {
    config: SelectorConfig,
    opponent: OpponentConfig,
}

impl BidSelector {
    pub fn new(config: SelectorConfig, opponent: OpponentConfig) -> BidSelector {
        BidSelector { config, opponent }
    }

    /// Chosen bid is removed from offerable set.
    pub fn select_bid(
        &self,
        policy: &ConcessionPolicy,
        state: &mut NegotiationState,
    ) -> Result<ScoredBid, BidSpaceExhausted> {
        if state.context.last_received.is_none() {
            return state.bid_space.take_best();
        }

        let round = state.context.round;
        let good = state.bid_space.above(state.aspiration.aspiration());
        if good.is_empty() {
            policy.concede(&mut state.aspiration);
            return state.bid_space.take_best();
        }

        let hardliner = self.opponent.is_hardliner(&state.opponent, round);
        let limit = match hardliner {
            true => self.config.hardliner_top_n,
            false => self.config.top_n,
        };

        let mut scored = good
            .iter()
            .map(|candidate| {
                let similarity = self
                    .opponent
                    .similarity(&state.opponent, &candidate.bid, round);
                (candidate, similarity)
            })
            .collect::<Vec<_>>();
        // Stable sort keeps own preference order among equally similar bids.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        let signal = ConcessionSignal {
            best_similarity: scored.first().map(|(_, similarity)| *similarity),
            hardliner,
        };
        let shortlist = scored
            .into_iter()
            .map(|(candidate, _)| candidate.clone())
            .collect::<Vec<_>>();

        log::trace!(
            "Round {}: {} candidates above aspiration {:.3}, shortlisted {} (hardliner: {}).",
            round,
            good.len(),
            state.aspiration.aspiration(),
            shortlist.len(),
            hardliner
        );

        policy.evaluate(&mut state.aspiration, &state.context, &signal);

        let chosen = match self.config.pick {
            ShortlistPick::Best => shortlist.iter().min_by(|a, b| a.rank(b)),
            ShortlistPick::Random => shortlist.choose(state.rng_mut()),
        }
        .cloned()
        .ok_or(BidSpaceExhausted)?;

        Ok(state
            .bid_space
            .remove_if_present(&chosen.bid)
            .unwrap_or(chosen))
    }
}
