use serde::{Deserialize, Serialize};

use crate::bid_space::ScoredBid;
use crate::context::RoundContext;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcessionConfig {
    /// Initial aspiration. Raised to reservation value if lower.
    pub opening_aspiration: f64,
    /// Aspiration decrease for single concession.
    pub step: f64,
    pub similarity_scale: f64,
    pub similarity_exponent: f64,
    /// Similarity trigger is active only until this fraction of the session.
    /// `None` keeps it active for the whole session.
    pub similarity_until: Option<f64>,
    pub terminal_progress: f64,
    pub terminal_rounds: u32,
}

impl Default for ConcessionConfig {
    fn default() -> Self {
        ConcessionConfig {
            opening_aspiration: 0.9,
            step: 0.01,
            similarity_scale: 1.0,
            similarity_exponent: 3.0,
            similarity_until: None,
            terminal_progress: 0.95,
            terminal_rounds: 2,
        }
    }
}

impl ConcessionConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.opening_aspiration) {
            anyhow::bail!(
                "Opening aspiration {} not in [0, 1].",
                self.opening_aspiration
            );
        }
        if !(self.step > 0.0 && self.step <= 1.0) {
            anyhow::bail!("Concession step {} not in (0, 1].", self.step);
        }
        if self.similarity_scale < 0.0 || self.similarity_exponent < 0.0 {
            anyhow::bail!(
                "Similarity bar parameters must be non-negative (scale {}, exponent {}).",
                self.similarity_scale,
                self.similarity_exponent
            );
        }
        if let Some(until) = self.similarity_until {
            if !(0.0..=1.0).contains(&until) {
                anyhow::bail!("Similarity window {} not in [0, 1].", until);
            }
        }
        if !(0.0..=1.0).contains(&self.terminal_progress) {
            anyhow::bail!(
                "Terminal progress {} not in [0, 1].",
                self.terminal_progress
            );
        }
        Ok(())
    }
}

/// Current aspiration together with the best bid received so far.
#[derive(Clone, Debug, PartialEq)]
pub struct AspirationState {
    aspiration: f64,
    reservation: f64,
    best_received: Option<ScoredBid>,
}

impl AspirationState {
    pub fn new(opening: f64, reservation: f64) -> AspirationState {
        AspirationState {
            aspiration: opening.max(reservation),
            reservation,
            best_received: None,
        }
    }

    pub fn aspiration(&self) -> f64 {
        self.aspiration
    }

    pub fn reservation(&self) -> f64 {
        self.reservation
    }

    pub fn best_received(&self) -> Option<&ScoredBid> {
        self.best_received.as_ref()
    }

    /// Lowers aspiration by `step`, never below reservation value.
    pub fn concede(&mut self, step: f64) {
        let before = self.aspiration;
        self.aspiration = (self.aspiration - step).max(self.reservation);

        if before != self.aspiration {
            log::trace!(
                "Aspiration lowered {:.3} -> {:.3}.",
                before,
                self.aspiration
            );
        }
    }

    pub fn record_received(&mut self, received: ScoredBid) {
        let better = match &self.best_received {
            Some(best) => received.utility > best.utility,
            None => true,
        };
        if better {
            self.best_received = Some(received);
        }
    }
}

/// What the selector learned about the opponent in the current turn.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConcessionSignal {
    /// Highest opponent similarity among shortlisted bids.
    pub best_similarity: Option<f64>,
    pub hardliner: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConcessionPolicy {
    config: ConcessionConfig,
}

impl ConcessionPolicy {
    pub fn new(config: ConcessionConfig) -> ConcessionPolicy {
        ConcessionPolicy { config }
    }

    pub fn config(&self) -> &ConcessionConfig {
        &self.config
    }

    pub fn opening(&self, reservation: f64) -> AspirationState {
        AspirationState::new(self.config.opening_aspiration, reservation)
    }

    /// Minimal opponent similarity expected at given session progress.
    pub fn similarity_bar(&self, progress: f64) -> f64 {
        self.config.similarity_scale * progress.powf(self.config.similarity_exponent)
    }

    /// Unconditional concession, used when nothing offerable beats aspiration.
    pub fn concede(&self, state: &mut AspirationState) {
        state.concede(self.config.step);
    }

    /// Concedes when our best candidates are too far from what the opponent wants.
    /// Returns true if aspiration was lowered.
    pub fn evaluate(
        &self,
        state: &mut AspirationState,
        context: &RoundContext,
        signal: &ConcessionSignal,
    ) -> bool {
        if signal.hardliner {
            return false;
        }

        let progress = context.progress();
        if let Some(until) = self.config.similarity_until {
            if progress > until {
                return false;
            }
        }

        match signal.best_similarity {
            Some(similarity) if similarity < self.similarity_bar(progress) => {
                self.concede(state);
                true
            }
            _ => false,
        }
    }

    pub fn in_terminal_stretch(&self, context: &RoundContext) -> bool {
        context.progress() >= self.config.terminal_progress
            || context.rounds_left() < self.config.terminal_rounds
    }

    /// Best received bid, if we are close to deadline and it beats reservation value.
    pub fn terminal_fallback<'a>(
        &self,
        state: &'a AspirationState,
        context: &RoundContext,
    ) -> Option<&'a ScoredBid> {
        if !self.in_terminal_stretch(context) {
            return None;
        }
        state
            .best_received()
            .filter(|best| best.utility > state.reservation())
    }
}
