use serde::{Deserialize, Serialize};

use sao_domain_utils::Bid;

/// Position in the session and the last bid received from the opponent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundContext {
    pub round: u32,
    pub total_rounds: u32,
    pub last_received: Option<Bid>,
}

impl RoundContext {
    pub fn new(total_rounds: u32) -> RoundContext {
        RoundContext {
            round: 0,
            total_rounds,
            last_received: None,
        }
    }

    pub fn advance_to(&mut self, round: u32, total_rounds: u32) {
        self.round = round;
        self.total_rounds = total_rounds;
    }

    /// Elapsed fraction of the session in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.total_rounds == 0 {
            return 1.0;
        }
        (self.round as f64 / self.total_rounds as f64).min(1.0)
    }

    pub fn rounds_left(&self) -> u32 {
        self.total_rounds.saturating_sub(self.round)
    }
}
