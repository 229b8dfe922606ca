use rand::rngs::StdRng;
use rand::SeedableRng;

use sao_domain_utils::Bid;

use crate::bid_space::BidSpace;
use crate::component::SessionSettings;
use crate::concession::AspirationState;
use crate::context::RoundContext;
use crate::opponent::OpponentModel;

/// Everything that changes during a single negotiation session.
///
/// Owned by the caller and threaded through `NegotiatorComponent::decide`.
#[derive(Clone, Debug)]
pub struct NegotiationState {
    pub context: RoundContext,
    pub bid_space: BidSpace,
    pub opponent: OpponentModel,
    pub aspiration: AspirationState,
    pub last_offer: Option<Bid>,
    rng: StdRng,
}

impl NegotiationState {
    pub fn new(
        settings: &SessionSettings,
        bid_space: BidSpace,
        aspiration: AspirationState,
        seed: Option<u64>,
    ) -> NegotiationState {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        NegotiationState {
            context: RoundContext::new(settings.deadline_rounds),
            bid_space,
            opponent: OpponentModel::new(),
            aspiration,
            last_offer: None,
            rng,
        }
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
