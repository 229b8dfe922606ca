use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use sao_domain_utils::{Bid, Domain, Error, LinearAdditiveUtility};

/// No offerable bids remain.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("No offerable bids remain in the bid space.")]
pub struct BidSpaceExhausted;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredBid {
    pub bid: Bid,
    pub utility: f64,
}

impl ScoredBid {
    pub fn new(bid: Bid, utility: f64) -> ScoredBid {
        ScoredBid { bid, utility }
    }

    /// Better bids come first: higher utility, then canonical bid order.
    pub fn rank(&self, other: &ScoredBid) -> Ordering {
        other
            .utility
            .total_cmp(&self.utility)
            .then_with(|| self.bid.cmp(&other.bid))
    }
}

/// Heap entry for bounded enumeration. Heap top is the worst bid kept so far.
struct Ranked(ScoredBid);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank(&other.0)
    }
}

/// Bids above reservation value, sorted from the best for us.
///
/// Offerable set only shrinks: bids taken or removed are never returned again.
#[derive(Clone, Debug)]
pub struct BidSpace {
    offerable: Vec<ScoredBid>,
    reservation: f64,
    /// Best bid of the whole domain, even if it is below reservation.
    peak: Option<ScoredBid>,
}

impl BidSpace {
    /// Enumerates the whole domain.
    pub fn build(
        domain: &Domain,
        utility: &LinearAdditiveUtility,
        reservation: f64,
    ) -> Result<BidSpace, Error> {
        let mut peak: Option<ScoredBid> = None;
        let mut offerable = vec![];

        for bid in domain.all_bids() {
            let score = utility.utility(&bid)?;
            let scored = ScoredBid::new(bid, score);
            update_peak(&mut peak, &scored);
            if scored.utility > reservation {
                offerable.push(scored);
            }
        }

        offerable.sort_by(ScoredBid::rank);

        log::debug!(
            "Built bid space with {} of {} bids above reservation {:.3}.",
            offerable.len(),
            domain.size(),
            reservation
        );

        Ok(BidSpace {
            offerable,
            reservation,
            peak,
        })
    }

    /// Streams the domain keeping only `capacity` best bids in memory.
    /// Equal to `build` whenever the number of bids above reservation fits into capacity.
    pub fn build_bounded(
        domain: &Domain,
        utility: &LinearAdditiveUtility,
        reservation: f64,
        capacity: usize,
    ) -> Result<BidSpace, Error> {
        let mut peak: Option<ScoredBid> = None;
        let mut heap = BinaryHeap::with_capacity(capacity.saturating_add(1));

        for bid in domain.all_bids() {
            let score = utility.utility(&bid)?;
            let scored = ScoredBid::new(bid, score);
            update_peak(&mut peak, &scored);
            if scored.utility <= reservation {
                continue;
            }

            heap.push(Ranked(scored));
            if heap.len() > capacity {
                heap.pop();
            }
        }

        let offerable = heap
            .into_sorted_vec()
            .into_iter()
            .map(|ranked| ranked.0)
            .collect::<Vec<_>>();

        log::debug!(
            "Built bounded bid space with {} bids (capacity {}) out of {} enumerated.",
            offerable.len(),
            capacity,
            domain.size()
        );

        Ok(BidSpace {
            offerable,
            reservation,
            peak,
        })
    }

    /// Builds space from already scored bids.
    pub fn from_scored(bids: Vec<ScoredBid>, reservation: f64) -> BidSpace {
        let mut peak = None;
        for scored in &bids {
            update_peak(&mut peak, scored);
        }

        let mut offerable = bids
            .into_iter()
            .filter(|scored| scored.utility > reservation)
            .collect::<Vec<_>>();
        offerable.sort_by(ScoredBid::rank);

        BidSpace {
            offerable,
            reservation,
            peak,
        }
    }

    pub fn reservation(&self) -> f64 {
        self.reservation
    }

    pub fn len(&self) -> usize {
        self.offerable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offerable.is_empty()
    }

    pub fn best(&self) -> Option<&ScoredBid> {
        self.offerable.first()
    }

    pub fn peak(&self) -> Option<&ScoredBid> {
        self.peak.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredBid> {
        self.offerable.iter()
    }

    /// Offerable bids with utility strictly above threshold, best first.
    pub fn above(&self, threshold: f64) -> &[ScoredBid] {
        let end = self
            .offerable
            .partition_point(|scored| scored.utility > threshold);
        &self.offerable[..end]
    }

    pub fn take_best(&mut self) -> Result<ScoredBid, BidSpaceExhausted> {
        if self.offerable.is_empty() {
            return Err(BidSpaceExhausted);
        }
        Ok(self.offerable.remove(0))
    }

    /// Removes bid equal by value to the given one.
    pub fn remove_if_present(&mut self, bid: &Bid) -> Option<ScoredBid> {
        let idx = self.offerable.iter().position(|scored| &scored.bid == bid)?;
        Some(self.offerable.remove(idx))
    }
}

fn update_peak(peak: &mut Option<ScoredBid>, candidate: &ScoredBid) {
    let better = match peak {
        Some(current) => candidate.rank(current) == Ordering::Less,
        None => true,
    };
    if better {
        *peak = Some(candidate.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{bid, price_color_profile};

    #[test]
    fn test_build_filters_and_sorts() {
        let profile = price_color_profile();
        let space =
            BidSpace::build(profile.domain(), profile.utility_function(), 0.3).unwrap();

        // Utilities: 1.0, 0.7, 0.65, 0.35, 0.3, 0.0 -> 0.3 and 0.0 are discarded.
        let utilities = space.iter().map(|s| s.utility).collect::<Vec<_>>();
        assert_eq!(utilities.len(), 4);
        assert!(utilities.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(space.best().unwrap().bid, bid("10", "Red"));
        assert_eq!(space.peak().unwrap().bid, bid("10", "Red"));
    }

    #[test]
    fn test_ties_broken_by_canonical_order() {
        let bids = vec![
            ScoredBid::new(bid("20", "Red"), 0.5),
            ScoredBid::new(bid("10", "Blue"), 0.5),
            ScoredBid::new(bid("30", "Red"), 0.9),
        ];
        let space = BidSpace::from_scored(bids, 0.0);
        let order = space.iter().map(|s| s.bid.clone()).collect::<Vec<_>>();

        assert_eq!(order, vec![bid("30", "Red"), bid("10", "Blue"), bid("20", "Red")]);
    }

    #[test]
    fn test_take_best_never_repeats() {
        let profile = price_color_profile();
        let mut space =
            BidSpace::build(profile.domain(), profile.utility_function(), 0.0).unwrap();

        let mut taken: Vec<ScoredBid> = vec![];
        while let Ok(scored) = space.take_best() {
            assert!(taken.iter().all(|t| t.bid != scored.bid));
            if let Some(last) = taken.last() {
                assert!(last.utility >= scored.utility);
            }
            taken.push(scored);
        }

        assert_eq!(taken.len(), 5);
        assert_eq!(space.take_best(), Err(BidSpaceExhausted));
    }

    #[test]
    fn test_remove_by_value() {
        let profile = price_color_profile();
        let mut space =
            BidSpace::build(profile.domain(), profile.utility_function(), 0.0).unwrap();

        // Fresh instance, equal only by value.
        let removed = space.remove_if_present(&bid("20", "Red")).unwrap();
        assert!((removed.utility - 0.65).abs() < 1e-12);
        assert!(space.remove_if_present(&bid("20", "Red")).is_none());
        assert!(space.iter().all(|s| s.bid != bid("20", "Red")));
    }

    #[test]
    fn test_above_threshold() {
        let profile = price_color_profile();
        let space =
            BidSpace::build(profile.domain(), profile.utility_function(), 0.0).unwrap();

        assert_eq!(space.above(0.65).len(), 2);
        assert_eq!(space.above(1.0).len(), 0);
        assert_eq!(space.above(0.0).len(), space.len());
    }

    #[test]
    fn test_bounded_build_keeps_top_k() {
        let profile = price_color_profile();
        let full = BidSpace::build(profile.domain(), profile.utility_function(), 0.0).unwrap();
        let bounded =
            BidSpace::build_bounded(profile.domain(), profile.utility_function(), 0.0, 3)
                .unwrap();

        let expected = full.iter().take(3).cloned().collect::<Vec<_>>();
        assert_eq!(bounded.iter().cloned().collect::<Vec<_>>(), expected);

        let unbounded =
            BidSpace::build_bounded(profile.domain(), profile.utility_function(), 0.0, 100)
                .unwrap();
        assert_eq!(
            unbounded.iter().cloned().collect::<Vec<_>>(),
            full.iter().cloned().collect::<Vec<_>>()
        );
    }
}
