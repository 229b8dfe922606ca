use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sao_domain_utils::{Bid, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Opponent is a hardliner when, on most issues, a single value was
    /// repeated more often than `hardliner_ratio * round`.
    pub hardliner_ratio: f64,
    /// No hardliner classification before this round.
    pub hardliner_min_rounds: u32,
    /// Divide similarity by number of issues.
    pub average_over_issues: bool,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        OpponentConfig {
            hardliner_ratio: 0.75,
            hardliner_min_rounds: 10,
            average_over_issues: false,
        }
    }
}

impl OpponentConfig {
    pub fn is_hardliner(&self, model: &OpponentModel, round: u32) -> bool {
        round >= self.hardliner_min_rounds && model.is_hardliner(round, self.hardliner_ratio)
    }

    /// Similarity of our candidate bid to what the opponent has been proposing.
    pub fn similarity(&self, model: &OpponentModel, bid: &Bid, round: u32) -> f64 {
        let estimate = model.estimate_utility(bid, round);
        match self.average_over_issues && !bid.is_empty() {
            true => estimate / bid.len() as f64,
            false => estimate,
        }
    }
}

/// Frequency based estimate of opponent preferences.
///
/// Counts how many times each issue value appeared in opponent offers. Values
/// repeated often are assumed to be important for the opponent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpponentModel {
    counts: BTreeMap<String, BTreeMap<Value, u32>>,
    observed: u32,
}

impl OpponentModel {
    pub fn new() -> OpponentModel {
        OpponentModel::default()
    }

    pub fn observe(&mut self, bid: &Bid) {
        for (issue, value) in bid.iter() {
            *self
                .counts
                .entry(issue.to_string())
                .or_default()
                .entry(value.clone())
                .or_insert(0) += 1;
        }
        self.observed += 1;
    }

    /// Number of observed opponent bids.
    pub fn observed(&self) -> u32 {
        self.observed
    }

    pub fn count(&self, issue: &str, value: &Value) -> u32 {
        self.counts
            .get(issue)
            .and_then(|values| values.get(value))
            .cloned()
            .unwrap_or(0)
    }

    /// Sum over issues of `count(issue, bid[issue]) / (round + 1)`.
    ///
    /// Scores are comparable only within a single round; normalizing by
    /// elapsed rounds keeps early evidence from dominating forever.
    pub fn estimate_utility(&self, bid: &Bid, round: u32) -> f64 {
        let elapsed = round as f64 + 1.0;
        bid.iter()
            .map(|(issue, value)| self.count(issue, value) as f64 / elapsed)
            .sum()
    }

    pub fn is_hardliner(&self, round: u32, ratio: f64) -> bool {
        if round == 0 || self.counts.is_empty() {
            return false;
        }

        let bar = ratio * round as f64;
        let rigid = self
            .counts
            .values()
            .filter(|values| values.values().any(|count| *count as f64 > bar))
            .count();
        rigid * 2 > self.counts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::bid;

    #[test]
    fn test_counts_match_observations() {
        let offers = [
            bid("20", "Red"),
            bid("10", "Red"),
            bid("20", "Blue"),
            bid("20", "Red"),
        ];

        let mut model = OpponentModel::new();
        for offer in &offers {
            model.observe(offer);
        }

        assert_eq!(model.observed(), 4);
        for issue in ["Price", "Color"] {
            for value in ["10", "20", "30", "Red", "Blue"] {
                let value = Value::from(value);
                let expected = offers
                    .iter()
                    .filter(|offer| offer.value(issue) == Some(&value))
                    .count() as u32;
                assert_eq!(model.count(issue, &value), expected);
            }
        }
    }

    #[test]
    fn test_estimate_normalized_by_round() {
        let mut model = OpponentModel::new();
        model.observe(&bid("20", "Red"));

        assert!((model.estimate_utility(&bid("20", "Red"), 3) - 0.5).abs() < 1e-12);
        assert_eq!(model.estimate_utility(&bid("30", "Blue"), 3), 0.0);
    }

    #[test]
    fn test_estimate_after_repeated_offers() {
        let mut model = OpponentModel::new();
        for _ in 0..3 {
            model.observe(&bid("20", "Red"));
        }

        let repeated = model.estimate_utility(&bid("20", "Red"), 3);
        assert!((repeated - 1.5).abs() < 1e-12);
        assert!(repeated > model.estimate_utility(&bid("30", "Blue"), 3));
        // Half overlap scores half.
        assert!((model.estimate_utility(&bid("20", "Blue"), 3) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_average_over_issues() {
        let mut model = OpponentModel::new();
        model.observe(&bid("20", "Red"));

        let config = OpponentConfig {
            average_over_issues: true,
            ..OpponentConfig::default()
        };
        assert!((config.similarity(&model, &bid("20", "Red"), 3) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_hardliner_detection() {
        let config = OpponentConfig::default();

        let mut stubborn = OpponentModel::new();
        let mut flexible = OpponentModel::new();
        let prices = ["10", "20", "30"];
        let colors = ["Red", "Blue"];
        for round in 0..20 {
            stubborn.observe(&bid("30", "Blue"));
            flexible.observe(&bid(prices[round % 3], colors[round % 2]));
        }

        assert!(config.is_hardliner(&stubborn, 20));
        assert!(!config.is_hardliner(&flexible, 20));
        // Too early to judge.
        assert!(!config.is_hardliner(&stubborn, 5));
    }
}
