use serde::Serialize;
use std::collections::BTreeMap;

use crate::{Bid, Domain, Error, Value};

/// Allowed deviation of the weights sum from 1.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Linear additive utility: `utility(bid) = Σ weight(issue) * eval(issue, bid[issue])`.
///
/// Deserialized only as part of `Profile`, which validates it against the domain.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinearAdditiveUtility {
    weights: BTreeMap<String, f64>,
    utilities: BTreeMap<String, BTreeMap<Value, f64>>,
}

fn in_unit_range(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

impl LinearAdditiveUtility {
    /// Validates weights and evaluations against the domain. Every issue needs a weight,
    /// every admissible value needs an evaluation and nothing outside the domain is allowed.
    pub fn new(
        domain: &Domain,
        weights: BTreeMap<String, f64>,
        utilities: BTreeMap<String, BTreeMap<Value, f64>>,
    ) -> Result<LinearAdditiveUtility, Error> {
        let invalid = |msg: String| -> Result<LinearAdditiveUtility, Error> {
            Err(Error::InvalidDomainConfiguration(msg))
        };

        if let Some(issue) = weights.keys().find(|issue| domain.values(issue).is_none()) {
            return invalid(format!("Weight for unknown issue '{}'", issue));
        }
        if let Some(issue) = utilities.keys().find(|issue| domain.values(issue).is_none()) {
            return invalid(format!("Evaluations for unknown issue '{}'", issue));
        }

        for issue in domain.issues() {
            let weight = match weights.get(issue) {
                Some(weight) => *weight,
                None => return invalid(format!("Missing weight for issue '{}'", issue)),
            };
            if !in_unit_range(weight) {
                return invalid(format!("Weight {} of issue '{}' not in [0, 1]", weight, issue));
            }

            let evaluations = match utilities.get(issue) {
                Some(evaluations) => evaluations,
                None => return invalid(format!("Missing evaluations for issue '{}'", issue)),
            };
            for (value, eval) in evaluations {
                if !domain.contains(issue, value) {
                    return invalid(format!(
                        "Evaluation for value '{}' not admissible for issue '{}'",
                        value, issue
                    ));
                }
                if !in_unit_range(*eval) {
                    return invalid(format!(
                        "Evaluation {} of '{}' = '{}' not in [0, 1]",
                        eval, issue, value
                    ));
                }
            }
            if let Some(value) = domain
                .values(issue)
                .unwrap_or_default()
                .iter()
                .find(|value| !evaluations.contains_key(*value))
            {
                return invalid(format!(
                    "Missing evaluation of value '{}' for issue '{}'",
                    value, issue
                ));
            }
        }

        let sum: f64 = weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return invalid(format!("Issue weights sum to {} instead of 1", sum));
        }

        Ok(LinearAdditiveUtility { weights, utilities })
    }

    pub fn weight(&self, issue: &str) -> Option<f64> {
        self.weights.get(issue).cloned()
    }

    pub fn evaluation(&self, issue: &str, value: &Value) -> Option<f64> {
        self.utilities
            .get(issue)
            .and_then(|evaluations| evaluations.get(value))
            .cloned()
    }

    pub fn weights(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }

    pub fn evaluations(&self) -> &BTreeMap<String, BTreeMap<Value, f64>> {
        &self.utilities
    }

    /// Utility of a complete bid in [0, 1].
    pub fn utility(&self, bid: &Bid) -> Result<f64, Error> {
        if bid.len() != self.weights.len() {
            if let Some(issue) = bid.issues().find(|issue| !self.weights.contains_key(*issue)) {
                return Err(Error::IncompleteBid(format!("unknown issue '{}'", issue)));
            }
        }

        let mut utility = 0.0;
        for (issue, weight) in &self.weights {
            let value = bid
                .value(issue)
                .ok_or_else(|| Error::IncompleteBid(format!("missing value for issue '{}'", issue)))?;
            let eval = self.evaluation(issue, value).ok_or_else(|| {
                Error::IncompleteBid(format!(
                    "value '{}' isn't admissible for issue '{}'",
                    value, issue
                ))
            })?;
            utility += weight * eval;
        }
        // Weights may sum to 1 only within tolerance.
        Ok(utility.clamp(0.0, 1.0))
    }
}
