use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use sao_negotiator_component::{Action, Bid};

#[derive(Clone, Debug, Display, PartialEq, Serialize, Deserialize)]
pub enum NegotiationStage {
    #[display(fmt = "[{}] {}: {}", round, party, action)]
    Action {
        round: u32,
        party: String,
        action: Action,
    },
    #[display(fmt = "[{}] {} failed: {}", round, party, error)]
    Error {
        round: u32,
        party: String,
        error: String,
    },
    #[display(fmt = "Deadline of {} rounds reached", _0)]
    Timeout(u32),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub bid: Bid,
    pub round: u32,
    /// Party that offered the agreed bid.
    pub proposer: String,
    /// Utility of agreed bid for each party.
    pub utilities: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationSummary {
    pub parties: Vec<String>,
    pub deadline_rounds: u32,
    pub rounds_played: u32,
    pub agreement: Option<Agreement>,
    pub error: Option<String>,
}

/// Everything that happened during single session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationRecord {
    pub parties: Vec<String>,
    pub deadline_rounds: u32,
    pub stages: Vec<NegotiationStage>,
    pub agreement: Option<Agreement>,
}

impl NegotiationRecord {
    pub fn new(parties: Vec<String>, deadline_rounds: u32) -> NegotiationRecord {
        NegotiationRecord {
            parties,
            deadline_rounds,
            stages: vec![],
            agreement: None,
        }
    }

    pub fn action(&mut self, round: u32, party: &str, action: Action) {
        self.stages.push(NegotiationStage::Action {
            round,
            party: party.to_string(),
            action,
        });
    }

    pub fn error(&mut self, round: u32, party: &str, e: anyhow::Error) {
        self.stages.push(NegotiationStage::Error {
            round,
            party: party.to_string(),
            error: format!("{:#}", e),
        });
    }

    pub fn timeout(&mut self) {
        self.stages
            .push(NegotiationStage::Timeout(self.deadline_rounds));
    }

    pub fn agree(&mut self, agreement: Agreement) {
        self.agreement = Some(agreement);
    }

    pub fn is_finished(&self) -> bool {
        if self.agreement.is_some() {
            return true;
        }

        match self.stages.last() {
            Some(NegotiationStage::Error { .. }) | Some(NegotiationStage::Timeout(_)) => true,
            _ => false,
        }
    }

    pub fn errors(&self) -> Vec<&NegotiationStage> {
        self.stages
            .iter()
            .filter(|stage| matches!(stage, NegotiationStage::Error { .. }))
            .collect()
    }

    /// Bids offered by `party`, in order.
    pub fn offers_of<'a>(&'a self, party: &'a str) -> impl Iterator<Item = &'a Bid> + 'a {
        self.stages.iter().filter_map(move |stage| match stage {
            NegotiationStage::Action {
                party: owner,
                action: Action::Offer(bid),
                ..
            } if owner == party => Some(bid),
            _ => None,
        })
    }

    pub fn rounds_played(&self) -> u32 {
        self.stages
            .iter()
            .filter_map(|stage| match stage {
                NegotiationStage::Action { round, .. } | NegotiationStage::Error { round, .. } => {
                    Some(round + 1)
                }
                NegotiationStage::Timeout(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    pub fn summary(&self) -> NegotiationSummary {
        NegotiationSummary {
            parties: self.parties.clone(),
            deadline_rounds: self.deadline_rounds,
            rounds_played: self.rounds_played(),
            agreement: self.agreement.clone(),
            error: self.errors().first().map(|stage| stage.to_string()),
        }
    }
}

impl fmt::Display for NegotiationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn bid(price: &str) -> Bid {
        Bid::new().with("Price", price)
    }

    #[test]
    fn test_record_lifecycle() {
        let mut record = NegotiationRecord::new(vec!["buyer".into(), "seller".into()], 10);
        record.action(0, "buyer", Action::Offer(bid("10")));
        record.action(0, "seller", Action::Offer(bid("30")));
        record.action(1, "buyer", Action::Offer(bid("20")));
        assert!(!record.is_finished());

        record.action(1, "seller", Action::Accept(bid("20")));
        record.agree(Agreement {
            bid: bid("20"),
            round: 1,
            proposer: "buyer".into(),
            utilities: BTreeMap::new(),
        });

        assert!(record.is_finished());
        assert_eq!(record.rounds_played(), 2);
        assert_eq!(
            record.offers_of("buyer").cloned().collect::<Vec<_>>(),
            vec![bid("10"), bid("20")]
        );
        assert_eq!(record.offers_of("seller").count(), 1);
    }

    #[test]
    fn test_error_finishes_negotiation() {
        let mut record = NegotiationRecord::new(vec!["buyer".into(), "seller".into()], 10);
        record.action(0, "buyer", Action::Offer(bid("10")));
        record.error(0, "seller", anyhow!("Broken"));

        assert!(record.is_finished());
        assert_eq!(record.summary().error.unwrap(), "[0] seller failed: Broken");
    }

    #[test]
    fn test_display_as_json() {
        let mut record = NegotiationRecord::new(vec!["buyer".into(), "seller".into()], 3);
        record.timeout();

        let parsed: NegotiationRecord = serde_json::from_str(&record.to_string()).unwrap();
        assert_eq!(parsed, record);
    }
}
