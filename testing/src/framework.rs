use anyhow::{anyhow, bail, Context};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sao_domain_utils::{Bid, Profile};
use sao_negotiator_component::{Action, BoxedNegotiator, SessionSettings, TurnEvent};
use sao_negotiators::{create_negotiator, NegotiationSession, NegotiatorConfig};

use crate::error::{FrameworkError, ProtocolError};
use crate::negotiation_record::{Agreement, NegotiationRecord};
use crate::prepare_test_dir;

pub struct Party {
    pub name: String,
    pub profile: Arc<Profile>,
    session: NegotiationSession,
}

/// Emulates bilateral alternating offers session between two negotiators.
///
/// First added party opens every round. Results are saved into test directory
/// as `results_trace.json` and `results_summary.json`.
pub struct Framework {
    pub parties: Vec<Party>,
    pub test_dir: PathBuf,
    pub deadline_rounds: u32,
}

impl Framework {
    pub fn new(test_name: &str, deadline_rounds: u32) -> anyhow::Result<Framework> {
        let _ = env_logger::builder().try_init();

        Ok(Framework {
            parties: vec![],
            test_dir: prepare_test_dir(test_name)?,
            deadline_rounds,
        })
    }

    pub fn add_party(
        self,
        name: &str,
        config: NegotiatorConfig,
        profile: &Path,
    ) -> anyhow::Result<Self> {
        let profile = Arc::new(
            Profile::load(profile)
                .with_context(|| format!("Loading profile for party '{}'", name))?,
        );
        let negotiator = create_negotiator(config, profile.clone())
            .with_context(|| format!("Creating negotiator for party '{}'", name))?;
        self.add_party_with(name, negotiator, profile)
    }

    pub fn add_party_with(
        mut self,
        name: &str,
        negotiator: BoxedNegotiator,
        profile: Arc<Profile>,
    ) -> anyhow::Result<Self> {
        if self.parties.len() >= 2 {
            bail!("Can't add '{}'. Negotiation is bilateral.", name);
        }
        if let Some(other) = self.parties.first() {
            if other.profile.domain() != profile.domain() {
                bail!(
                    "Party '{}' negotiates over different domain than '{}'.",
                    name,
                    other.name
                );
            }
        }

        self.parties.push(Party {
            name: name.to_string(),
            profile,
            session: NegotiationSession::new(negotiator),
        });
        Ok(self)
    }

    pub fn run(mut self) -> Result<NegotiationRecord, FrameworkError> {
        let names = self.parties.iter().map(|p| p.name.clone()).collect();
        let mut record = NegotiationRecord::new(names, self.deadline_rounds);

        if self.parties.len() != 2 {
            return Err(FrameworkError::from(
                anyhow!("Expected 2 parties, got {}.", self.parties.len()),
                &record,
            ));
        }

        let settings = SessionSettings {
            deadline_rounds: self.deadline_rounds,
        };
        for party in &mut self.parties {
            if let Err(e) = party.session.start(&settings) {
                record.error(0, &party.name, e);
                break;
            }
        }

        if !record.is_finished() {
            self.negotiate(&mut record);
        }

        for party in &mut self.parties {
            if let Err(e) = party.session.handle(&TurnEvent::SessionEnded) {
                log::debug!("Party '{}' couldn't end session: {}", party.name, e);
            }
        }

        self.save(&record)
            .map_err(|e| FrameworkError::from(e, &record))?;
        Ok(record)
    }

    fn negotiate(&mut self, record: &mut NegotiationRecord) {
        let mut last_offer: Option<(usize, Bid)> = None;

        for round in 0..self.deadline_rounds {
            for idx in 0..2 {
                let party = &mut self.parties[idx];
                let name = party.name.clone();
                let event = TurnEvent::YourTurn {
                    round,
                    total_rounds: self.deadline_rounds,
                };

                let action = match party.session.handle(&event) {
                    Ok(Some(action)) => action,
                    Ok(None) => {
                        let e = ProtocolError::NoAction {
                            party: name.clone(),
                            round,
                        };
                        record.error(round, &name, e.into());
                        return;
                    }
                    Err(e) => {
                        record.error(round, &name, e);
                        return;
                    }
                };
                record.action(round, &name, action.clone());

                match action {
                    Action::Accept(bid) => {
                        match self.check_accept(round, idx, &bid, last_offer.as_ref()) {
                            Ok(agreement) => {
                                log::info!(
                                    "Agreement reached in round {}: {} (utilities: {:?}).",
                                    round,
                                    agreement.bid,
                                    agreement.utilities
                                );
                                record.agree(agreement);
                            }
                            Err(e) => record.error(round, &name, e),
                        }
                        return;
                    }
                    Action::Offer(bid) => {
                        let other = &mut self.parties[1 - idx];
                        if let Err(e) = other
                            .session
                            .handle(&TurnEvent::OpponentOffered(bid.clone()))
                        {
                            record.error(round, &other.name, e);
                            return;
                        }
                        last_offer = Some((idx, bid));
                    }
                }
            }
        }

        log::info!(
            "No agreement between {} within {} rounds.",
            record.parties.join(" and "),
            self.deadline_rounds
        );
        record.timeout();
    }

    fn check_accept(
        &self,
        round: u32,
        acceptor: usize,
        accepted: &Bid,
        last_offer: Option<&(usize, Bid)>,
    ) -> anyhow::Result<Agreement> {
        let party = self.parties[acceptor].name.clone();
        let (proposer, offered) = match last_offer {
            Some((proposer, offered)) if *proposer != acceptor => (*proposer, offered),
            _ => return Err(ProtocolError::AcceptedBeforeOffer { party }.into()),
        };

        if offered != accepted {
            return Err(ProtocolError::AcceptedUnknownBid {
                party,
                accepted: accepted.clone(),
                offered: offered.clone(),
            }
            .into());
        }

        let utilities = self
            .parties
            .iter()
            .map(|party| Ok((party.name.clone(), party.profile.utility(accepted)?)))
            .collect::<anyhow::Result<BTreeMap<_, _>>>()?;

        Ok(Agreement {
            bid: accepted.clone(),
            round,
            proposer: self.parties[proposer].name.clone(),
            utilities,
        })
    }

    fn save(&self, record: &NegotiationRecord) -> anyhow::Result<()> {
        let trace = self.test_dir.join("results_trace.json");
        let summary = self.test_dir.join("results_summary.json");

        fs::write(&trace, serde_json::to_string_pretty(record)?)
            .with_context(|| format!("Writing {}", trace.display()))?;
        fs::write(&summary, serde_json::to_string_pretty(&record.summary())?)
            .with_context(|| format!("Writing {}", summary.display()))?;

        log::debug!("Negotiation results saved in {}.", self.test_dir.display());
        Ok(())
    }
}
