use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use sao_domain_utils::Profile;
use sao_negotiator_component::BidSpace;
use sao_negotiators::builtin::{FREQUENCY, SIMILARITY, TIME_DECAY};
use sao_negotiators::NegotiatorConfig;
use sao_negotiators_testing::{
    profile_path, Framework, NegotiationRecord, NegotiationStage, NegotiationSummary,
};

use test_case::test_case;

const BUYER: &str = "buyer";
const SELLER: &str = "seller";

fn buyer_profile() -> Arc<Profile> {
    Arc::new(Profile::load(&profile_path("domain00", "profileA.yaml")).unwrap())
}

fn seller_profile() -> Arc<Profile> {
    Arc::new(Profile::load(&profile_path("domain00", "profileB.json")).unwrap())
}

fn run_session(test_name: &str, buyer: &str, seller: &str, deadline: u32) -> NegotiationRecord {
    Framework::new(test_name, deadline)
        .unwrap()
        .add_party(
            BUYER,
            NegotiatorConfig::builtin(buyer),
            &profile_path("domain00", "profileA.yaml"),
        )
        .unwrap()
        .add_party(
            SELLER,
            NegotiatorConfig::builtin(seller),
            &profile_path("domain00", "profileB.json"),
        )
        .unwrap()
        .run()
        .unwrap()
}

/// Own offers don't repeat as long as there are unused bids above reservation.
fn assert_no_repeated_offers(record: &NegotiationRecord, party: &str, profile: &Profile) {
    let reservation = profile.reservation_value().unwrap();
    let offerable =
        BidSpace::build(profile.domain(), profile.utility_function(), reservation)
            .unwrap()
            .len();

    let offers = record.offers_of(party).take(offerable).collect::<Vec<_>>();
    let unique = offers.iter().collect::<HashSet<_>>();
    assert_eq!(offers.len(), unique.len(), "Party {} repeated offer.", party);
}

#[test]
fn test_frequency_agents_reach_agreement() {
    let record = run_session("test_frequency_agents_reach_agreement", FREQUENCY, SIMILARITY, 100);
    let agreement = record.agreement.clone().expect(&record.to_string());

    let buyer = buyer_profile();
    let seller = seller_profile();
    assert!(agreement.utilities[BUYER] >= buyer.reservation_value().unwrap());
    assert!(agreement.utilities[SELLER] >= seller.reservation_value().unwrap());
    assert!(agreement.round < 50);

    assert_no_repeated_offers(&record, BUYER, &buyer);
    assert_no_repeated_offers(&record, SELLER, &seller);

    // Every offer stays above own reservation value.
    for bid in record.offers_of(BUYER) {
        assert!(buyer.utility(bid).unwrap() > buyer.reservation_value().unwrap());
    }
}

#[test_case(FREQUENCY, FREQUENCY)]
#[test_case(SIMILARITY, FREQUENCY)]
#[test_case(TIME_DECAY, SIMILARITY)]
#[test_case(FREQUENCY, TIME_DECAY)]
fn test_agreements_respect_reservation(buyer: &str, seller: &str) {
    let test_name = format!("test_agreements_respect_reservation_{}_{}", buyer, seller);
    let record = run_session(&test_name, buyer, seller, 200);

    assert!(record.is_finished());
    assert!(record.errors().is_empty(), "{}", record);

    if let Some(agreement) = &record.agreement {
        assert!(agreement.utilities[BUYER] >= buyer_profile().reservation_value().unwrap());
        assert!(agreement.utilities[SELLER] >= seller_profile().reservation_value().unwrap());
    } else {
        assert!(matches!(
            record.stages.last(),
            Some(NegotiationStage::Timeout(200))
        ));
    }
}

#[test]
fn test_results_saved() {
    let record = run_session("test_results_saved", FREQUENCY, SIMILARITY, 30);
    let test_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test-workdir")
        .join("test_results_saved");

    let trace = fs::read_to_string(test_dir.join("results_trace.json")).unwrap();
    let saved: NegotiationRecord = serde_json::from_str(&trace).unwrap();
    assert_eq!(saved, record);

    let summary = fs::read_to_string(test_dir.join("results_summary.json")).unwrap();
    let summary: NegotiationSummary = serde_json::from_str(&summary).unwrap();
    assert_eq!(summary, record.summary());
    assert_eq!(summary.parties, vec![BUYER.to_string(), SELLER.to_string()]);
}
