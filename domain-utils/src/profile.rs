use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use crate::{Bid, Domain, Error, LinearAdditiveUtility, Value};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ProfileDef {
    #[serde(default)]
    name: String,
    domain: Domain,
    weights: BTreeMap<String, f64>,
    utilities: BTreeMap<String, BTreeMap<Value, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reservation_bid: Option<Bid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reservation_value: Option<f64>,
}

/// Private preferences of one party: the domain, its utility function over
/// that domain and an optional walk-away point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileDef", into = "ProfileDef")]
pub struct Profile {
    name: String,
    domain: Domain,
    utility: LinearAdditiveUtility,
    reservation_bid: Option<Bid>,
    reservation_value: Option<f64>,
}

impl Profile {
    pub fn new(
        name: impl ToString,
        domain: Domain,
        utility: LinearAdditiveUtility,
        reservation_bid: Option<Bid>,
        reservation_value: Option<f64>,
    ) -> Result<Profile, Error> {
        if let Some(value) = reservation_value {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidDomainConfiguration(format!(
                    "Reservation value {} not in [0, 1]",
                    value
                )));
            }
        }

        // Explicit reservation value wins over the utility of reservation bid.
        let reservation_value = match (&reservation_bid, reservation_value) {
            (_, Some(value)) => Some(value),
            (Some(bid), None) => {
                domain.validate(bid)?;
                Some(utility.utility(bid)?)
            }
            (None, None) => None,
        };

        if let Some(bid) = &reservation_bid {
            domain.validate(bid)?;
        }

        Ok(Profile {
            name: name.to_string(),
            domain,
            utility,
            reservation_bid,
            reservation_value,
        })
    }

    /// Loads profile from JSON or YAML file, depending on extension.
    pub fn load(path: &Path) -> Result<Profile, Error> {
        let content = fs::read_to_string(path)?;
        let profile = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Profile::from_json_str(&content)?,
            Some("yaml") | Some("yml") => Profile::from_yaml_str(&content)?,
            _ => return Err(Error::UnsupportedFormat(path.display().to_string())),
        };

        log::debug!(
            "Loaded profile '{}' over domain '{}' ({} bids) from {}.",
            profile.name,
            profile.domain.name(),
            profile.domain.size(),
            path.display()
        );
        Ok(profile)
    }

    pub fn from_json_str(content: &str) -> Result<Profile, Error> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Profile, Error> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn utility_function(&self) -> &LinearAdditiveUtility {
        &self.utility
    }

    pub fn utility(&self, bid: &Bid) -> Result<f64, Error> {
        self.utility.utility(bid)
    }

    pub fn reservation_bid(&self) -> Option<&Bid> {
        self.reservation_bid.as_ref()
    }

    pub fn reservation_value(&self) -> Option<f64> {
        self.reservation_value
    }
}

impl TryFrom<ProfileDef> for Profile {
    type Error = Error;

    fn try_from(def: ProfileDef) -> Result<Self, Self::Error> {
        let utility = LinearAdditiveUtility::new(&def.domain, def.weights, def.utilities)?;
        Profile::new(
            def.name,
            def.domain,
            utility,
            def.reservation_bid,
            def.reservation_value,
        )
    }
}

impl From<Profile> for ProfileDef {
    fn from(profile: Profile) -> Self {
        ProfileDef {
            name: profile.name,
            weights: profile.utility.weights().clone(),
            utilities: profile.utility.evaluations().clone(),
            domain: profile.domain,
            reservation_bid: profile.reservation_bid,
            reservation_value: profile.reservation_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempdir::TempDir;

    fn assets_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("tests")
            .join("assets")
    }

    const PRICE_COLOR: &str = r#"
        name: buyer
        domain:
          name: price-color
          issues:
            Price: [10, 20, 30]
            Color: [Red, Blue]
        weights: {Price: 0.7, Color: 0.3}
        utilities:
          Price: {10: 1.0, 20: 0.5, 30: 0.0}
          Color: {Red: 1.0, Blue: 0.0}
        reservation_bid: {Price: 20, Color: Blue}
    "#;

    #[test]
    fn test_reservation_value_from_bid() {
        let profile = Profile::from_yaml_str(PRICE_COLOR).unwrap();
        assert!((profile.reservation_value().unwrap() - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_reservation_value_wins() {
        let content = format!("{}\n        reservation_value: 0.6\n", PRICE_COLOR);
        let profile = Profile::from_yaml_str(&content).unwrap();
        assert_eq!(profile.reservation_value(), Some(0.6));
    }

    #[test]
    fn test_invalid_reservation_bid() {
        let content = PRICE_COLOR.replace("{Price: 20, Color: Blue}", "{Price: 20}");
        assert!(Profile::from_yaml_str(&content).is_err());
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let profile = Profile::from_yaml_str(PRICE_COLOR).unwrap();
        let dir = TempDir::new("profile").unwrap();
        let path = dir.path().join("buyer.json");

        fs::write(&path, serde_json::to_string_pretty(&profile).unwrap()).unwrap();
        assert_eq!(Profile::load(&path).unwrap(), profile);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new("profile").unwrap();
        let path = dir.path().join("buyer.toml");
        fs::write(&path, PRICE_COLOR).unwrap();

        assert!(matches!(
            Profile::load(&path),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_assets() {
        let buyer = Profile::load(&assets_dir().join("domain00").join("profileA.yaml")).unwrap();
        let seller = Profile::load(&assets_dir().join("domain00").join("profileB.json")).unwrap();

        assert_eq!(buyer.domain(), seller.domain());
        assert_eq!(buyer.domain().size(), 108);
        assert_eq!(buyer.reservation_value(), Some(0.6));
        assert!(seller.reservation_bid().is_some());
    }
}
