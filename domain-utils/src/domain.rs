use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::convert::TryFrom;

use crate::{Bid, Error, Value};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DomainDef {
    #[serde(default)]
    name: String,
    issues: BTreeMap<String, Vec<Value>>,
}

/// Issues of a negotiation session together with their admissible values.
/// Issues are kept ordered by name, values in the order they were declared.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DomainDef", into = "DomainDef")]
pub struct Domain {
    name: String,
    issues: BTreeMap<String, Vec<Value>>,
}

impl Domain {
    pub fn new(
        name: impl ToString,
        issues: BTreeMap<String, Vec<Value>>,
    ) -> Result<Domain, Error> {
        let name = name.to_string();
        if issues.is_empty() {
            return Err(Error::InvalidDomainConfiguration(format!(
                "Domain '{}' has no issues",
                name
            )));
        }

        for (issue, values) in &issues {
            if values.is_empty() {
                return Err(Error::InvalidDomainConfiguration(format!(
                    "Issue '{}' has empty value set",
                    issue
                )));
            }

            let mut unique = HashSet::new();
            if let Some(duplicate) = values.iter().find(|value| !unique.insert(*value)) {
                return Err(Error::InvalidDomainConfiguration(format!(
                    "Issue '{}' lists value '{}' more than once",
                    issue, duplicate
                )));
            }
        }

        Ok(Domain { name, issues })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn issues(&self) -> impl Iterator<Item = &str> {
        self.issues.keys().map(String::as_str)
    }

    pub fn num_issues(&self) -> usize {
        self.issues.len()
    }

    pub fn values(&self, issue: &str) -> Option<&[Value]> {
        self.issues.get(issue).map(Vec::as_slice)
    }

    pub fn contains(&self, issue: &str, value: &Value) -> bool {
        self.values(issue)
            .map(|values| values.contains(value))
            .unwrap_or(false)
    }

    /// Number of distinct bids. Saturates instead of overflowing.
    pub fn size(&self) -> u128 {
        self.issues
            .values()
            .fold(1u128, |acc, values| acc.saturating_mul(values.len() as u128))
    }

    /// Checks that the bid assigns exactly one admissible value to every issue.
    pub fn validate(&self, bid: &Bid) -> Result<(), Error> {
        for (issue, value) in bid.iter() {
            match self.issues.get(issue) {
                None => {
                    return Err(Error::IncompleteBid(format!(
                        "issue '{}' doesn't belong to domain '{}'",
                        issue, self.name
                    )))
                }
                Some(values) if !values.contains(value) => {
                    return Err(Error::IncompleteBid(format!(
                        "value '{}' isn't admissible for issue '{}'",
                        value, issue
                    )))
                }
                Some(_) => (),
            }
        }

        if let Some(missing) = self.issues().find(|issue| bid.value(issue).is_none()) {
            return Err(Error::IncompleteBid(format!(
                "missing value for issue '{}'",
                missing
            )));
        }
        Ok(())
    }

    /// Lazily enumerates the Cartesian product of all issue values.
    pub fn all_bids(&self) -> AllBids<'_> {
        AllBids {
            domain: self,
            cursor: Some(vec![0; self.issues.len()]),
        }
    }
}

impl TryFrom<DomainDef> for Domain {
    type Error = Error;

    fn try_from(def: DomainDef) -> Result<Self, Self::Error> {
        Domain::new(def.name, def.issues)
    }
}

impl From<Domain> for DomainDef {
    fn from(domain: Domain) -> Self {
        DomainDef {
            name: domain.name,
            issues: domain.issues,
        }
    }
}

/// Odometer over value indices; the last issue changes fastest.
pub struct AllBids<'a> {
    domain: &'a Domain,
    cursor: Option<Vec<usize>>,
}

impl<'a> Iterator for AllBids<'a> {
    type Item = Bid;

    fn next(&mut self) -> Option<Bid> {
        let domain = self.domain;
        let cursor = self.cursor.as_mut()?;

        let bid = domain
            .issues
            .iter()
            .zip(cursor.iter())
            .map(|((issue, values), idx)| (issue.clone(), values[*idx].clone()))
            .collect::<Bid>();

        let mut exhausted = true;
        for (idx, values) in cursor.iter_mut().zip(domain.issues.values()).rev() {
            *idx += 1;
            if *idx < values.len() {
                exhausted = false;
                break;
            }
            *idx = 0;
        }

        if exhausted {
            self.cursor = None;
        }
        Some(bid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn example_domain() -> Domain {
        serde_yaml::from_str(
            r#"
            name: example
            issues:
              Price: [10, 20, 30]
              Color: [Red, Blue]
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_enumerates_cartesian_product() {
        let domain = example_domain();
        let bids = domain.all_bids().collect::<Vec<_>>();

        assert_eq!(domain.size(), 6);
        assert_eq!(bids.len(), 6);

        let unique = bids.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), 6);
        for bid in &bids {
            domain.validate(bid).unwrap();
        }
    }

    #[test]
    fn test_single_value_domain() {
        let domain: Domain = serde_yaml::from_str("issues: {Only: [x]}").unwrap();
        assert_eq!(domain.all_bids().count(), 1);
    }

    #[test_case("issues: {}"; "No issues")]
    #[test_case("issues: {Price: []}"; "Empty value set")]
    #[test_case("issues: {Price: [10, 20, 10]}"; "Duplicated value")]
    fn test_invalid_domain(yaml: &str) {
        assert!(serde_yaml::from_str::<Domain>(yaml).is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_bids() {
        let domain = example_domain();

        let missing = Bid::new().with("Price", "10");
        let unknown_issue = Bid::new()
            .with("Price", "10")
            .with("Color", "Red")
            .with("Size", "XL");
        let wrong_value = Bid::new().with("Price", "15").with("Color", "Red");

        for bid in [missing, unknown_issue, wrong_value] {
            assert!(matches!(
                domain.validate(&bid),
                Err(Error::IncompleteBid(_))
            ));
        }
    }
}
