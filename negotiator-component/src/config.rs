use anyhow::bail;
use serde::{Deserialize, Serialize};

use sao_domain_utils::Profile;

use crate::concession::ConcessionConfig;
use crate::decision::AcceptanceBar;
use crate::opponent::OpponentConfig;
use crate::selector::SelectorConfig;

/// Complete parametrization of the frequency based strategy.
/// All fields have defaults, so an empty YAML mapping is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Used when profile defines neither reservation value nor reservation bid.
    pub default_reservation: f64,
    pub concession: ConcessionConfig,
    pub selector: SelectorConfig,
    pub opponent: OpponentConfig,
    pub acceptance: AcceptanceBar,
    /// Keep only this many best bids in memory. Whole domain is kept if unset.
    pub max_working_set: Option<usize>,
    /// Seed for randomized shortlist pick.
    pub seed: Option<u64>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            default_reservation: 0.6,
            concession: ConcessionConfig::default(),
            selector: SelectorConfig::default(),
            opponent: OpponentConfig::default(),
            acceptance: AcceptanceBar::default(),
            max_working_set: None,
            seed: None,
        }
    }
}

impl StrategyConfig {
    pub fn from_yaml(params: serde_yaml::Value) -> anyhow::Result<StrategyConfig> {
        let config: StrategyConfig = match params {
            serde_yaml::Value::Null => StrategyConfig::default(),
            params => serde_yaml::from_value(params)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reservation value: explicit profile value, then utility of profile
    /// reservation bid, then `default_reservation`.
    pub fn reservation_for(&self, profile: &Profile) -> f64 {
        profile
            .reservation_value()
            .unwrap_or(self.default_reservation)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.default_reservation) {
            bail!(
                "Default reservation value {} not in [0, 1].",
                self.default_reservation
            );
        }
        if self.max_working_set == Some(0) {
            bail!("Working set can't be empty.");
        }

        self.concession.validate()?;
        self.selector.validate()?;
        self.acceptance.validate()?;

        if !(0.0..=1.0).contains(&self.opponent.hardliner_ratio) {
            bail!(
                "Hardliner ratio {} not in [0, 1].",
                self.opponent.hardliner_ratio
            );
        }
        Ok(())
    }
}
