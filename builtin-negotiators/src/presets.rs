use anyhow::{anyhow, Context};
use serde_yaml::Value;

use sao_negotiator_component::{AcceptanceBar, ConcessionConfig, OpponentConfig, SelectorConfig};
use sao_negotiator_component::{ShortlistPick, StrategyConfig};

/// Gentle concession driven by opponent similarity only in the early phase.
pub const FREQUENCY: &str = "Frequency";
/// Strong reaction to opponent similarity during the whole session.
pub const SIMILARITY: &str = "Similarity";
/// Time decaying acceptance with randomized shortlist pick.
pub const TIME_DECAY: &str = "TimeDecay";

pub const PRESETS: &[&str] = &[FREQUENCY, SIMILARITY, TIME_DECAY];

pub fn preset(name: &str) -> Option<StrategyConfig> {
    let config = match name {
        FREQUENCY => StrategyConfig {
            concession: ConcessionConfig {
                similarity_until: Some(0.25),
                ..ConcessionConfig::default()
            },
            opponent: OpponentConfig {
                average_over_issues: true,
                ..OpponentConfig::default()
            },
            ..StrategyConfig::default()
        },
        SIMILARITY => StrategyConfig {
            concession: ConcessionConfig {
                similarity_scale: 5.0,
                ..ConcessionConfig::default()
            },
            ..StrategyConfig::default()
        },
        TIME_DECAY => StrategyConfig {
            acceptance: AcceptanceBar::TimeDecay {
                start: 0.9,
                end: 0.7,
            },
            selector: SelectorConfig {
                pick: ShortlistPick::Random,
                ..SelectorConfig::default()
            },
            ..StrategyConfig::default()
        },
        _ => return None,
    };
    Some(config)
}

/// Preset named by the last segment of `name` with `params` merged on top.
/// Accepts both `Frequency` and `library::Frequency`.
pub fn resolve(name: &str, params: Value) -> anyhow::Result<StrategyConfig> {
    let short = name.rsplit("::").next().unwrap_or(name);
    let base = preset(short).ok_or_else(|| {
        anyhow!(
            "Unknown negotiator preset '{}'. Available: {}.",
            short,
            PRESETS.join(", ")
        )
    })?;

    let mut merged = serde_yaml::to_value(&base)?;
    merge(&mut merged, params);

    StrategyConfig::from_yaml(merged)
        .with_context(|| format!("Invalid params for negotiator '{}'.", name))
}

/// Recursively overwrites `base` with `overrides`. Mappings are merged key by key,
/// any other value replaces the original. Null overrides are ignored.
pub fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}
