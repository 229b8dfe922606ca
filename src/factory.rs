use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use sao_builtin_negotiators::{presets, FrequencyNegotiator};
use sao_domain_utils::Profile;
use sao_negotiator_component::static_lib::{create_static_negotiator, NegotiatorFactory};
use sao_negotiator_component::BoxedNegotiator;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub enum LoadMode {
    BuiltIn,
    StaticLib { library: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NegotiatorConfig {
    pub name: String,
    pub load_mode: LoadMode,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

impl NegotiatorConfig {
    pub fn builtin(name: &str) -> NegotiatorConfig {
        NegotiatorConfig {
            name: name.to_string(),
            load_mode: LoadMode::BuiltIn,
            params: serde_yaml::Value::Null,
        }
    }

    pub fn with_params(mut self, params: serde_yaml::Value) -> NegotiatorConfig {
        self.params = params;
        self
    }

    pub fn load(path: &Path) -> anyhow::Result<NegotiatorConfig> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Reading negotiator config: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Parsing negotiator config: {}", path.display()))
    }
}

pub fn create_negotiator(
    config: NegotiatorConfig,
    profile: Arc<Profile>,
) -> anyhow::Result<BoxedNegotiator> {
    let name = config.name;
    log::debug!(
        "Creating negotiator [{}] ({:?}) for profile '{}'.",
        name,
        config.load_mode,
        profile.name()
    );

    match config.load_mode {
        LoadMode::BuiltIn => create_builtin(&name, config.params, profile),
        LoadMode::StaticLib { library } => {
            create_static_negotiator(&format!("{}::{}", library, name), config.params, profile)
        }
    }
}

pub fn create_builtin(
    name: &str,
    params: serde_yaml::Value,
    profile: Arc<Profile>,
) -> anyhow::Result<BoxedNegotiator> {
    if !presets::PRESETS.contains(&name) {
        bail!("BuiltIn negotiator {} doesn't exists.", name);
    }

    let negotiator = <FrequencyNegotiator as NegotiatorFactory<_>>::new(name, params, profile)?;
    Ok(Box::new(negotiator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sao_negotiator_component::SessionSettings;
    use std::path::PathBuf;

    fn profile() -> Arc<Profile> {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("assets")
            .join("domain00")
            .join("profileA.yaml");
        Arc::new(Profile::load(&path).unwrap())
    }

    #[test]
    fn test_negotiator_config() {
        let config = NegotiatorConfig::builtin("Frequency")
            .with_params(serde_yaml::from_str("{concession: {step: 0.02}, seed: 7}").unwrap());

        let serialized = serde_yaml::to_string(&config).unwrap();
        let deserialized: NegotiatorConfig = serde_yaml::from_str(&serialized).unwrap();
        assert_eq!(deserialized, config);

        let negotiator = create_negotiator(deserialized, profile()).unwrap();
        assert!(negotiator
            .start(&SessionSettings {
                deadline_rounds: 50
            })
            .is_ok());
    }

    #[test]
    fn test_static_lib_config_format() {
        let config: NegotiatorConfig = serde_yaml::from_str(
            r#"
            name: Similarity
            load_mode: !StaticLib
              library: sao-negotiators
            "#,
        )
        .unwrap();

        assert_eq!(
            config.load_mode,
            LoadMode::StaticLib {
                library: "sao-negotiators".to_string()
            }
        );
        assert_eq!(config.params, serde_yaml::Value::Null);
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(create_negotiator(NegotiatorConfig::builtin("AcceptAll"), profile()).is_err());
    }
}
