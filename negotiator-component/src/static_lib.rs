use anyhow::anyhow;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sao_domain_utils::Profile;

use crate::component::NegotiatorComponent;

pub type BoxedNegotiator = Box<dyn NegotiatorComponent + Send + Sync>;

pub type ConstructorFunction = Box<
    dyn Fn(&str, serde_yaml::Value, Arc<Profile>) -> anyhow::Result<BoxedNegotiator>
        + Send
        + Sync,
>;

/// Implemented by negotiators that can be constructed from YAML params.
pub trait NegotiatorFactory<T> {
    fn new(name: &str, config: serde_yaml::Value, profile: Arc<Profile>) -> anyhow::Result<T>;
}

lazy_static! {
    /// Contains functions that can create negotiators by name.
    static ref CONSTRUCTORS: Arc<Mutex<HashMap<String, ConstructorFunction>>> = Arc::new(Mutex::new(HashMap::new()));
}

/// Wraps `NegotiatorFactory` implementation into registrable constructor.
pub fn factory<T>() -> ConstructorFunction
where
    T: NegotiatorFactory<T> + NegotiatorComponent + Send + Sync + 'static,
{
    Box::new(
        |name: &str,
         config: serde_yaml::Value,
         profile: Arc<Profile>|
         -> anyhow::Result<BoxedNegotiator> {
            Ok(Box::new(T::new(name, config, profile)?))
        },
    )
}

pub fn register_negotiator(
    library: &str,
    name: &str,
    constructor: ConstructorFunction,
) -> anyhow::Result<()> {
    let name_path = format!("{}::{}", library, name);
    log::debug!("Registering negotiator [{}].", name_path);

    (*CONSTRUCTORS)
        .lock()
        .map_err(|e| anyhow!("Failed to acquire static Negotiator registration lock: {}", e))?
        .insert(name_path, constructor);
    Ok(())
}

pub fn create_static_negotiator(
    name_path: &str,
    config: serde_yaml::Value,
    profile: Arc<Profile>,
) -> anyhow::Result<BoxedNegotiator> {
    let map = (*CONSTRUCTORS)
        .lock()
        .map_err(|e| anyhow!("Failed to acquire static Negotiator creation lock: {}", e))?;

    match map.get(name_path) {
        Some(constructor) => constructor(name_path, config, profile),
        None => Err(anyhow!("Negotiator '{}' not found.", name_path)),
    }
}
