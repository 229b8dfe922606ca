pub mod frequency;
pub mod presets;

pub use frequency::FrequencyNegotiator;

use sao_negotiator_component::static_lib::{factory, register_negotiator};

/// Library name under which built-in presets are registered.
pub const LIBRARY: &str = "sao-negotiators";

pub fn register_negotiators() -> anyhow::Result<()> {
    for preset in presets::PRESETS {
        register_negotiator(LIBRARY, preset, factory::<FrequencyNegotiator>())?;
    }
    Ok(())
}
