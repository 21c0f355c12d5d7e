//! Dynamic and prospective characterization of greenhouse gas emission inventories.
//!
//! Each emission of a dynamic inventory is treated as a pulse and expanded into its
//! radiative forcing over time, or into a GWP or GTP value relative to CO2. Prospective
//! metrics take the evolution of the atmosphere under an IAM-SSP-RCP scenario into
//! account.

pub use dynchar_components::characterize::{
    characterize, characterize_with_tables, CharacterizationWarning, CharacterizeOptions,
    CharacterizedInventory, FunctionSource,
};
pub use dynchar_components::registry::{
    CharacterizationFunction, Characterizer, DecaySeries, Metric,
};
pub use dynchar_core::errors::{CharacterizationError, CharacterizationResult};
pub use dynchar_core::inventory::{CharacterizedRecord, EmissionRecord};
pub use dynchar_core::scenario::{get_scenario, reset_scenario, set_scenario, Scenario};

#[cfg(feature = "python")]
mod python;
