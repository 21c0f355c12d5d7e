pub mod climate;
pub mod errors;
pub mod inventory;
pub mod irf;
pub mod kinetics;
pub mod metrics;
#[cfg(feature = "python")]
pub mod python;
pub mod scenario;
pub mod tables;
pub mod timeseries;
