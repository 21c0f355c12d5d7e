pub mod characterize;
pub mod components;
pub mod method;
#[cfg(feature = "python")]
pub mod python;
pub mod registry;
