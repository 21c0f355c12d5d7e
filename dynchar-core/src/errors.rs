use crate::scenario::Scenario;
use thiserror::Error;

/// Error type for characterization operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CharacterizationError {
    #[error("{0}")]
    Error(String),
    #[error("No scenario set. Call set_scenario(iam, ssp, rcp) or pass a scenario before requesting prospective metrics")]
    MissingScenario,
    #[error("Invalid scenario combination: ({iam}, {ssp}, {rcp}). Valid combinations: IMAGE-SSP1-{{2.6,4.5}}, AIM-SSP3-{{4.5,6.0}}, GCAM4-SSP4-{{2.6,4.5,6.0}}, MESSAGE-SSP2-{{4.5,6.0}}, REMIND-SSP5-{{4.5,8.5}}")]
    InvalidScenario {
        iam: String,
        ssp: String,
        rcp: String,
    },
    #[error("Time horizon must be a positive number of years, got {0}")]
    InvalidHorizon(i64),
    #[error("No radiative efficiency table loaded for scenario {0}")]
    MissingScenarioData(Scenario),
    #[error("Invalid scenario table: {0}")]
    InvalidTable(String),
    #[error("Unknown metric '{0}'. Expected one of radiative_forcing, GWP, prospective_radiative_forcing, pGWP, pGTP")]
    UnknownMetric(String),
}

/// Convenience type for `Result<T, CharacterizationError>`.
pub type CharacterizationResult<T> = Result<T, CharacterizationError>;
