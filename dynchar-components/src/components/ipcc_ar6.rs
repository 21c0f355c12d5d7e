//! IPCC AR6 characterization
//!
//! Radiative efficiencies and impulse responses are the AR6 constants, independent of
//! the emission year. GWP and GTP are normalised by CO2 at the reference horizon.

use super::{forcing_rows, scalar_row, Horizon, RowOptions};
use crate::registry::{Characterizer, IpccMetric};
use dynchar_core::errors::CharacterizationResult;
use dynchar_core::inventory::{CharacterizedRecord, EmissionRecord};
use dynchar_core::irf::{ar6_kinetics, Gas};
use dynchar_core::kinetics::MOLAR_MASS_CO;
use dynchar_core::metrics::{ar5_response, convolve_temperature, integrate_forcing, PulseForcing};
use dynchar_core::timeseries::{FloatValue, Time};

/// IPCC forcing of a 1 kg pulse
/// unit: W / m^2 / kg
pub fn unit_forcing(characterizer: &Characterizer, t: Time) -> FloatValue {
    match characterizer {
        Characterizer::Co2 => PulseForcing::ipcc(Gas::Co2).at(t),
        Characterizer::Co2Uptake => -PulseForcing::ipcc(Gas::Co2).at(t),
        Characterizer::Ch4 => PulseForcing::ipcc(Gas::Ch4).at(t),
        Characterizer::N2o => PulseForcing::ipcc(Gas::N2o).at(t),
        Characterizer::Co => co2_per_co() * PulseForcing::ipcc(Gas::Co2).at(t),
        Characterizer::Decay(series) => series.at(t),
        Characterizer::Custom(function) => function.forcing(t),
    }
}

/// kg of CO2 formed per kg of CO oxidised
fn co2_per_co() -> FloatValue {
    ar6_kinetics().co2.molar_mass / MOLAR_MASS_CO
}

/// Radiative forcing rows over `horizon` years
pub fn radiative_forcing(
    characterizer: &Characterizer,
    record: &EmissionRecord,
    horizon: u32,
    options: &RowOptions,
) -> CharacterizationResult<Vec<CharacterizedRecord>> {
    forcing_rows(record, |t| unit_forcing(characterizer, t), horizon, options)
}

/// AGWP of a 1 kg pulse on the annual grid
pub fn agwp(characterizer: &Characterizer, horizon: u32) -> FloatValue {
    integrate_forcing(|t| unit_forcing(characterizer, t), horizon)
}

/// AGTP of a 1 kg pulse using the AR5 temperature response
pub fn agtp(characterizer: &Characterizer, horizon: u32) -> FloatValue {
    convolve_temperature(|t| unit_forcing(characterizer, t), horizon, ar5_response())
}

/// Global warming potential row, kg CO2-eq
pub fn gwp(
    characterizer: &Characterizer,
    record: &EmissionRecord,
    horizon: &Horizon,
) -> Vec<CharacterizedRecord> {
    let value = agwp(characterizer, horizon.effect) / agwp(&Characterizer::Co2, horizon.reference);
    scalar_row(record, horizon, record.amount * value)
}

/// Global temperature change potential row, kg CO2-eq
pub fn gtp(
    characterizer: &Characterizer,
    record: &EmissionRecord,
    horizon: &Horizon,
) -> Vec<CharacterizedRecord> {
    let value = agtp(characterizer, horizon.effect) / agtp(&Characterizer::Co2, horizon.reference);
    scalar_row(record, horizon, record.amount * value)
}

/// Apply an IPCC computation to one record
pub fn apply(
    characterizer: &Characterizer,
    metric: IpccMetric,
    record: &EmissionRecord,
    horizon: &Horizon,
    options: &RowOptions,
) -> CharacterizationResult<Vec<CharacterizedRecord>> {
    match metric {
        IpccMetric::RadiativeForcing => {
            radiative_forcing(characterizer, record, horizon.effect, options)
        }
        IpccMetric::Gwp => Ok(gwp(characterizer, record, horizon)),
        IpccMetric::Gtp => Ok(gtp(characterizer, record, horizon)),
    }
}
