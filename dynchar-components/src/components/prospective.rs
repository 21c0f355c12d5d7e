//! Prospective characterization
//!
//! Radiative efficiencies follow the scenario tables from the emission year onward,
//! the CO2 impulse response depends on the RCP and temperature responses come from the
//! two-layer model. Only CO2, CO2 uptake, CH4 and N2O have scenario data.

use super::{forcing_rows, scalar_row, Horizon, RowOptions};
use crate::registry::{Characterizer, ProspectiveMetric};
use chrono::Datelike;
use dynchar_core::errors::CharacterizationResult;
use dynchar_core::inventory::{CharacterizedRecord, EmissionRecord};
use dynchar_core::irf::Gas;
use dynchar_core::metrics::{
    convolve_temperature, integrate_forcing, two_layer_response, ProspectiveContext,
};
use dynchar_core::tables::YearClamp;
use dynchar_core::timeseries::FloatValue;

/// Characterizers with scenario-dependent data
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProspectiveCharacterizer {
    Co2,
    Co2Uptake,
    Ch4,
    N2o,
}

/// Rows produced for one record and the emission year that was actually used
#[derive(Clone, Debug, PartialEq)]
pub struct Expansion {
    pub records: Vec<CharacterizedRecord>,
    pub clamp: YearClamp,
}

impl ProspectiveCharacterizer {
    pub fn from_characterizer(characterizer: &Characterizer) -> Option<Self> {
        match characterizer {
            Characterizer::Co2 => Some(ProspectiveCharacterizer::Co2),
            Characterizer::Co2Uptake => Some(ProspectiveCharacterizer::Co2Uptake),
            Characterizer::Ch4 => Some(ProspectiveCharacterizer::Ch4),
            Characterizer::N2o => Some(ProspectiveCharacterizer::N2o),
            Characterizer::Co | Characterizer::Decay(_) | Characterizer::Custom(_) => None,
        }
    }

    pub fn gas(&self) -> Gas {
        match self {
            ProspectiveCharacterizer::Co2 | ProspectiveCharacterizer::Co2Uptake => Gas::Co2,
            ProspectiveCharacterizer::Ch4 => Gas::Ch4,
            ProspectiveCharacterizer::N2o => Gas::N2o,
        }
    }

    fn sign(&self) -> FloatValue {
        match self {
            ProspectiveCharacterizer::Co2Uptake => -1.0,
            _ => 1.0,
        }
    }

    /// Radiative forcing rows over `horizon` years
    pub fn radiative_forcing(
        &self,
        record: &EmissionRecord,
        horizon: u32,
        options: &RowOptions,
        ctx: &ProspectiveContext,
    ) -> CharacterizationResult<Expansion> {
        let (forcing, clamp) = ctx.pulse_forcing(self.gas(), record.date.year())?;
        let sign = self.sign();
        let records = forcing_rows(record, |t| sign * forcing.at(t), horizon, options)?;
        Ok(Expansion { records, clamp })
    }

    /// Prospective global warming potential row, kg CO2-eq
    pub fn pgwp(
        &self,
        record: &EmissionRecord,
        horizon: &Horizon,
        ctx: &ProspectiveContext,
    ) -> CharacterizationResult<Expansion> {
        let year = record.date.year();
        let (forcing, clamp) = ctx.pulse_forcing(self.gas(), year)?;
        let (co2, _) = ctx.pulse_forcing(Gas::Co2, year)?;

        let value = self.sign() * integrate_forcing(|t| forcing.at(t), horizon.effect)
            / integrate_forcing(|t| co2.at(t), horizon.reference);
        Ok(Expansion {
            records: scalar_row(record, horizon, record.amount * value),
            clamp,
        })
    }

    /// Prospective global temperature change potential row, kg CO2-eq
    pub fn pgtp(
        &self,
        record: &EmissionRecord,
        horizon: &Horizon,
        ctx: &ProspectiveContext,
    ) -> CharacterizationResult<Expansion> {
        let year = record.date.year();
        let (forcing, clamp) = ctx.pulse_forcing(self.gas(), year)?;
        let (co2, _) = ctx.pulse_forcing(Gas::Co2, year)?;
        let response = two_layer_response();

        let value = self.sign() * convolve_temperature(|t| forcing.at(t), horizon.effect, response)
            / convolve_temperature(|t| co2.at(t), horizon.reference, response);
        Ok(Expansion {
            records: scalar_row(record, horizon, record.amount * value),
            clamp,
        })
    }

    pub fn apply(
        &self,
        metric: ProspectiveMetric,
        record: &EmissionRecord,
        horizon: &Horizon,
        options: &RowOptions,
        ctx: &ProspectiveContext,
    ) -> CharacterizationResult<Expansion> {
        match metric {
            ProspectiveMetric::RadiativeForcing => {
                self.radiative_forcing(record, horizon.effect, options, ctx)
            }
            ProspectiveMetric::Pgwp => self.pgwp(record, horizon, ctx),
            ProspectiveMetric::Pgtp => self.pgtp(record, horizon, ctx),
        }
    }
}
