//! Per-record characterization functions
//!
//! Each function expands a single [`EmissionRecord`] into characterized rows. Forcing
//! metrics produce one row per step of a [`TimeGrid`] starting at the emission date;
//! relative metrics produce a single row at the emission date.

pub mod ipcc_ar6;
pub mod prospective;

pub use prospective::{Expansion, ProspectiveCharacterizer};

use dynchar_core::errors::{CharacterizationError, CharacterizationResult};
use dynchar_core::inventory::{CharacterizedRecord, EmissionRecord};
use dynchar_core::timeseries::{FloatValue, Resolution, Time, TimeGrid};

/// Time horizons applied to one record
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Horizon {
    /// Years of effect counted for this record
    pub effect: u32,
    /// Horizon of the CO2 reference used by relative metrics
    pub reference: u32,
}

impl Horizon {
    pub fn new(time_horizon: u32) -> Self {
        Self {
            effect: time_horizon,
            reference: time_horizon,
        }
    }
}

/// Options shaping radiative forcing rows
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RowOptions {
    pub resolution: Resolution,
    /// Report the running integral of forcing instead of the instantaneous value
    pub cumulative: bool,
}

/// Expand a record into radiative forcing rows.
///
/// `unit_forcing` is the forcing of a 1 kg pulse in W m^-2 kg^-1. Fails with
/// [`CharacterizationError::InvalidHorizon`] if the horizon ends past the last
/// representable date.
pub fn forcing_rows<F: Fn(Time) -> FloatValue>(
    record: &EmissionRecord,
    unit_forcing: F,
    horizon: u32,
    options: &RowOptions,
) -> CharacterizationResult<Vec<CharacterizedRecord>> {
    let grid = TimeGrid::new(record.date, horizon, options.resolution)
        .ok_or(CharacterizationError::InvalidHorizon(i64::from(horizon)))?;
    let step = grid.resolution().step();
    let mut total = 0.0;

    let rows = grid
        .iter()
        .map(|point| {
            let forcing = record.amount * unit_forcing(point.elapsed);
            let amount = if options.cumulative {
                total += forcing * step;
                total
            } else {
                forcing
            };
            record.characterized(point.date, amount)
        })
        .collect();
    Ok(rows)
}

/// A single row at the emission date, skipped when the record has no horizon left
pub fn scalar_row(
    record: &EmissionRecord,
    horizon: &Horizon,
    amount: FloatValue,
) -> Vec<CharacterizedRecord> {
    if horizon.effect == 0 {
        return vec![];
    }
    vec![record.characterized(record.date, amount)]
}
