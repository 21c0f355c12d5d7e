//! Absolute global warming and temperature potentials
//!
//! Both metrics are evaluated on an annual grid with the left-rectangle rule:
//!
//! $$ AGWP(H) = \sum_{t=0}^{H-1} RE(t) f(t) $$
//! $$ AGTP(H) = \sum_{t=0}^{H-1} RE(t) f(t) R(H - t - 1) $$
//!
//! where `f` is the impulse response of the gas and `R` the temperature response to a
//! forcing pulse. Because radiative forcing rows are reported on the same annual grid,
//! the row sum for a unit pulse reproduces the AGWP exactly.
//!
//! Without a [`ProspectiveContext`] the IPCC AR6 constants and the AR5 temperature
//! response are used. With one, radiative efficiencies come from the scenario tables,
//! the CO2 impulse response depends on the RCP and the temperature response is derived
//! from the two-layer model.

use crate::climate::{TemperatureResponse, TwoLayerParameters};
use crate::errors::{CharacterizationError, CharacterizationResult};
use crate::irf::{ar6_kinetics, Gas, ImpulseResponse};
use crate::scenario::Scenario;
use crate::tables::{ScenarioTables, YearClamp, LAST_TABLE_YEAR};
use crate::timeseries::{FloatValue, Time};
use ndarray::Array1;
use std::sync::OnceLock;

/// Validate a time horizon, returning it as a number of whole years
pub fn check_horizon(time_horizon: i64) -> CharacterizationResult<u32> {
    if time_horizon <= 0 {
        return Err(CharacterizationError::InvalidHorizon(time_horizon));
    }
    u32::try_from(time_horizon).map_err(|_| CharacterizationError::InvalidHorizon(time_horizon))
}

/// AR5 temperature response used by IPCC metrics
pub fn ar5_response() -> &'static TemperatureResponse {
    static RESPONSE: OnceLock<TemperatureResponse> = OnceLock::new();
    RESPONSE.get_or_init(TemperatureResponse::ar5)
}

/// Two-layer temperature response used by prospective metrics
pub fn two_layer_response() -> &'static TemperatureResponse {
    static RESPONSE: OnceLock<TemperatureResponse> = OnceLock::new();
    RESPONSE.get_or_init(|| TemperatureResponse::from_two_layer(&TwoLayerParameters::default()))
}

/// Radiative efficiency of a pulse over its lifetime
/// unit: W / m^2 / kg
#[derive(Clone, Debug, PartialEq)]
pub enum RadiativeEfficiency {
    Constant(FloatValue),
    /// Indexed by whole elapsed years, the last value holds afterwards
    Annual(Array1<FloatValue>),
}

impl RadiativeEfficiency {
    pub fn at(&self, t: Time) -> FloatValue {
        match self {
            RadiativeEfficiency::Constant(value) => *value,
            RadiativeEfficiency::Annual(values) => {
                let index = (t.max(0.0).floor() as usize).min(values.len().saturating_sub(1));
                values.get(index).copied().unwrap_or(0.0)
            }
        }
    }
}

/// Radiative forcing caused by a 1 kg pulse of a gas
#[derive(Clone, Debug)]
pub struct PulseForcing<'a> {
    radiative_efficiency: RadiativeEfficiency,
    response: ImpulseResponse<'a>,
}

impl<'a> PulseForcing<'a> {
    pub fn new(radiative_efficiency: RadiativeEfficiency, response: ImpulseResponse<'a>) -> Self {
        Self {
            radiative_efficiency,
            response,
        }
    }

    /// IPCC AR6 forcing with constant radiative efficiency
    pub fn ipcc(gas: Gas) -> PulseForcing<'static> {
        let kinetics = ar6_kinetics();
        let per_kg = |re, molar_mass| kinetics.atmosphere.per_kg(re, molar_mass);
        let re = match gas {
            Gas::Co2 => per_kg(kinetics.co2.radiative_efficiency, kinetics.co2.molar_mass),
            Gas::Ch4 => {
                per_kg(kinetics.ch4.radiative_efficiency, kinetics.ch4.molar_mass)
                    * kinetics.ch4.indirect_multiplier
            }
            Gas::N2o => {
                per_kg(kinetics.n2o.radiative_efficiency, kinetics.n2o.molar_mass)
                    * kinetics.n2o.indirect_multiplier
            }
        };
        PulseForcing::new(
            RadiativeEfficiency::Constant(re),
            ImpulseResponse::for_gas(kinetics, gas),
        )
    }

    pub fn radiative_efficiency(&self) -> &RadiativeEfficiency {
        &self.radiative_efficiency
    }

    /// Forcing `t` years after the pulse
    /// unit: W / m^2 / kg
    pub fn at(&self, t: Time) -> FloatValue {
        self.radiative_efficiency.at(t) * self.response.fraction(t)
    }
}

/// Everything prospective metrics need beyond the IPCC constants
#[derive(Clone, Copy, Debug)]
pub struct ProspectiveContext<'a> {
    pub scenario: Scenario,
    pub tables: &'a ScenarioTables,
    /// Follow the scenario radiative efficiency over the decay period instead of
    /// holding it at the emission year value
    pub time_varying_re: bool,
}

impl<'a> ProspectiveContext<'a> {
    pub fn new(scenario: Scenario, tables: &'a ScenarioTables, time_varying_re: bool) -> Self {
        Self {
            scenario,
            tables,
            time_varying_re,
        }
    }

    /// Context backed by the bundled tables
    pub fn builtin(
        scenario: Scenario,
        time_varying_re: bool,
    ) -> CharacterizationResult<ProspectiveContext<'static>> {
        Ok(ProspectiveContext::new(
            scenario,
            ScenarioTables::builtin()?,
            time_varying_re,
        ))
    }

    /// Forcing of a 1 kg pulse emitted in `emission_year`.
    ///
    /// The emission year is clamped into the range with scenario data and the returned
    /// [`YearClamp`] records whether that happened. Nothing is logged here.
    pub fn pulse_forcing(
        &self,
        gas: Gas,
        emission_year: i32,
    ) -> CharacterizationResult<(PulseForcing<'a>, YearClamp)> {
        let kinetics = ar6_kinetics();
        let (molar_mass, multiplier) = match gas {
            Gas::Co2 => (kinetics.co2.molar_mass, 1.0),
            Gas::Ch4 => (kinetics.ch4.molar_mass, kinetics.ch4.indirect_multiplier),
            Gas::N2o => (kinetics.n2o.molar_mass, kinetics.n2o.indirect_multiplier),
        };
        let to_per_kg =
            |re_ppb: FloatValue| kinetics.atmosphere.per_kg(re_ppb, molar_mass) * multiplier;

        let tables = self.tables;
        let clamp = YearClamp::new(emission_year);
        let series = tables.radiative_efficiency(&self.scenario)?.series(gas);
        let radiative_efficiency = if self.time_varying_re {
            let values = (clamp.effective..=LAST_TABLE_YEAR)
                .map(|year| to_per_kg(series.at(year)))
                .collect();
            RadiativeEfficiency::Annual(values)
        } else {
            RadiativeEfficiency::Constant(to_per_kg(series.at(clamp.effective)))
        };

        let response = match gas {
            Gas::Co2 => ImpulseResponse::MultiExponential(tables.co2_irf(&self.scenario)?),
            Gas::Ch4 => ImpulseResponse::Exponential(&kinetics.ch4),
            Gas::N2o => ImpulseResponse::Exponential(&kinetics.n2o),
        };

        Ok((PulseForcing::new(radiative_efficiency, response), clamp))
    }
}

/// Integrate a per-kg forcing over `horizon` annual steps
pub fn integrate_forcing<F: Fn(Time) -> FloatValue>(forcing: F, horizon: u32) -> FloatValue {
    (0..horizon).map(|t| forcing(t as Time)).sum()
}

/// Temperature change `horizon` years after a pulse with the given per-kg forcing
pub fn convolve_temperature<F: Fn(Time) -> FloatValue>(
    forcing: F,
    horizon: u32,
    response: &TemperatureResponse,
) -> FloatValue {
    (0..horizon)
        .map(|t| forcing(t as Time) * response.at((horizon - t - 1) as Time))
        .sum()
}

/// AGWP of a 1 kg pulse
/// unit: W yr / m^2 / kg
pub fn agwp(
    gas: Gas,
    emission_year: i32,
    time_horizon: i64,
    ctx: Option<&ProspectiveContext>,
) -> CharacterizationResult<FloatValue> {
    let horizon = check_horizon(time_horizon)?;
    let forcing = match ctx {
        Some(ctx) => {
            let (forcing, clamp) = ctx.pulse_forcing(gas, emission_year)?;
            clamp.warn_if_clamped();
            forcing
        }
        None => PulseForcing::ipcc(gas),
    };
    Ok(integrate_forcing(|t| forcing.at(t), horizon))
}

/// AGTP of a 1 kg pulse
/// unit: K / kg
pub fn agtp(
    gas: Gas,
    emission_year: i32,
    time_horizon: i64,
    ctx: Option<&ProspectiveContext>,
) -> CharacterizationResult<FloatValue> {
    let horizon = check_horizon(time_horizon)?;
    let (forcing, response) = match ctx {
        Some(ctx) => {
            let (forcing, clamp) = ctx.pulse_forcing(gas, emission_year)?;
            clamp.warn_if_clamped();
            (forcing, two_layer_response())
        }
        None => (PulseForcing::ipcc(gas), ar5_response()),
    };
    Ok(convolve_temperature(|t| forcing.at(t), horizon, response))
}

fn standalone<F>(scenario: Option<&Scenario>, f: F) -> CharacterizationResult<FloatValue>
where
    F: FnOnce(Option<&ProspectiveContext>) -> CharacterizationResult<FloatValue>,
{
    match scenario {
        Some(scenario) => f(Some(&ProspectiveContext::builtin(*scenario, false)?)),
        None => f(None),
    }
}

/// AGWP of CO2, prospective when a scenario is given
pub fn agwp_co2(
    emission_year: i32,
    time_horizon: i64,
    scenario: Option<&Scenario>,
) -> CharacterizationResult<FloatValue> {
    standalone(scenario, |ctx| agwp(Gas::Co2, emission_year, time_horizon, ctx))
}

pub fn agwp_ch4(
    emission_year: i32,
    time_horizon: i64,
    scenario: Option<&Scenario>,
) -> CharacterizationResult<FloatValue> {
    standalone(scenario, |ctx| agwp(Gas::Ch4, emission_year, time_horizon, ctx))
}

pub fn agwp_n2o(
    emission_year: i32,
    time_horizon: i64,
    scenario: Option<&Scenario>,
) -> CharacterizationResult<FloatValue> {
    standalone(scenario, |ctx| agwp(Gas::N2o, emission_year, time_horizon, ctx))
}

/// AGTP of CO2, prospective when a scenario is given
pub fn agtp_co2(
    emission_year: i32,
    time_horizon: i64,
    scenario: Option<&Scenario>,
) -> CharacterizationResult<FloatValue> {
    standalone(scenario, |ctx| agtp(Gas::Co2, emission_year, time_horizon, ctx))
}

pub fn agtp_ch4(
    emission_year: i32,
    time_horizon: i64,
    scenario: Option<&Scenario>,
) -> CharacterizationResult<FloatValue> {
    standalone(scenario, |ctx| agtp(Gas::Ch4, emission_year, time_horizon, ctx))
}

pub fn agtp_n2o(
    emission_year: i32,
    time_horizon: i64,
    scenario: Option<&Scenario>,
) -> CharacterizationResult<FloatValue> {
    standalone(scenario, |ctx| agtp(Gas::N2o, emission_year, time_horizon, ctx))
}
