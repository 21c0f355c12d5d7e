//! Impulse response functions
//!
//! Fraction of a unit pulse emission remaining in the atmosphere after `t` years, and
//! its rate of change. All functions are pure and require `t >= 0`.

use crate::kinetics::{Co2Kinetics, ExponentialKinetics, GasKinetics};
use crate::timeseries::{FloatValue, Time};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Gases with a dedicated kinetics model
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gas {
    #[serde(rename = "CO2")]
    Co2,
    #[serde(rename = "CH4")]
    Ch4,
    #[serde(rename = "N2O")]
    N2o,
}

impl Gas {
    pub const ALL: [Gas; 3] = [Gas::Co2, Gas::Ch4, Gas::N2o];
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gas::Co2 => "CO2",
            Gas::Ch4 => "CH4",
            Gas::N2o => "N2O",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Gas {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CO2" => Ok(Gas::Co2),
            "CH4" => Ok(Gas::Ch4),
            "N2O" => Ok(Gas::N2o),
            _ => Err(()),
        }
    }
}

/// The AR6 kinetics, shared read-only by every characterization call
pub fn ar6_kinetics() -> &'static GasKinetics {
    static KINETICS: OnceLock<GasKinetics> = OnceLock::new();
    KINETICS.get_or_init(GasKinetics::default)
}

/// An impulse response borrowed from a kinetics parameter set
#[derive(Copy, Clone, Debug)]
pub enum ImpulseResponse<'a> {
    MultiExponential(&'a Co2Kinetics),
    Exponential(&'a ExponentialKinetics),
}

impl<'a> ImpulseResponse<'a> {
    pub fn for_gas(kinetics: &'a GasKinetics, gas: Gas) -> Self {
        match gas {
            Gas::Co2 => ImpulseResponse::MultiExponential(&kinetics.co2),
            Gas::Ch4 => ImpulseResponse::Exponential(&kinetics.ch4),
            Gas::N2o => ImpulseResponse::Exponential(&kinetics.n2o),
        }
    }

    pub fn fraction(&self, t: Time) -> FloatValue {
        debug_assert!(t >= 0.0, "elapsed time must be non-negative, got {t}");
        match self {
            ImpulseResponse::MultiExponential(co2) => co2.fraction(t),
            ImpulseResponse::Exponential(kinetics) => kinetics.fraction(t),
        }
    }

    pub fn rate(&self, t: Time) -> FloatValue {
        debug_assert!(t >= 0.0, "elapsed time must be non-negative, got {t}");
        match self {
            ImpulseResponse::MultiExponential(co2) => co2.rate(t),
            ImpulseResponse::Exponential(kinetics) => kinetics.rate(t),
        }
    }
}

/// Fraction of a pulse of `gas` remaining after `elapsed` years (AR6 kinetics)
pub fn decay_fraction(gas: Gas, elapsed: Time) -> FloatValue {
    ImpulseResponse::for_gas(ar6_kinetics(), gas).fraction(elapsed)
}

/// Rate of change of [`decay_fraction`] in yr^-1
pub fn decay_rate(gas: Gas, elapsed: Time) -> FloatValue {
    ImpulseResponse::for_gas(ar6_kinetics(), gas).rate(elapsed)
}

/// Vectorised [`decay_fraction`]
pub fn decay_fractions(gas: Gas, elapsed: &Array1<Time>) -> Array1<FloatValue> {
    let response = ImpulseResponse::for_gas(ar6_kinetics(), gas);
    elapsed.mapv(|t| response.fraction(t))
}

/// Vectorised [`decay_rate`]
pub fn decay_rates(gas: Gas, elapsed: &Array1<Time>) -> Array1<FloatValue> {
    let response = ImpulseResponse::for_gas(ar6_kinetics(), gas);
    elapsed.mapv(|t| response.rate(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;
    use ndarray::Array;

    #[test]
    fn test_unit_fraction_at_emission() {
        for gas in Gas::ALL {
            assert!(
                is_close!(decay_fraction(gas, 0.0), 1.0),
                "{gas} should start at 1"
            );
        }
    }

    #[test]
    fn test_strictly_decreasing() {
        let elapsed = Array::range(0.0, 500.0, 0.5);
        for gas in Gas::ALL {
            let fractions = decay_fractions(gas, &elapsed);
            for pair in fractions.windows(2) {
                assert!(pair[1] < pair[0], "{gas} fraction increased");
            }
            assert!(fractions.iter().all(|f| *f > 0.0 && *f <= 1.0));
        }
    }

    #[test]
    fn test_rates_are_negative() {
        let elapsed = Array::range(0.0, 200.0, 1.0);
        for gas in Gas::ALL {
            assert!(decay_rates(gas, &elapsed).iter().all(|r| *r < 0.0));
        }
    }

    #[test]
    fn test_ch4_one_year_decay() {
        // exp(-1/11.8)
        assert!((decay_fraction(Gas::Ch4, 1.0) - 0.918746).abs() < 1e-6);
    }

    #[test]
    fn test_co2_long_term_airborne_fraction() {
        let fraction = decay_fraction(Gas::Co2, 1e5);
        assert!((fraction - 0.2173).abs() < 1e-6);
    }
}
