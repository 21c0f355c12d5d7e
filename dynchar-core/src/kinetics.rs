//! Gas kinetics parameters
//!
//! Constant per-gas coefficient sets used by the impulse response functions and the
//! AGWP/AGTP calculators. Defaults follow IPCC AR6 Chapter 7 (Table 7.15 and the
//! supplementary material).
//!
//! Radiative efficiencies are given per ppb of atmospheric mixing ratio and converted
//! to per-kg values using the mass of the atmosphere:
//!
//! $$ RE_{kg} = RE_{ppb} \cdot \frac{M_{air}}{M_{gas}} \cdot \frac{10^9}{m_{atm}} $$

use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Indirect forcing multiplier for methane
///
/// Accounts for tropospheric ozone production and stratospheric water vapour from CH4
/// oxidation. Applied identically to fossil and non-fossil methane.
pub const CH4_INDIRECT_MULTIPLIER: FloatValue = 1.43;

/// Molar mass of CO, used to rescale CO2 forcing for carbon monoxide
/// unit: g/mol
pub const MOLAR_MASS_CO: FloatValue = 28.01;

/// Properties of the well-mixed atmosphere used for unit conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Atmosphere {
    /// Mean molar mass of dry air
    /// unit: g/mol
    /// default: 28.97
    pub molar_mass_air: FloatValue,
    /// Total mass of the atmosphere (Trenberth and Smith, 2005)
    /// unit: kg
    /// default: 5.135e18
    pub mass: FloatValue,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            molar_mass_air: 28.97,
            mass: 5.135e18,
        }
    }
}

impl Atmosphere {
    /// Convert a radiative efficiency from W m^-2 ppb^-1 to W m^-2 kg^-1
    pub fn per_kg(
        &self,
        radiative_efficiency_ppb: FloatValue,
        molar_mass: FloatValue,
    ) -> FloatValue {
        radiative_efficiency_ppb * self.molar_mass_air / molar_mass * 1e9 / self.mass
    }
}

/// Multi-exponential CO2 impulse response (Joos et al., 2013)
///
/// $$ f(t) = a_0 + \sum_{i=1}^{3} a_i e^{-t/\tau_i} $$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Co2Kinetics {
    /// Fraction remaining indefinitely
    /// default: 0.2173
    pub a0: FloatValue,
    /// Weights of the decaying terms
    /// default: [0.2240, 0.2824, 0.2763]
    pub weights: [FloatValue; 3],
    /// Time constants of the decaying terms
    /// unit: years
    /// default: [394.4, 36.54, 4.304]
    pub lifetimes: [FloatValue; 3],
    /// Radiative efficiency at 2019 background concentration
    /// unit: W / m^2 / ppb
    /// default: 1.33e-5
    pub radiative_efficiency: FloatValue,
    /// unit: g/mol
    /// default: 44.01
    pub molar_mass: FloatValue,
}

impl Default for Co2Kinetics {
    fn default() -> Self {
        Self {
            a0: 0.2173,
            weights: [0.2240, 0.2824, 0.2763],
            lifetimes: [394.4, 36.54, 4.304],
            radiative_efficiency: 1.33e-5,
            molar_mass: 44.01,
        }
    }
}

impl Co2Kinetics {
    /// Fraction of a pulse remaining after `t` years
    pub fn fraction(&self, t: FloatValue) -> FloatValue {
        self.a0
            + self
                .weights
                .iter()
                .zip(self.lifetimes.iter())
                .map(|(a, tau)| a * (-t / tau).exp())
                .sum::<FloatValue>()
    }

    /// Time derivative of [`Co2Kinetics::fraction`]
    pub fn rate(&self, t: FloatValue) -> FloatValue {
        -self
            .weights
            .iter()
            .zip(self.lifetimes.iter())
            .map(|(a, tau)| a / tau * (-t / tau).exp())
            .sum::<FloatValue>()
    }

    /// Sum of all weights, 1 for a mass-conserving parameterisation
    pub fn total_weight(&self) -> FloatValue {
        self.a0 + self.weights.iter().sum::<FloatValue>()
    }
}

/// Single-exponential decay with an optional indirect forcing multiplier
///
/// $$ f(t) = e^{-t/\tau} $$
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExponentialKinetics {
    /// Perturbation lifetime
    /// unit: years
    pub lifetime: FloatValue,
    /// Direct radiative efficiency
    /// unit: W / m^2 / ppb
    pub radiative_efficiency: FloatValue,
    /// unit: g/mol
    pub molar_mass: FloatValue,
    /// Scalar applied on top of direct forcing
    pub indirect_multiplier: FloatValue,
}

impl ExponentialKinetics {
    /// AR6 methane: 11.8 year lifetime.
    ///
    /// The direct radiative efficiency is chosen so that, together with the indirect
    /// multiplier, it reproduces the 5.7e-4 W m^-2 ppb^-1 of AR6 Table 7.15.
    pub fn ch4() -> Self {
        Self {
            lifetime: 11.8,
            radiative_efficiency: 5.7e-4 / CH4_INDIRECT_MULTIPLIER,
            molar_mass: 16.04,
            indirect_multiplier: CH4_INDIRECT_MULTIPLIER,
        }
    }

    /// AR6 nitrous oxide: 109 year lifetime
    pub fn n2o() -> Self {
        Self {
            lifetime: 109.0,
            radiative_efficiency: 2.8e-3,
            molar_mass: 44.01,
            indirect_multiplier: 1.0,
        }
    }

    pub fn fraction(&self, t: FloatValue) -> FloatValue {
        (-t / self.lifetime).exp()
    }

    pub fn rate(&self, t: FloatValue) -> FloatValue {
        -(-t / self.lifetime).exp() / self.lifetime
    }
}

/// Complete set of kinetics for the gases with dedicated characterization paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GasKinetics {
    pub atmosphere: Atmosphere,
    pub co2: Co2Kinetics,
    pub ch4: ExponentialKinetics,
    pub n2o: ExponentialKinetics,
}

impl Default for GasKinetics {
    fn default() -> Self {
        Self {
            atmosphere: Atmosphere::default(),
            co2: Co2Kinetics::default(),
            ch4: ExponentialKinetics::ch4(),
            n2o: ExponentialKinetics::n2o(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn test_co2_weights_sum_to_one() {
        let co2 = Co2Kinetics::default();
        assert!(is_close!(co2.total_weight(), 1.0));
        assert!(is_close!(co2.fraction(0.0), 1.0));
    }

    #[test]
    fn test_co2_per_kg_radiative_efficiency() {
        let kinetics = GasKinetics::default();
        let re = kinetics
            .atmosphere
            .per_kg(kinetics.co2.radiative_efficiency, kinetics.co2.molar_mass);
        // ~1.7e-15 W/m2/kg (AR6 AGWP-CO2 building block)
        assert!((re - 1.705e-15).abs() < 1e-17, "got {re}");
    }

    #[test]
    fn test_ch4_total_radiative_efficiency() {
        let ch4 = ExponentialKinetics::ch4();
        assert!(is_close!(ch4.radiative_efficiency * ch4.indirect_multiplier, 5.7e-4));
    }

    #[test]
    fn test_rate_is_derivative_of_fraction() {
        let co2 = Co2Kinetics::default();
        let n2o = ExponentialKinetics::n2o();
        let h = 1e-6;
        for t in [0.5, 5.0, 50.0] {
            let numeric = (co2.fraction(t + h) - co2.fraction(t - h)) / (2.0 * h);
            assert!((numeric - co2.rate(t)).abs() < 1e-8);
            let numeric = (n2o.fraction(t + h) - n2o.fraction(t - h)) / (2.0 * h);
            assert!((numeric - n2o.rate(t)).abs() < 1e-8);
        }
    }

    #[test]
    fn test_partial_deserialization() {
        let json = r#"{"co2": {"radiative_efficiency": 1.5e-5}}"#;
        let kinetics: GasKinetics =
            serde_json::from_str(json).expect("Partial deserialization failed");

        assert!(is_close!(kinetics.co2.radiative_efficiency, 1.5e-5));
        assert!(is_close!(kinetics.co2.a0, 0.2173));
        assert!(is_close!(kinetics.ch4.lifetime, 11.8));
    }
}
