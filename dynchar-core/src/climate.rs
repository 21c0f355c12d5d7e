//! Temperature response to a unit radiative forcing pulse
//!
//! Both the IPCC and the prospective AGTP use a sum of exponential modes
//!
//! $$ R(t) = \sum_j c_j e^{-t/d_j} $$
//!
//! The IPCC path uses the AR5 two-timescale fit. The prospective path derives the
//! modes analytically from a linear two-layer energy balance model:
//!
//! $$ C_s \frac{dT_s}{dt} = \epsilon F - \lambda T_s - \eta (T_s - T_d) $$
//! $$ C_d \frac{dT_d}{dt} = \eta (T_s - T_d) $$

use crate::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};

/// One exponential mode of a temperature response
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseMode {
    /// unit: K / (W / m^2) / yr
    pub coefficient: FloatValue,
    /// unit: yr
    pub timescale: FloatValue,
}

/// Parameters of a linear two-layer energy balance model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoLayerParameters {
    /// Climate feedback parameter
    /// unit: W / (m^2 K)
    pub lambda0: FloatValue,
    /// Heat exchange coefficient between the layers
    /// unit: W / (m^2 K)
    pub eta: FloatValue,
    /// Forcing efficacy
    pub efficacy: FloatValue,
    /// unit: W yr / (m^2 K)
    pub heat_capacity_surface: FloatValue,
    /// unit: W yr / (m^2 K)
    pub heat_capacity_deep: FloatValue,
}

impl Default for TwoLayerParameters {
    /// CMIP5 multi-model mean (Geoffroy et al., 2013)
    fn default() -> Self {
        Self {
            lambda0: 1.31,
            eta: 0.88,
            efficacy: 1.03,
            heat_capacity_surface: 7.7,
            heat_capacity_deep: 147.0,
        }
    }
}

/// Impulse response of global mean surface temperature to radiative forcing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemperatureResponse {
    modes: Vec<ResponseMode>,
}

impl TemperatureResponse {
    pub fn new(modes: Vec<ResponseMode>) -> Self {
        Self { modes }
    }

    /// AR5 Chapter 8 response (Boucher and Reddy, 2008 parameters)
    pub fn ar5() -> Self {
        let fit = [(0.631, 8.4), (0.429, 409.5)];
        Self::new(
            fit.iter()
                .map(|&(sensitivity, timescale)| ResponseMode {
                    coefficient: sensitivity / timescale,
                    timescale,
                })
                .collect(),
        )
    }

    /// Exact impulse response of the two-layer model.
    ///
    /// A forcing pulse heats the surface layer by `efficacy / heat_capacity_surface`;
    /// the two eigenmodes of the coupled system then relax that anomaly.
    pub fn from_two_layer(parameters: &TwoLayerParameters) -> Self {
        let TwoLayerParameters {
            lambda0,
            eta,
            efficacy,
            heat_capacity_surface: cs,
            heat_capacity_deep: cd,
        } = *parameters;

        let b = (lambda0 + eta) / cs + eta / cd;
        let c = lambda0 * eta / (cs * cd);
        let root = (b * b - 4.0 * c).sqrt();
        let fast = (b + root) / 2.0;
        let slow = (b - root) / 2.0;

        let fast_share = ((lambda0 + eta) / cs - slow) / (fast - slow);
        let slow_share = (fast - (lambda0 + eta) / cs) / (fast - slow);
        let scale = efficacy / cs;

        Self::new(vec![
            ResponseMode {
                coefficient: scale * fast_share,
                timescale: 1.0 / fast,
            },
            ResponseMode {
                coefficient: scale * slow_share,
                timescale: 1.0 / slow,
            },
        ])
    }

    pub fn modes(&self) -> &[ResponseMode] {
        &self.modes
    }

    /// Temperature change `t` years after a unit forcing pulse
    /// unit: K / (W / m^2) / yr
    pub fn at(&self, t: Time) -> FloatValue {
        self.modes
            .iter()
            .map(|mode| mode.coefficient * (-t / mode.timescale).exp())
            .sum()
    }
}
