//! Characterizers and the two-tier metric dispatch
//!
//! A [`Characterizer`] describes how a single flow behaves in the atmosphere. The
//! flow mapping handed to the driver assigns one to every flow of interest. For a given
//! [`Metric`] the registry resolves it either to an IPCC AR6 computation or to a
//! prospective one, falling back to IPCC for characterizers without prospective data
//! when that is allowed.

use crate::components::prospective::ProspectiveCharacterizer;
use dynchar_core::errors::CharacterizationError;
use dynchar_core::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;
use std::sync::Arc;

/// Metric requested from [`crate::characterize::characterize`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "radiative_forcing")]
    RadiativeForcing,
    #[serde(rename = "GWP")]
    Gwp,
    #[serde(rename = "prospective_radiative_forcing")]
    ProspectiveRadiativeForcing,
    #[serde(rename = "pGWP")]
    Pgwp,
    #[serde(rename = "pGTP")]
    Pgtp,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::RadiativeForcing => "radiative_forcing",
            Metric::Gwp => "GWP",
            Metric::ProspectiveRadiativeForcing => "prospective_radiative_forcing",
            Metric::Pgwp => "pGWP",
            Metric::Pgtp => "pGTP",
        }
    }

    /// Whether the metric depends on a scenario
    pub fn is_prospective(&self) -> bool {
        matches!(
            self,
            Metric::ProspectiveRadiativeForcing | Metric::Pgwp | Metric::Pgtp
        )
    }
}

impl FromStr for Metric {
    type Err = CharacterizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "radiative_forcing" => Ok(Metric::RadiativeForcing),
            "GWP" => Ok(Metric::Gwp),
            "prospective_radiative_forcing" => Ok(Metric::ProspectiveRadiativeForcing),
            "pGWP" => Ok(Metric::Pgwp),
            "pGTP" => Ok(Metric::Pgtp),
            _ => Err(CharacterizationError::UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-defined characterization function.
///
/// Implementations describe the radiative forcing of a 1 kg pulse. They are
/// serialised with their type name so that flow mappings can be stored as config.
#[typetag::serde(tag = "type")]
pub trait CharacterizationFunction: Debug + Send + Sync {
    /// Radiative forcing `t` years after a 1 kg pulse
    /// unit: W / m^2 / kg
    fn forcing(&self, t: Time) -> FloatValue;
}

/// Per-kg forcing tabulated for each year after emission.
///
/// Values are linearly interpolated between years and are zero once the table ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecaySeries {
    values: Vec<FloatValue>,
}

impl DecaySeries {
    pub fn new(values: Vec<FloatValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[FloatValue] {
        &self.values
    }

    /// unit: W / m^2 / kg
    pub fn at(&self, t: Time) -> FloatValue {
        let last = self.values.len() as Time - 1.0;
        if self.values.is_empty() || t < 0.0 || t > last {
            return 0.0;
        }
        let lower = t.floor() as usize;
        match self.values.get(lower + 1) {
            Some(next) => {
                let weight = t - lower as Time;
                self.values[lower] + weight * (next - self.values[lower])
            }
            None => self.values[lower],
        }
    }
}

/// How a flow is characterized
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Characterizer {
    Co2,
    /// CO2 taken up from the atmosphere, forcing has the opposite sign
    Co2Uptake,
    /// Fossil and non-fossil methane alike
    Ch4,
    N2o,
    /// Carbon monoxide, treated as its CO2 equivalent after oxidation
    Co,
    Decay(DecaySeries),
    Custom(Arc<dyn CharacterizationFunction>),
}

impl Characterizer {
    pub fn name(&self) -> &'static str {
        match self {
            Characterizer::Co2 => "co2",
            Characterizer::Co2Uptake => "co2_uptake",
            Characterizer::Ch4 => "ch4",
            Characterizer::N2o => "n2o",
            Characterizer::Co => "co",
            Characterizer::Decay(_) => "decay",
            Characterizer::Custom(_) => "custom",
        }
    }
}

/// IPCC AR6 computations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IpccMetric {
    RadiativeForcing,
    Gwp,
    Gtp,
}

/// Scenario-dependent computations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProspectiveMetric {
    RadiativeForcing,
    Pgwp,
    Pgtp,
}

/// The computation selected for a flow
#[derive(Clone, Debug)]
pub enum Dispatch<'c> {
    Ipcc(&'c Characterizer, IpccMetric),
    Prospective(ProspectiveCharacterizer, ProspectiveMetric),
}

/// Outcome of resolving a characterizer for a metric
#[derive(Clone, Debug)]
pub enum Resolution<'c> {
    Direct(Dispatch<'c>),
    /// No prospective data exists, the IPCC equivalent is used instead
    Fallback(Dispatch<'c>),
    /// No prospective data exists and fallback is disabled
    Unsupported,
}

fn ipcc_equivalent(metric: ProspectiveMetric) -> IpccMetric {
    match metric {
        ProspectiveMetric::RadiativeForcing => IpccMetric::RadiativeForcing,
        ProspectiveMetric::Pgwp => IpccMetric::Gwp,
        ProspectiveMetric::Pgtp => IpccMetric::Gtp,
    }
}

/// Pick the computation for `characterizer` under `metric`
pub fn resolve(
    characterizer: &Characterizer,
    metric: Metric,
    fallback_to_ipcc: bool,
) -> Resolution<'_> {
    let prospective_metric = match metric {
        Metric::RadiativeForcing => {
            return Resolution::Direct(Dispatch::Ipcc(characterizer, IpccMetric::RadiativeForcing))
        }
        Metric::Gwp => return Resolution::Direct(Dispatch::Ipcc(characterizer, IpccMetric::Gwp)),
        Metric::ProspectiveRadiativeForcing => ProspectiveMetric::RadiativeForcing,
        Metric::Pgwp => ProspectiveMetric::Pgwp,
        Metric::Pgtp => ProspectiveMetric::Pgtp,
    };

    match ProspectiveCharacterizer::from_characterizer(characterizer) {
        Some(prospective) => {
            Resolution::Direct(Dispatch::Prospective(prospective, prospective_metric))
        }
        None if fallback_to_ipcc => Resolution::Fallback(Dispatch::Ipcc(
            characterizer,
            ipcc_equivalent(prospective_metric),
        )),
        None => Resolution::Unsupported,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[derive(Debug, Serialize, Deserialize)]
    struct Constant {
        value: FloatValue,
    }

    #[typetag::serde]
    impl CharacterizationFunction for Constant {
        fn forcing(&self, _t: Time) -> FloatValue {
            self.value
        }
    }

    #[test]
    fn test_metric_names() {
        for name in [
            "radiative_forcing",
            "GWP",
            "prospective_radiative_forcing",
            "pGWP",
            "pGTP",
        ] {
            let metric: Metric = name.parse().unwrap();
            assert_eq!(metric.to_string(), name);
            assert_eq!(serde_json::to_string(&metric).unwrap(), format!("\"{name}\""));
        }
        assert_eq!(
            "GTP".parse::<Metric>(),
            Err(CharacterizationError::UnknownMetric("GTP".to_string()))
        );
        assert!(Metric::Pgtp.is_prospective());
        assert!(!Metric::Gwp.is_prospective());
    }

    #[test]
    fn test_decay_series() {
        let series = DecaySeries::new(vec![4.0, 2.0, 1.0]);
        assert!(is_close!(series.at(0.0), 4.0));
        assert!(is_close!(series.at(0.5), 3.0));
        assert!(is_close!(series.at(2.0), 1.0));
        assert_eq!(series.at(2.5), 0.0);
        assert_eq!(DecaySeries::new(vec![]).at(0.0), 0.0);
    }

    #[test]
    fn test_resolve_ipcc_metrics() {
        let co = Characterizer::Co;
        assert!(matches!(
            resolve(&co, Metric::Gwp, false),
            Resolution::Direct(Dispatch::Ipcc(_, IpccMetric::Gwp))
        ));
    }

    #[test]
    fn test_resolve_prospective() {
        assert!(matches!(
            resolve(&Characterizer::Ch4, Metric::Pgtp, false),
            Resolution::Direct(Dispatch::Prospective(
                ProspectiveCharacterizer::Ch4,
                ProspectiveMetric::Pgtp
            ))
        ));
    }

    #[test]
    fn test_resolve_fallback() {
        let co = Characterizer::Co;
        assert!(matches!(
            resolve(&co, Metric::Pgtp, true),
            Resolution::Fallback(Dispatch::Ipcc(Characterizer::Co, IpccMetric::Gtp))
        ));
        assert!(matches!(
            resolve(&co, Metric::ProspectiveRadiativeForcing, true),
            Resolution::Fallback(Dispatch::Ipcc(_, IpccMetric::RadiativeForcing))
        ));
        assert!(matches!(
            resolve(&co, Metric::Pgwp, false),
            Resolution::Unsupported
        ));
    }

    #[test]
    fn test_characterizer_serde() {
        let mapping: Vec<Characterizer> = serde_json::from_str(
            r#"["co2", "co2_uptake", {"decay": [1.0, 0.5]}, {"custom": {"type": "Constant", "value": 2.0}}]"#,
        )
        .unwrap();
        assert!(matches!(mapping[0], Characterizer::Co2));
        assert!(matches!(mapping[1], Characterizer::Co2Uptake));
        match &mapping[2] {
            Characterizer::Decay(series) => assert_eq!(series.values(), &[1.0, 0.5]),
            other => panic!("unexpected {other:?}"),
        }
        match &mapping[3] {
            Characterizer::Custom(function) => assert_eq!(function.forcing(10.0), 2.0),
            other => panic!("unexpected {other:?}"),
        }

        let json = serde_json::to_string(&mapping[3]).unwrap();
        assert_eq!(json, r#"{"custom":{"type":"Constant","value":2.0}}"#);
    }
}
