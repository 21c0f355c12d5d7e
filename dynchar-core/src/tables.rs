//! Scenario radiative efficiency and CO2 impulse response tables
//!
//! Prospective metrics read the radiative efficiency (RE) of each gas from a
//! year-indexed series per scenario. Tables cover 2020-2150; emission years are
//! clamped to [`FIRST_EMISSION_YEAR`, `LAST_EMISSION_YEAR`], the span with
//! scenario-specific data, while the later years are still used when RE evolves over
//! the decay period.
//!
//! The tables are read from TOML: anchor years with RE values, linearly interpolated
//! to annual resolution when loaded.

use crate::errors::{CharacterizationError, CharacterizationResult};
use crate::irf::Gas;
use crate::kinetics::Co2Kinetics;
use crate::scenario::{Iam, Rcp, Scenario, Ssp};
use crate::timeseries::{interpolate, FloatValue};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// First year covered by the tables
pub const FIRST_TABLE_YEAR: i32 = 2020;
/// Last year covered by the tables
pub const LAST_TABLE_YEAR: i32 = 2150;
/// Earliest emission year with scenario data, earlier years are clamped
pub const FIRST_EMISSION_YEAR: i32 = 2030;
/// Latest emission year with scenario data, later years are clamped
pub const LAST_EMISSION_YEAR: i32 = 2100;

const BUILTIN_TABLES: &str = include_str!("../data/scenarios.toml");

/// Result of clamping an emission year into the supported range
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct YearClamp {
    pub requested: i32,
    pub effective: i32,
}

impl YearClamp {
    pub fn new(requested: i32) -> Self {
        Self {
            requested,
            effective: requested.clamp(FIRST_EMISSION_YEAR, LAST_EMISSION_YEAR),
        }
    }

    pub fn is_clamped(&self) -> bool {
        self.requested != self.effective
    }

    /// Log a warning if the year was moved into the supported range
    pub fn warn_if_clamped(&self) {
        if self.is_clamped() {
            log::warn!(
                "Emission year {} outside {}-{}, clamping to {}",
                self.requested,
                FIRST_EMISSION_YEAR,
                LAST_EMISSION_YEAR,
                self.effective
            );
        }
    }
}

/// Clamp an emission year, logging a warning when it falls outside the data range
pub fn clamp_emission_year(year: i32) -> YearClamp {
    let clamp = YearClamp::new(year);
    clamp.warn_if_clamped();
    clamp
}

/// Annual values starting at [`FIRST_TABLE_YEAR`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualSeries {
    values: Array1<FloatValue>,
}

impl AnnualSeries {
    fn from_anchors(years: &[FloatValue], anchors: &[FloatValue]) -> Self {
        let values = (FIRST_TABLE_YEAR..=LAST_TABLE_YEAR)
            .map(|year| interpolate(years, anchors, year as FloatValue))
            .collect();
        Self { values }
    }

    /// Value for a calendar year, years beyond the table take the nearest end value
    pub fn at(&self, year: i32) -> FloatValue {
        let index = (year - FIRST_TABLE_YEAR).clamp(0, self.values.len() as i32 - 1);
        self.values[index as usize]
    }

    pub fn values(&self) -> &Array1<FloatValue> {
        &self.values
    }
}

/// Radiative efficiencies of each gas for one scenario
/// unit: W / m^2 / ppb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRadiativeEfficiency {
    pub co2: AnnualSeries,
    pub ch4: AnnualSeries,
    pub n2o: AnnualSeries,
}

impl ScenarioRadiativeEfficiency {
    pub fn series(&self, gas: Gas) -> &AnnualSeries {
        match gas {
            Gas::Co2 => &self.co2,
            Gas::Ch4 => &self.ch4,
            Gas::N2o => &self.n2o,
        }
    }
}

#[derive(Deserialize)]
struct TableFile {
    co2_irf: Vec<Co2IrfEntry>,
    scenarios: Vec<ScenarioEntry>,
}

#[derive(Deserialize)]
struct Co2IrfEntry {
    rcp: Rcp,
    a0: FloatValue,
    weights: [FloatValue; 3],
    lifetimes: [FloatValue; 3],
}

#[derive(Deserialize)]
struct ScenarioEntry {
    iam: Iam,
    ssp: Ssp,
    rcp: Rcp,
    years: Vec<FloatValue>,
    co2: Vec<FloatValue>,
    ch4: Vec<FloatValue>,
    n2o: Vec<FloatValue>,
}

/// In-memory radiative efficiency tables and RCP-dependent CO2 impulse responses
#[derive(Debug, Clone, Default)]
pub struct ScenarioTables {
    radiative_efficiency: HashMap<Scenario, ScenarioRadiativeEfficiency>,
    co2_irf: HashMap<Rcp, Co2Kinetics>,
}

impl ScenarioTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled illustrative tables, parsed once per process.
    ///
    /// Published scenario data can be loaded with [`ScenarioTables::from_toml_str`] instead.
    pub fn builtin() -> CharacterizationResult<&'static ScenarioTables> {
        static TABLES: OnceLock<CharacterizationResult<ScenarioTables>> = OnceLock::new();
        TABLES
            .get_or_init(|| ScenarioTables::from_toml_str(BUILTIN_TABLES))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Parse tables from their TOML representation
    pub fn from_toml_str(contents: &str) -> CharacterizationResult<Self> {
        let file: TableFile = toml::from_str(contents)
            .map_err(|e| CharacterizationError::InvalidTable(e.to_string()))?;

        let mut tables = Self::new();
        for entry in file.co2_irf {
            tables.insert_co2_irf(
                entry.rcp,
                Co2Kinetics {
                    a0: entry.a0,
                    weights: entry.weights,
                    lifetimes: entry.lifetimes,
                    ..Co2Kinetics::default()
                },
            )?;
        }
        for entry in file.scenarios {
            let scenario = Scenario::new(entry.iam, entry.ssp, entry.rcp)
                .map_err(|e| CharacterizationError::InvalidTable(e.to_string()))?;
            tables.insert_anchors(
                scenario,
                &entry.years,
                [&entry.co2, &entry.ch4, &entry.n2o],
            )?;
        }
        Ok(tables)
    }

    /// Add a CO2 impulse response for an RCP
    pub fn insert_co2_irf(
        &mut self,
        rcp: Rcp,
        kinetics: Co2Kinetics,
    ) -> CharacterizationResult<()> {
        let total = kinetics.total_weight();
        if (total - 1.0).abs() > 1e-6 {
            return Err(CharacterizationError::InvalidTable(format!(
                "CO2 impulse response weights for RCP {rcp} sum to {total}, expected 1"
            )));
        }
        if kinetics.lifetimes.iter().any(|tau| *tau <= 0.0) {
            return Err(CharacterizationError::InvalidTable(format!(
                "CO2 impulse response lifetimes for RCP {rcp} must be positive"
            )));
        }
        self.co2_irf.insert(rcp, kinetics);
        Ok(())
    }

    /// Add radiative efficiencies for a scenario from anchor years.
    ///
    /// `values` holds the CO2, CH4 and N2O series, each matching `years`.
    pub fn insert_anchors(
        &mut self,
        scenario: Scenario,
        years: &[FloatValue],
        values: [&[FloatValue]; 3],
    ) -> CharacterizationResult<()> {
        if years.is_empty() {
            return Err(CharacterizationError::InvalidTable(format!(
                "{scenario}: no anchor years"
            )));
        }
        if years.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(CharacterizationError::InvalidTable(format!(
                "{scenario}: anchor years must be strictly increasing"
            )));
        }
        if years[0] > FIRST_EMISSION_YEAR as FloatValue
            || years[years.len() - 1] < LAST_EMISSION_YEAR as FloatValue
        {
            return Err(CharacterizationError::InvalidTable(format!(
                "{scenario}: anchor years must span {FIRST_EMISSION_YEAR}-{LAST_EMISSION_YEAR}"
            )));
        }

        let mut series = Vec::with_capacity(3);
        for (gas, anchors) in Gas::ALL.iter().zip(values) {
            if anchors.len() != years.len() {
                return Err(CharacterizationError::InvalidTable(format!(
                    "{scenario}: {} {gas} values for {} years",
                    anchors.len(),
                    years.len()
                )));
            }
            if anchors.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(CharacterizationError::InvalidTable(format!(
                    "{scenario}: {gas} radiative efficiencies must be positive"
                )));
            }
            series.push(AnnualSeries::from_anchors(years, anchors));
        }

        let n2o = series.pop();
        let ch4 = series.pop();
        let co2 = series.pop();
        if let (Some(co2), Some(ch4), Some(n2o)) = (co2, ch4, n2o) {
            self.radiative_efficiency
                .insert(scenario, ScenarioRadiativeEfficiency { co2, ch4, n2o });
        }
        Ok(())
    }

    pub fn radiative_efficiency(
        &self,
        scenario: &Scenario,
    ) -> CharacterizationResult<&ScenarioRadiativeEfficiency> {
        self.radiative_efficiency
            .get(scenario)
            .ok_or(CharacterizationError::MissingScenarioData(*scenario))
    }

    /// CO2 impulse response for the RCP of a scenario
    pub fn co2_irf(&self, scenario: &Scenario) -> CharacterizationResult<&Co2Kinetics> {
        self.co2_irf
            .get(&scenario.rcp())
            .ok_or(CharacterizationError::MissingScenarioData(*scenario))
    }

    /// Radiative efficiency (W m^-2 ppb^-1) of `gas` for an emission year.
    ///
    /// The year is clamped to the supported emission range with a warning.
    pub fn lookup_re(
        &self,
        gas: Gas,
        year: i32,
        scenario: &Scenario,
    ) -> CharacterizationResult<(FloatValue, YearClamp)> {
        let table = self.radiative_efficiency(scenario)?;
        let clamp = clamp_emission_year(year);
        Ok((table.series(gas).at(clamp.effective), clamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn image_26() -> Scenario {
        Scenario::parse("IMAGE", "SSP1", "2.6").unwrap()
    }

    #[test]
    fn test_builtin_covers_all_scenarios() {
        let tables = ScenarioTables::builtin().unwrap();
        for scenario in Scenario::all() {
            let re = tables.radiative_efficiency(&scenario).unwrap();
            assert_eq!(re.co2.values().len(), 131, "{scenario}");
            assert!(tables.co2_irf(&scenario).is_ok());
        }
    }

    #[test]
    fn test_lookup_interpolates_between_anchors() {
        let tables = ScenarioTables::builtin().unwrap();
        let re = tables.radiative_efficiency(&image_26()).unwrap();
        let midpoint = (re.ch4.at(2030) + re.ch4.at(2040)) / 2.0;
        assert!(is_close!(re.ch4.at(2035), midpoint));
    }

    #[test]
    fn test_lookup_clamps_years() {
        let tables = ScenarioTables::builtin().unwrap();
        let scenario = image_26();

        let (early, clamp) = tables.lookup_re(Gas::Co2, 2010, &scenario).unwrap();
        assert!(clamp.is_clamped());
        assert_eq!(clamp.effective, 2030);
        let (at_2030, clamp) = tables.lookup_re(Gas::Co2, 2030, &scenario).unwrap();
        assert!(!clamp.is_clamped());
        assert_eq!(early, at_2030);

        let (late, clamp) = tables.lookup_re(Gas::N2o, 2140, &scenario).unwrap();
        assert_eq!(clamp.effective, 2100);
        assert_eq!(late, tables.lookup_re(Gas::N2o, 2100, &scenario).unwrap().0);
    }

    #[test]
    fn test_missing_scenario_data() {
        let tables = ScenarioTables::new();
        let err = tables.lookup_re(Gas::Ch4, 2050, &image_26()).unwrap_err();
        assert_eq!(err, CharacterizationError::MissingScenarioData(image_26()));
    }

    #[test]
    fn test_rejects_bad_tables() {
        let mut tables = ScenarioTables::new();
        let years = [2020.0, 2100.0, 2150.0];
        let ok = [1.0e-5, 1.1e-5, 1.2e-5];
        let short = [1.0e-5, 1.1e-5];
        assert!(tables
            .insert_anchors(image_26(), &years, [&ok[..], &short[..], &ok[..]])
            .is_err());
        assert!(tables
            .insert_anchors(image_26(), &[2040.0, 2100.0], [&ok[..2], &ok[..2], &ok[..2]])
            .is_err());
        assert!(tables
            .insert_anchors(image_26(), &years, [&ok[..], &ok[..], &ok[..]])
            .is_ok());

        let unbalanced = Co2Kinetics {
            a0: 0.5,
            ..Co2Kinetics::default()
        };
        assert!(tables.insert_co2_irf(Rcp::Rcp26, unbalanced).is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let contents = r#"
            [[co2_irf]]
            rcp = "4.5"
            a0 = 0.25
            weights = [0.25, 0.25, 0.25]
            lifetimes = [400.0, 40.0, 4.0]

            [[scenarios]]
            iam = "AIM"
            ssp = "SSP3"
            rcp = "4.5"
            years = [2020, 2150]
            co2 = [1.0e-5, 2.0e-5]
            ch4 = [3.0e-4, 3.0e-4]
            n2o = [3.0e-3, 3.0e-3]
        "#;
        let tables = ScenarioTables::from_toml_str(contents).unwrap();
        let scenario = Scenario::parse("AIM", "SSP3", "4.5").unwrap();
        let re = tables.radiative_efficiency(&scenario).unwrap();
        assert!(is_close!(re.co2.at(2085), 1.5e-5));
        assert!(is_close!(tables.co2_irf(&scenario).unwrap().a0, 0.25));
    }

    #[test]
    fn test_from_toml_rejects_invalid_scenario() {
        let contents = r#"
            co2_irf = []

            [[scenarios]]
            iam = "IMAGE"
            ssp = "SSP3"
            rcp = "2.6"
            years = [2020, 2150]
            co2 = [1.0e-5, 2.0e-5]
            ch4 = [3.0e-4, 3.0e-4]
            n2o = [3.0e-3, 3.0e-3]
        "#;
        let err = ScenarioTables::from_toml_str(contents).unwrap_err();
        assert!(matches!(err, CharacterizationError::InvalidTable(_)));
    }
}
