//! Dynamic characterization of an emission inventory
//!
//! [`characterize`] expands every record of a dynamic inventory into rows of the
//! requested metric. Records are grouped by flow, the characterizer of each flow is
//! resolved once and then applied record by record. Results are never cached between
//! records.
//!
//! Recoverable conditions (unresolvable flows, unsupported gases, IPCC fallback and
//! clamped emission years) are logged and returned as [`CharacterizationWarning`]s
//! alongside the rows. Invalid horizons and missing scenarios abort the call before any
//! record is processed.

use crate::components::{ipcc_ar6, Horizon, RowOptions};
use crate::method::{characterizers_from_method, MethodFlowSource};
use crate::registry::{resolve, Characterizer, DecaySeries, Dispatch, Metric, Resolution};
use chrono::NaiveDate;
use dynchar_core::errors::{CharacterizationError, CharacterizationResult};
use dynchar_core::inventory::{CharacterizedRecord, EmissionRecord, FlowId};
use dynchar_core::metrics::{check_horizon, ProspectiveContext};
use dynchar_core::scenario::{resolve_scenario, Scenario};
use dynchar_core::tables::{ScenarioTables, YearClamp};
use dynchar_core::timeseries::{add_years, Resolution as GridResolution, DAYS_PER_YEAR};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Where the characterizer of each flow comes from
#[derive(Clone, Copy)]
pub enum FunctionSource<'a> {
    /// An explicit flow mapping
    Explicit(&'a HashMap<FlowId, Characterizer>),
    /// Flows resolved by name and CAS number from an LCIA method
    Method {
        method: &'a str,
        flows: &'a dyn MethodFlowSource,
        /// Decay series keyed by CAS number
        decay_series: &'a HashMap<String, DecaySeries>,
    },
}

impl<'a> FunctionSource<'a> {
    /// Pick the source from an optional explicit mapping and an optional LCIA method.
    ///
    /// Exactly one of the two must be given.
    pub fn select(
        mapping: Option<&'a HashMap<FlowId, Characterizer>>,
        method: Option<&'a str>,
        flows: &'a dyn MethodFlowSource,
        decay_series: &'a HashMap<String, DecaySeries>,
    ) -> CharacterizationResult<Self> {
        match (mapping, method) {
            (Some(mapping), None) => Ok(FunctionSource::Explicit(mapping)),
            (None, Some(method)) => Ok(FunctionSource::Method {
                method,
                flows,
                decay_series,
            }),
            (Some(_), Some(_)) => Err(CharacterizationError::Error(
                "Pass either a characterization function mapping or an LCIA method, not both"
                    .to_string(),
            )),
            (None, None) => Err(CharacterizationError::Error(
                "A characterization function mapping or an LCIA method is required".to_string(),
            )),
        }
    }
}

/// Options for [`characterize`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterizeOptions {
    /// unit: years
    /// default: 100
    pub time_horizon: i64,
    /// Use the IPCC equivalent for flows without prospective data instead of dropping
    /// them
    /// default: true
    pub fallback_to_ipcc: bool,
    /// Follow the scenario radiative efficiency over time for prospective metrics
    /// default: false
    pub time_varying_re: bool,
    /// Grid of radiative forcing rows
    /// default: yearly
    pub resolution: GridResolution,
    /// Report cumulative instead of instantaneous radiative forcing
    /// default: false
    pub cumulative: bool,
    /// Start of a time horizon shared by all records (Levasseur et al., 2010).
    ///
    /// Each record is characterized until `fixed_time_horizon + time_horizon`, so
    /// earlier emissions are followed for longer.
    /// default: None
    pub fixed_time_horizon: Option<NaiveDate>,
    /// Scenario for prospective metrics, the selected scenario is used if unset
    /// default: None
    pub scenario: Option<Scenario>,
}

impl Default for CharacterizeOptions {
    fn default() -> Self {
        Self {
            time_horizon: 100,
            fallback_to_ipcc: true,
            time_varying_re: false,
            resolution: GridResolution::Yearly,
            cumulative: false,
            fixed_time_horizon: None,
            scenario: None,
        }
    }
}

/// A condition that was recovered from during characterization
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterizationWarning {
    /// The emission year was outside the scenario data and was clamped
    YearClamped { requested: i32, effective: i32 },
    /// No characterizer is known for the flow, its records were dropped
    UnresolvableFlow { flow: FlowId },
    /// The flow has no prospective data and fallback is disabled, its records were
    /// dropped
    UnsupportedGas { flow: FlowId },
    /// The flow has no prospective data, the IPCC equivalent was used
    FallbackToIpcc { flow: FlowId },
}

impl fmt::Display for CharacterizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterizationWarning::YearClamped {
                requested,
                effective,
            } => write!(
                f,
                "Emission year {requested} is outside the scenario data, using {effective}"
            ),
            CharacterizationWarning::UnresolvableFlow { flow } => {
                write!(f, "No characterization function for flow {flow}, skipping it")
            }
            CharacterizationWarning::UnsupportedGas { flow } => write!(
                f,
                "Flow {flow} has no prospective characterization and fallback to IPCC is disabled, skipping it"
            ),
            CharacterizationWarning::FallbackToIpcc { flow } => write!(
                f,
                "Flow {flow} has no prospective characterization, using IPCC AR6 instead"
            ),
        }
    }
}

/// Characterized rows and the warnings raised while producing them
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CharacterizedInventory {
    pub records: Vec<CharacterizedRecord>,
    pub warnings: Vec<CharacterizationWarning>,
}

impl CharacterizedInventory {
    fn warn(&mut self, warning: CharacterizationWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}

/// Horizon of a record, shortened or lengthened under a fixed time horizon.
///
/// A record emitted `n` years (rounded) before the fixed start is followed for
/// `time_horizon + n` years. Fails with [`CharacterizationError::InvalidHorizon`] if the
/// horizon ends past the last representable date.
fn record_horizon(
    record: &EmissionRecord,
    time_horizon: u32,
    fixed_start: Option<NaiveDate>,
) -> CharacterizationResult<Horizon> {
    let invalid = || CharacterizationError::InvalidHorizon(i64::from(time_horizon));
    let horizon = match fixed_start {
        None => Horizon::new(time_horizon),
        Some(start) => {
            add_years(start, time_horizon).ok_or_else(invalid)?;
            let lead = ((start - record.date).num_days() as f64 / DAYS_PER_YEAR).round() as i64;
            let effect = (i64::from(time_horizon) + lead).max(0);
            Horizon {
                effect: u32::try_from(effect).map_err(|_| invalid())?,
                reference: time_horizon,
            }
        }
    };
    add_years(record.date, horizon.effect).ok_or_else(invalid)?;
    Ok(horizon)
}

/// Records grouped by flow, flows in order of first appearance
fn group_by_flow(inventory: &[EmissionRecord]) -> Vec<(FlowId, Vec<&EmissionRecord>)> {
    let mut positions: HashMap<FlowId, usize> = HashMap::new();
    let mut groups: Vec<(FlowId, Vec<&EmissionRecord>)> = Vec::new();
    for record in inventory {
        let index = *positions.entry(record.flow).or_insert_with(|| {
            groups.push((record.flow, Vec::new()));
            groups.len() - 1
        });
        groups[index].1.push(record);
    }
    groups
}

/// Characterize an inventory using the bundled scenario tables
pub fn characterize(
    inventory: &[EmissionRecord],
    metric: Metric,
    functions: FunctionSource<'_>,
    options: &CharacterizeOptions,
) -> CharacterizationResult<CharacterizedInventory> {
    let tables = if metric.is_prospective() {
        Some(ScenarioTables::builtin()?)
    } else {
        None
    };
    run(inventory, metric, functions, options, tables)
}

/// Characterize an inventory with caller-supplied scenario tables
pub fn characterize_with_tables(
    inventory: &[EmissionRecord],
    metric: Metric,
    functions: FunctionSource<'_>,
    options: &CharacterizeOptions,
    tables: &ScenarioTables,
) -> CharacterizationResult<CharacterizedInventory> {
    run(inventory, metric, functions, options, Some(tables))
}

fn run(
    inventory: &[EmissionRecord],
    metric: Metric,
    functions: FunctionSource<'_>,
    options: &CharacterizeOptions,
    tables: Option<&ScenarioTables>,
) -> CharacterizationResult<CharacterizedInventory> {
    let time_horizon = check_horizon(options.time_horizon)?;
    for record in inventory {
        record_horizon(record, time_horizon, options.fixed_time_horizon)?;
    }

    let ctx = match (metric.is_prospective(), tables) {
        (true, Some(tables)) => {
            let scenario = resolve_scenario(options.scenario)?;
            // Fail before any record if the tables lack the scenario
            tables.radiative_efficiency(&scenario)?;
            tables.co2_irf(&scenario)?;
            log::debug!("Characterizing {metric} with scenario {scenario}");
            Some(ProspectiveContext::new(scenario, tables, options.time_varying_re))
        }
        (true, None) => {
            return Err(CharacterizationError::Error(format!(
                "No scenario tables available for {metric}"
            )))
        }
        (false, _) => None,
    };

    let mapping: Cow<HashMap<FlowId, Characterizer>> = match functions {
        FunctionSource::Explicit(mapping) => Cow::Borrowed(mapping),
        FunctionSource::Method {
            method,
            flows,
            decay_series,
        } => Cow::Owned(
            characterizers_from_method(method, flows, decay_series).ok_or_else(|| {
                CharacterizationError::Error(format!("Unknown LCIA method '{method}'"))
            })?,
        ),
    };

    let row_options = RowOptions {
        resolution: options.resolution,
        cumulative: options.cumulative,
    };
    let mut output = CharacterizedInventory::default();
    let mut clamps: HashSet<YearClamp> = HashSet::new();

    for (flow, records) in group_by_flow(inventory) {
        let Some(characterizer) = mapping.get(&flow) else {
            output.warn(CharacterizationWarning::UnresolvableFlow { flow });
            continue;
        };

        let dispatch = match resolve(characterizer, metric, options.fallback_to_ipcc) {
            Resolution::Direct(dispatch) => dispatch,
            Resolution::Fallback(dispatch) => {
                output.warn(CharacterizationWarning::FallbackToIpcc { flow });
                dispatch
            }
            Resolution::Unsupported => {
                output.warn(CharacterizationWarning::UnsupportedGas { flow });
                continue;
            }
        };
        log::debug!(
            "Flow {flow}: {} records with {} ({dispatch:?})",
            records.len(),
            characterizer.name()
        );

        for record in records {
            let horizon = record_horizon(record, time_horizon, options.fixed_time_horizon)?;
            match (&dispatch, ctx.as_ref()) {
                (Dispatch::Ipcc(characterizer, ipcc_metric), _) => {
                    let rows = ipcc_ar6::apply(
                        characterizer,
                        *ipcc_metric,
                        record,
                        &horizon,
                        &row_options,
                    )?;
                    output.records.extend(rows);
                }
                (Dispatch::Prospective(prospective, prospective_metric), Some(ctx)) => {
                    let expansion = prospective.apply(
                        *prospective_metric,
                        record,
                        &horizon,
                        &row_options,
                        ctx,
                    )?;
                    if expansion.clamp.is_clamped() && clamps.insert(expansion.clamp) {
                        output.warn(CharacterizationWarning::YearClamped {
                            requested: expansion.clamp.requested,
                            effective: expansion.clamp.effective,
                        });
                    }
                    output.records.extend(expansion.records);
                }
                (Dispatch::Prospective(..), None) => {
                    return Err(CharacterizationError::Error(format!(
                        "Prospective dispatch for flow {flow} without a scenario"
                    )))
                }
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_options() {
        let options: CharacterizeOptions = toml::from_str("time_horizon = 20").unwrap();
        assert_eq!(options.time_horizon, 20);
        assert!(options.fallback_to_ipcc);
        assert_eq!(options.resolution, GridResolution::Yearly);
        assert_eq!(options.scenario, None);

        let options: CharacterizeOptions = serde_json::from_str(
            r#"{"resolution": "daily", "scenario": {"iam": "AIM", "ssp": "SSP3", "rcp": "6.0"}}"#,
        )
        .unwrap();
        assert_eq!(options.resolution, GridResolution::Daily);
        assert_eq!(options.scenario.unwrap().to_string(), "AIM-SSP3-6.0");
    }

    #[test]
    fn test_group_by_flow_keeps_first_appearance() {
        let inventory = vec![
            EmissionRecord::new(date(2020, 1, 1), 1.0, 5, 1),
            EmissionRecord::new(date(2021, 1, 1), 1.0, 3, 1),
            EmissionRecord::new(date(2022, 1, 1), 1.0, 5, 2),
        ];
        let groups = group_by_flow(&inventory);
        let flows: Vec<_> = groups.iter().map(|(flow, _)| *flow).collect();
        assert_eq!(flows, vec![5, 3]);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[1].activity, 2);
    }

    #[test]
    fn test_record_horizon() {
        let record = EmissionRecord::new(date(2010, 1, 1), 1.0, 1, 1);
        assert_eq!(record_horizon(&record, 100, None), Ok(Horizon::new(100)));

        // Ten years before the start of the fixed horizon
        let horizon = record_horizon(&record, 100, Some(date(2020, 1, 1))).unwrap();
        assert_eq!(horizon.effect, 110);
        assert_eq!(horizon.reference, 100);

        // After the end of the fixed horizon
        let late = EmissionRecord::new(date(2130, 1, 1), 1.0, 1, 1);
        let horizon = record_horizon(&late, 100, Some(date(2020, 1, 1))).unwrap();
        assert_eq!(horizon.effect, 0);
    }

    #[test]
    fn test_record_horizon_long() {
        let start = date(2020, 1, 1);
        let record = EmissionRecord::new(start, 1.0, 1, 1);

        // Emitted at the fixed start, the full horizon applies however long it is
        let horizon = record_horizon(&record, 200_000, Some(start)).unwrap();
        assert_eq!(horizon, Horizon::new(200_000));

        for time_horizon in [300_000, 400_000_000] {
            let err = CharacterizationError::InvalidHorizon(i64::from(time_horizon));
            assert_eq!(record_horizon(&record, time_horizon, None), Err(err.clone()));
            assert_eq!(record_horizon(&record, time_horizon, Some(start)), Err(err));
        }
    }

    #[test]
    fn test_select_function_source() {
        let mapping = HashMap::from([(1, Characterizer::Co2)]);
        let flows: HashMap<String, Vec<crate::method::BiosphereFlow>> = HashMap::new();
        let decay_series = HashMap::new();

        assert!(matches!(
            FunctionSource::select(Some(&mapping), None, &flows, &decay_series),
            Ok(FunctionSource::Explicit(_))
        ));
        assert!(matches!(
            FunctionSource::select(None, Some("IPCC 2021"), &flows, &decay_series),
            Ok(FunctionSource::Method {
                method: "IPCC 2021",
                ..
            })
        ));
        assert!(matches!(
            FunctionSource::select(Some(&mapping), Some("IPCC 2021"), &flows, &decay_series),
            Err(CharacterizationError::Error(_))
        ));
        assert!(matches!(
            FunctionSource::select(None, None, &flows, &decay_series),
            Err(CharacterizationError::Error(_))
        ));
    }

    #[test]
    fn test_warning_messages() {
        let warning = CharacterizationWarning::YearClamped {
            requested: 2010,
            effective: 2030,
        };
        assert!(warning.to_string().contains("2010"));
        assert!(CharacterizationWarning::UnsupportedGas { flow: 12 }
            .to_string()
            .contains("12"));
    }
}
